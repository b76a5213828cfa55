use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::{Booking, BookingStatus};

/// In-memory booking collection. Every conditional write runs under the
/// entry's exclusive guard, so "check expected status, then mutate" is a
/// single indivisible step per booking. That guard is what makes claims
/// first-claim-wins under concurrent attempts; nothing outside this module
/// mutates a booking.
#[derive(Default)]
pub struct BookingStore {
    bookings: DashMap<Uuid, Booking>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, booking: Booking) {
        self.bookings.insert(booking.id, booking);
    }

    pub fn get(&self, id: Uuid) -> Option<Booking> {
        self.bookings.get(&id).map(|entry| entry.value().clone())
    }

    pub fn count(&self) -> usize {
        self.bookings.len()
    }

    /// CREATED -> ASSIGNED, setting the driver, but only if the booking is
    /// still CREATED at the moment of the write. A claim that lost the race
    /// observes `NotClaimable`.
    pub fn claim_if_created(&self, id: Uuid, driver_id: Uuid) -> Result<Booking, AppError> {
        let mut booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;

        if booking.status != BookingStatus::Created {
            return Err(AppError::NotClaimable);
        }

        booking.status = BookingStatus::Assigned;
        booking.driver = Some(driver_id);
        booking.updated_at = Utc::now();

        Ok(booking.clone())
    }

    /// Atomic `expected -> next` transition for the assigned driver.
    /// Status is checked before ownership, matching the API contract:
    /// a stale double-submit reports the transition problem, not ownership.
    pub fn advance_owned(
        &self,
        id: Uuid,
        driver_id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Booking, AppError> {
        let mut booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;

        if booking.status != expected {
            return Err(AppError::InvalidTransition {
                actual: booking.status,
            });
        }

        if booking.driver != Some(driver_id) {
            return Err(AppError::NotOwner);
        }

        booking.status = next;
        booking.updated_at = Utc::now();

        Ok(booking.clone())
    }

    /// The driver's single ASSIGNED/IN_PROGRESS booking, if any. Claim
    /// exclusivity guarantees at most one exists.
    pub fn active_for_driver(&self, driver_id: Uuid) -> Option<Booking> {
        self.bookings
            .iter()
            .find(|entry| {
                let booking = entry.value();
                booking.driver == Some(driver_id) && booking.status.is_active()
            })
            .map(|entry| entry.value().clone())
    }

    /// Oldest CREATED booking, the head of the first-come matching order.
    pub fn oldest_created(&self) -> Option<Booking> {
        self.bookings
            .iter()
            .filter(|entry| entry.value().status == BookingStatus::Created)
            .min_by_key(|entry| entry.value().created_at)
            .map(|entry| entry.value().clone())
    }

    /// All bookings for one customer, most recent first.
    pub fn for_customer(&self, customer_id: Uuid) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| entry.value().customer == customer_id)
            .map(|entry| entry.value().clone())
            .collect();

        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::BookingStore;
    use crate::models::booking::{Booking, BookingStatus, CargoSize, VehicleClass};

    fn booking(customer: Uuid, created_offset_secs: i64) -> Booking {
        let now = Utc::now() + Duration::seconds(created_offset_secs);
        Booking {
            id: Uuid::new_v4(),
            customer,
            driver: None,
            pickup: "Warehouse 4".to_string(),
            drop: "Dock 9".to_string(),
            vehicle_class: VehicleClass::Tempo,
            cargo_size: CargoSize::Small,
            needs_helper: false,
            distance_km: 4.0,
            duration_min: 15.0,
            fare: 192,
            status: BookingStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn claim_sets_driver_and_status() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        let driver = Uuid::new_v4();
        store.insert(b.clone());

        let claimed = store.claim_if_created(b.id, driver).unwrap();
        assert_eq!(claimed.status, BookingStatus::Assigned);
        assert_eq!(claimed.driver, Some(driver));
    }

    #[test]
    fn second_claim_is_not_claimable() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        store.insert(b.clone());

        store.claim_if_created(b.id, Uuid::new_v4()).unwrap();
        let err = store.claim_if_created(b.id, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind(), "not_claimable");
    }

    #[test]
    fn claim_unknown_id_is_not_found() {
        let store = BookingStore::new();
        let err = store
            .claim_if_created(Uuid::new_v4(), Uuid::new_v4())
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn concurrent_claims_have_exactly_one_winner() {
        let store = Arc::new(BookingStore::new());
        let b = booking(Uuid::new_v4(), 0);
        store.insert(b.clone());

        let drivers: Vec<Uuid> = (0..16).map(|_| Uuid::new_v4()).collect();
        let handles: Vec<_> = drivers
            .iter()
            .map(|&driver| {
                let store = store.clone();
                let id = b.id;
                thread::spawn(move || store.claim_if_created(id, driver))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        assert_eq!(winners.len(), 1);

        for result in &results {
            if let Err(err) = result {
                assert_eq!(err.kind(), "not_claimable");
            }
        }

        let final_state = store.get(b.id).unwrap();
        assert_eq!(final_state.status, BookingStatus::Assigned);
        assert_eq!(
            final_state.driver,
            winners[0].as_ref().ok().and_then(|b| b.driver)
        );
    }

    #[test]
    fn advance_requires_expected_status() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        let driver = Uuid::new_v4();
        store.insert(b.clone());

        let err = store
            .advance_owned(b.id, driver, BookingStatus::Assigned, BookingStatus::InProgress)
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_transition");
    }

    #[test]
    fn advance_requires_ownership() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        let owner = Uuid::new_v4();
        store.insert(b.clone());
        store.claim_if_created(b.id, owner).unwrap();

        let err = store
            .advance_owned(
                b.id,
                Uuid::new_v4(),
                BookingStatus::Assigned,
                BookingStatus::InProgress,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "not_owner");
    }

    #[test]
    fn double_submit_applies_transition_once() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        let driver = Uuid::new_v4();
        store.insert(b.clone());
        store.claim_if_created(b.id, driver).unwrap();

        store
            .advance_owned(b.id, driver, BookingStatus::Assigned, BookingStatus::InProgress)
            .unwrap();
        let err = store
            .advance_owned(b.id, driver, BookingStatus::Assigned, BookingStatus::InProgress)
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_transition");
    }

    #[test]
    fn oldest_created_follows_creation_order() {
        let store = BookingStore::new();
        let newer = booking(Uuid::new_v4(), 10);
        let older = booking(Uuid::new_v4(), -10);
        store.insert(newer.clone());
        store.insert(older.clone());

        assert_eq!(store.oldest_created().unwrap().id, older.id);
    }

    #[test]
    fn oldest_created_skips_claimed_bookings() {
        let store = BookingStore::new();
        let older = booking(Uuid::new_v4(), -10);
        let newer = booking(Uuid::new_v4(), 10);
        store.insert(older.clone());
        store.insert(newer.clone());
        store.claim_if_created(older.id, Uuid::new_v4()).unwrap();

        assert_eq!(store.oldest_created().unwrap().id, newer.id);
    }

    #[test]
    fn active_for_driver_ignores_completed() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        let driver = Uuid::new_v4();
        store.insert(b.clone());
        store.claim_if_created(b.id, driver).unwrap();

        assert!(store.active_for_driver(driver).is_some());

        store
            .advance_owned(b.id, driver, BookingStatus::Assigned, BookingStatus::InProgress)
            .unwrap();
        store
            .advance_owned(b.id, driver, BookingStatus::InProgress, BookingStatus::Completed)
            .unwrap();

        assert!(store.active_for_driver(driver).is_none());
    }

    #[test]
    fn for_customer_is_most_recent_first() {
        let store = BookingStore::new();
        let customer = Uuid::new_v4();
        let first = booking(customer, -20);
        let second = booking(customer, 0);
        let other = booking(Uuid::new_v4(), -5);
        store.insert(first.clone());
        store.insert(second.clone());
        store.insert(other);

        let list = store.for_customer(customer);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[test]
    fn driver_absent_iff_created() {
        let store = BookingStore::new();
        let b = booking(Uuid::new_v4(), 0);
        let driver = Uuid::new_v4();
        store.insert(b.clone());

        let created = store.get(b.id).unwrap();
        assert!(created.driver.is_none());

        store.claim_if_created(b.id, driver).unwrap();
        let assigned = store.get(b.id).unwrap();
        assert_ne!(assigned.status, BookingStatus::Created);
        assert!(assigned.driver.is_some());
    }
}
