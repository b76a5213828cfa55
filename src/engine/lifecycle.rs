use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::{
    Booking, BookingEvent, BookingEventKind, BookingStatus, CargoSize, VehicleClass,
};
use crate::models::driver::DriverPresence;
use crate::pricing;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewBooking {
    pub pickup: String,
    pub drop: String,
    pub vehicle_class: VehicleClass,
    #[serde(default)]
    pub cargo_size: CargoSize,
    #[serde(default)]
    pub needs_helper: bool,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Quote the client saw. Compared against the server-side fare for
    /// observability but never trusted for pricing.
    pub fare: Option<i64>,
}

pub fn create_booking(
    state: &AppState,
    customer_id: Uuid,
    request: NewBooking,
) -> Result<Booking, AppError> {
    let pickup = request.pickup.trim().to_string();
    let drop = request.drop.trim().to_string();

    if pickup.is_empty() {
        return Err(AppError::Validation("pickup cannot be empty".to_string()));
    }
    if drop.is_empty() {
        return Err(AppError::Validation("drop cannot be empty".to_string()));
    }
    if !request.duration_min.is_finite() || request.duration_min < 0.0 {
        return Err(AppError::Validation(
            "duration_min must be a non-negative number".to_string(),
        ));
    }

    // Fare is always re-derived from the rate table; a tampered client
    // quote shows up in the logs but never in the stored booking.
    let fare = pricing::estimate(
        request.vehicle_class,
        request.distance_km,
        request.cargo_size,
        request.needs_helper,
    )?;

    if let Some(quoted) = request.fare {
        if quoted != fare {
            warn!(
                customer_id = %customer_id,
                quoted,
                fare,
                "client fare quote differs from server fare"
            );
        }
    }

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        customer: customer_id,
        driver: None,
        pickup,
        drop,
        vehicle_class: request.vehicle_class,
        cargo_size: request.cargo_size,
        needs_helper: request.needs_helper,
        distance_km: request.distance_km,
        duration_min: request.duration_min,
        fare,
        status: BookingStatus::Created,
        created_at: now,
        updated_at: now,
    };

    state.bookings.insert(booking.clone());
    state.metrics.bookings_created_total.inc();
    publish(state, BookingEventKind::Created, &booking);

    info!(booking_id = %booking.id, customer_id = %customer_id, fare, "booking created");

    Ok(booking)
}

pub fn list_for_customer(state: &AppState, customer_id: Uuid) -> Vec<Booking> {
    state.bookings.for_customer(customer_id)
}

/// Flips the driver's presence flag and returns the new value.
pub fn toggle_online(state: &AppState, driver_id: Uuid) -> bool {
    let mut presence = state
        .drivers
        .entry(driver_id)
        .or_insert_with(|| DriverPresence::offline(driver_id));

    presence.is_online = !presence.is_online;
    presence.updated_at = Utc::now();
    let is_online = presence.is_online;
    drop(presence);

    if is_online {
        state.metrics.drivers_online.inc();
    } else {
        state.metrics.drivers_online.dec();
    }

    info!(driver_id = %driver_id, is_online, "driver presence toggled");
    is_online
}

fn is_online(state: &AppState, driver_id: Uuid) -> bool {
    state
        .drivers
        .get(&driver_id)
        .map(|presence| presence.is_online)
        .unwrap_or(false)
}

/// Advisory eligibility: online and not busy. Claim correctness does not
/// depend on this; the store's conditional write is the real guard.
pub fn is_eligible(state: &AppState, driver_id: Uuid) -> bool {
    is_online(state, driver_id) && state.bookings.active_for_driver(driver_id).is_none()
}

pub fn current_for_driver(state: &AppState, driver_id: Uuid) -> Option<Booking> {
    state.bookings.active_for_driver(driver_id)
}

/// The oldest unclaimed booking, offered only to an online driver with no
/// active booking. `Ok(None)` means "nothing to do right now", which is not
/// a failure.
pub fn next_available(state: &AppState, driver_id: Uuid) -> Result<Option<Booking>, AppError> {
    if !is_online(state, driver_id) {
        return Err(AppError::DriverOffline);
    }

    if let Some(active) = state.bookings.active_for_driver(driver_id) {
        return Err(AppError::DriverBusy(Box::new(active)));
    }

    Ok(state.bookings.oldest_created())
}

/// First-claim-wins. Eligibility was advisory at read time; the only check
/// inside the write is the atomic status guard.
pub fn claim(state: &AppState, booking_id: Uuid, driver_id: Uuid) -> Result<Booking, AppError> {
    let result = state.bookings.claim_if_created(booking_id, driver_id);

    match &result {
        Ok(booking) => {
            state.metrics.claims_total.with_label_values(&["won"]).inc();
            publish(state, BookingEventKind::Claimed, booking);
            info!(booking_id = %booking_id, driver_id = %driver_id, "booking claimed");
        }
        Err(AppError::NotClaimable) => {
            state
                .metrics
                .claims_total
                .with_label_values(&["lost"])
                .inc();
            info!(booking_id = %booking_id, driver_id = %driver_id, "claim lost");
        }
        Err(_) => {}
    }

    result
}

pub fn start(state: &AppState, booking_id: Uuid, driver_id: Uuid) -> Result<Booking, AppError> {
    let booking = state.bookings.advance_owned(
        booking_id,
        driver_id,
        BookingStatus::Assigned,
        BookingStatus::InProgress,
    )?;

    publish(state, BookingEventKind::Started, &booking);
    info!(booking_id = %booking_id, driver_id = %driver_id, "delivery started");

    Ok(booking)
}

pub fn complete(state: &AppState, booking_id: Uuid, driver_id: Uuid) -> Result<Booking, AppError> {
    let booking = state.bookings.advance_owned(
        booking_id,
        driver_id,
        BookingStatus::InProgress,
        BookingStatus::Completed,
    )?;

    state.metrics.deliveries_completed_total.inc();
    publish(state, BookingEventKind::Completed, &booking);
    info!(booking_id = %booking_id, driver_id = %driver_id, "delivery completed");

    Ok(booking)
}

fn publish(state: &AppState, kind: BookingEventKind, booking: &Booking) {
    // No receivers is fine; the bus only exists for connected clients.
    let _ = state.booking_events_tx.send(BookingEvent {
        kind,
        booking: booking.clone(),
    });
}
