use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery lifecycle. Transitions only ever move forward through the
/// derived ordering; the store enforces this with conditional writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Created,
    Assigned,
    InProgress,
    Completed,
}

impl BookingStatus {
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Assigned | BookingStatus::InProgress)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStatus::Created => "CREATED",
            BookingStatus::Assigned => "ASSIGNED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum VehicleClass {
    BikeParcel,
    Pickup,
    Tempo,
    MiniTruck,
    Truck,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CargoSize {
    #[default]
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer: Uuid,
    /// Set exactly once, on successful claim. Absent iff status is CREATED.
    pub driver: Option<Uuid>,
    pub pickup: String,
    pub drop: String,
    pub vehicle_class: VehicleClass,
    pub cargo_size: CargoSize,
    pub needs_helper: bool,
    pub distance_km: f64,
    pub duration_min: f64,
    pub fare: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    Claimed,
    Started,
    Completed,
}

/// Pushed on the broadcast bus after every successful mutation so driver
/// and customer clients can subscribe instead of polling.
#[derive(Debug, Clone, Serialize)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking: Booking,
}
