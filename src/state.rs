use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::booking::BookingEvent;
use crate::models::driver::DriverPresence;
use crate::observability::metrics::Metrics;
use crate::store::BookingStore;

pub struct AppState {
    pub bookings: BookingStore,
    pub drivers: DashMap<Uuid, DriverPresence>,
    pub booking_events_tx: broadcast::Sender<BookingEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        let (booking_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            bookings: BookingStore::new(),
            drivers: DashMap::new(),
            booking_events_tx,
            metrics: Metrics::new(),
        }
    }
}
