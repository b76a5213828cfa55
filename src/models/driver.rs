use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-driver presence flag. "Busy" is intentionally not stored here; it is
/// derived from the booking store so it can never drift out of sync with the
/// actual booking state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverPresence {
    pub driver_id: Uuid,
    pub is_online: bool,
    pub updated_at: DateTime<Utc>,
}

impl DriverPresence {
    pub fn offline(driver_id: Uuid) -> Self {
        Self {
            driver_id,
            is_online: false,
            updated_at: Utc::now(),
        }
    }
}
