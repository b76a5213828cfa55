use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::auth::{Identity, Role};
use crate::engine::lifecycle;
use crate::error::AppError;
use crate::models::booking::Booking;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers/online-toggle", post(toggle_online))
        .route("/drivers/current", get(current_booking))
}

#[derive(Serialize)]
struct ToggleResponse {
    is_online: bool,
}

#[derive(Serialize)]
struct CurrentResponse {
    booking: Option<Booking>,
    is_eligible: bool,
}

async fn toggle_online(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ToggleResponse>, AppError> {
    identity.require_role(Role::Driver)?;

    let is_online = lifecycle::toggle_online(&state, identity.user_id);
    Ok(Json(ToggleResponse { is_online }))
}

async fn current_booking(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<CurrentResponse>, AppError> {
    identity.require_role(Role::Driver)?;

    let booking = lifecycle::current_for_driver(&state, identity.user_id);
    let is_eligible = lifecycle::is_eligible(&state, identity.user_id);

    Ok(Json(CurrentResponse {
        booking,
        is_eligible,
    }))
}
