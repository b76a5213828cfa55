use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppJson;
use crate::auth::{Identity, Role};
use crate::engine::lifecycle;
use crate::error::AppError;
use crate::models::booking::{Booking, CargoSize, VehicleClass};
use crate::pricing;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/my", get(my_bookings))
        .route("/bookings/available", get(available_booking))
        .route("/bookings/:id/claim", post(claim_booking))
        .route("/bookings/:id/start", post(start_delivery))
        .route("/bookings/:id/complete", post(complete_delivery))
        .route("/estimate", post(estimate_fare))
}

#[derive(Serialize)]
struct BookingEnvelope {
    booking: Option<Booking>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    AppJson(payload): AppJson<lifecycle::NewBooking>,
) -> Result<Json<Booking>, AppError> {
    identity.require_role(Role::Customer)?;

    let booking = lifecycle::create_booking(&state, identity.user_id, payload)?;
    Ok(Json(booking))
}

async fn my_bookings(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Booking>>, AppError> {
    identity.require_role(Role::Customer)?;

    Ok(Json(lifecycle::list_for_customer(&state, identity.user_id)))
}

/// "No booking available" is a normal empty result, not an error, so the
/// body always carries a `booking` field that may be null.
async fn available_booking(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<BookingEnvelope>, AppError> {
    identity.require_role(Role::Driver)?;

    let booking = lifecycle::next_available(&state, identity.user_id)?;
    Ok(Json(BookingEnvelope { booking }))
}

async fn claim_booking(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    identity.require_role(Role::Driver)?;

    let booking = lifecycle::claim(&state, id, identity.user_id)?;
    Ok(Json(booking))
}

async fn start_delivery(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    identity.require_role(Role::Driver)?;

    let booking = lifecycle::start(&state, id, identity.user_id)?;
    Ok(Json(booking))
}

async fn complete_delivery(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    identity.require_role(Role::Driver)?;

    let booking = lifecycle::complete(&state, id, identity.user_id)?;
    Ok(Json(booking))
}

#[derive(Deserialize)]
struct EstimateRequest {
    vehicle_class: VehicleClass,
    distance_km: f64,
    #[serde(default)]
    cargo_size: CargoSize,
    #[serde(default)]
    needs_helper: bool,
}

#[derive(Serialize)]
struct EstimateResponse {
    fare: i64,
}

async fn estimate_fare(
    AppJson(payload): AppJson<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let fare = pricing::estimate(
        payload.vehicle_class,
        payload.distance_km,
        payload.cargo_size,
        payload.needs_helper,
    )?;

    Ok(Json(EstimateResponse { fare }))
}
