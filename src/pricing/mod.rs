use crate::error::AppError;
use crate::models::booking::{CargoSize, VehicleClass};

const HELPER_SURCHARGE: f64 = 150.0;

/// Fixed policy constants per vehicle class: (base fee, per-km rate).
fn rate(vehicle_class: VehicleClass) -> (f64, f64) {
    match vehicle_class {
        VehicleClass::BikeParcel => (20.0, 6.0),
        VehicleClass::Pickup => (80.0, 12.0),
        VehicleClass::Tempo => (120.0, 18.0),
        VehicleClass::MiniTruck => (180.0, 25.0),
        VehicleClass::Truck => (300.0, 35.0),
    }
}

fn cargo_multiplier(cargo_size: CargoSize) -> f64 {
    match cargo_size {
        CargoSize::Small => 1.00,
        CargoSize::Medium => 1.15,
        CargoSize::Large => 1.35,
    }
}

/// Distance-based fare. Pure and deterministic; distance comes from the
/// routing collaborator and is not computed here.
pub fn estimate(
    vehicle_class: VehicleClass,
    distance_km: f64,
    cargo_size: CargoSize,
    needs_helper: bool,
) -> Result<i64, AppError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(AppError::Validation(format!(
            "distance_km must be a non-negative number, got {distance_km}"
        )));
    }

    let (base, per_km) = rate(vehicle_class);
    let helper_fee = if needs_helper { HELPER_SURCHARGE } else { 0.0 };
    let fare = (base + per_km * distance_km) * cargo_multiplier(cargo_size) + helper_fee;

    Ok(fare.round() as i64)
}
