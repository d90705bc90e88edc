//! Great-circle distance

use crate::models::hospital::Coordinates;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two positions in kilometers
#[must_use]
pub fn distance_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Whether `point` lies within `radius_km` of `center`
#[must_use]
pub fn within_radius(center: &Coordinates, point: &Coordinates, radius_km: f64) -> bool {
    distance_km(center, point) <= radius_km
}
