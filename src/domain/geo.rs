//! Pure distance and radius math for coordinate pairs.
//!
//! Used by the query engine's radius filter and by the map view. All
//! functions are side-effect free; the only error condition is non-finite
//! numeric input, rejected with [`GatewayError::InvalidCoordinate`].

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Mean Earth radius in kilometers, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair.
///
/// Either fully present or fully absent on an issue — never partial. The
/// constructor rejects non-finite components, so any `Coordinates` value
/// in the system is safe to feed into distance math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair, rejecting NaN and infinite components.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCoordinate`] if either component is
    /// not a finite number.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GatewayError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GatewayError::InvalidCoordinate(format!(
                "lat={lat}, lng={lng}"
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance between two points in kilometers (haversine).
///
/// Symmetric, and zero iff both points are equal.
#[must_use]
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    if a == b {
        return 0.0;
    }
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Returns `true` iff `point` lies within `radius_km` of `center`.
///
/// Callers holding an issue without coordinates must treat it as outside
/// the radius (the filter fails closed); this function only sees points
/// that exist.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCoordinate`] if `radius_km` is not a
/// finite number.
pub fn within_radius(
    center: Coordinates,
    radius_km: f64,
    point: Coordinates,
) -> Result<bool, GatewayError> {
    if !radius_km.is_finite() {
        return Err(GatewayError::InvalidCoordinate(format!(
            "radius_km={radius_km}"
        )));
    }
    Ok(distance_km(center, point) <= radius_km)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn coords(lat: f64, lng: f64) -> Coordinates {
        let Ok(c) = Coordinates::new(lat, lng) else {
            panic!("valid coordinates");
        };
        c
    }

    #[test]
    fn distance_to_self_is_zero() {
        let points = [
            coords(0.0, 0.0),
            coords(51.5074, -0.1278),
            coords(-33.8688, 151.2093),
        ];
        for p in points {
            assert_eq!(distance_km(p, p), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let london = coords(51.5074, -0.1278);
        let paris = coords(48.8566, 2.3522);
        let ab = distance_km(london, paris);
        let ba = distance_km(paris, london);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn london_to_paris_is_about_344_km() {
        let london = coords(51.5074, -0.1278);
        let paris = coords(48.8566, 2.3522);
        let d = distance_km(london, paris);
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn within_radius_boundary_is_inclusive() {
        let center = coords(40.0, -74.0);
        let point = coords(40.0, -74.0);
        assert_eq!(within_radius(center, 0.0, point).ok(), Some(true));

        let nearby = coords(40.01, -74.0);
        let d = distance_km(center, nearby);
        assert_eq!(within_radius(center, d, nearby).ok(), Some(true));
        assert_eq!(within_radius(center, d / 2.0, nearby).ok(), Some(false));
    }

    #[test]
    fn non_finite_components_are_rejected() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinates::new(f64::NEG_INFINITY, 10.0).is_err());
    }

    #[test]
    fn non_finite_radius_is_rejected() {
        let center = coords(0.0, 0.0);
        assert!(within_radius(center, f64::NAN, center).is_err());
        assert!(within_radius(center, f64::INFINITY, center).is_err());
    }
}
