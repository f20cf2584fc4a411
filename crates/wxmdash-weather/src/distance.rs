//! Great-circle distance, used only for ranking stations by proximity.

use crate::types::Coordinate;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = Coordinate::new(37.9838, 23.7275);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(47.6062, -122.3321);
        let b = Coordinate::new(37.9838, 23.7275);
        let ab = haversine_km(&a, &b);
        let ba = haversine_km(&b, &a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn athens_to_thessaloniki_is_about_300_km() {
        let athens = Coordinate::new(37.9838, 23.7275);
        let thessaloniki = Coordinate::new(40.6401, 22.9444);
        let d = haversine_km(&athens, &thessaloniki);
        assert!((d - 300.0).abs() < 10.0, "got {} km", d);
    }

    #[test]
    fn short_distances_stay_small() {
        let a = Coordinate::new(37.98, 23.72);
        let b = Coordinate::new(37.99, 23.73);
        let d = haversine_km(&a, &b);
        assert!(d > 0.0 && d < 2.0, "got {} km", d);
    }
}
