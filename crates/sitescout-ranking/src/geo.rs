//! Distance and viewport geometry helpers.
//!
//! Buffers are applied in physical miles: the longitude span widens with
//! latitude so the added margin stays ~equal on every side.

use sitescout_core::{Coordinates, GeoBounds};

const MILES_PER_LAT_DEGREE: f64 = 69.0;
const EARTH_RADIUS_MILES: f64 = 3_958.8;
/// Floor for `cos(lat)` so buffers near the poles stay finite.
const MIN_LNG_SCALE: f64 = 0.01;

/// Great-circle distance between two points in miles.
#[must_use]
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Grow `bounds` by `miles` on every side.
///
/// Longitude degrees are scaled by the cosine of the viewport's center latitude.
#[must_use]
pub fn expand_bounds(bounds: &GeoBounds, miles: f64) -> GeoBounds {
    let lat_delta = miles / MILES_PER_LAT_DEGREE;
    let lng_scale = bounds.center().lat.to_radians().cos().max(MIN_LNG_SCALE);
    let lng_delta = miles / (MILES_PER_LAT_DEGREE * lng_scale);
    GeoBounds {
        min_lat: (bounds.min_lat - lat_delta).max(-90.0),
        max_lat: (bounds.max_lat + lat_delta).min(90.0),
        min_lng: bounds.min_lng - lng_delta,
        max_lng: bounds.max_lng + lng_delta,
    }
}

/// Return the closest of `points` to `origin` along with its distance in miles.
pub fn nearest<'a, T, I, F>(origin: Coordinates, points: I, position: F) -> Option<(&'a T, f64)>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Coordinates,
    T: 'a,
{
    points
        .into_iter()
        .map(|p| (p, haversine_miles(origin, position(p))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinates::new(40.0, -95.0);
        assert!(haversine_miles(p, p).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_69_miles() {
        let d = haversine_miles(Coordinates::new(40.0, -95.0), Coordinates::new(41.0, -95.0));
        assert!((d - 69.1).abs() < 0.2, "got {d}");
    }

    #[test]
    fn duplicate_threshold_is_roughly_fifty_meters() {
        // 0.0003 lat / 0.0002 lng at 40N
        let d = haversine_miles(
            Coordinates::new(40.0, -95.0),
            Coordinates::new(40.000_3, -95.000_2),
        );
        let meters = d * 1_609.344;
        assert!(meters > 35.0 && meters < 50.0, "got {meters} m");
    }

    #[test]
    fn expand_bounds_widens_longitude_more_at_high_latitude() {
        let low = GeoBounds::new(10.0, 10.0, 0.0, 0.0).unwrap();
        let high = GeoBounds::new(60.0, 60.0, 0.0, 0.0).unwrap();
        let low_span = expand_bounds(&low, 10.0).max_lng;
        let high_span = expand_bounds(&high, 10.0).max_lng;
        assert!(high_span > low_span);
    }

    #[test]
    fn expand_bounds_adds_buffer_in_latitude_degrees() {
        let bounds = GeoBounds::new(40.0, 40.5, -95.5, -95.0).unwrap();
        let expanded = expand_bounds(&bounds, 69.0);
        assert!((expanded.min_lat - 39.0).abs() < 1e-9);
        assert!((expanded.max_lat - 41.5).abs() < 1e-9);
        assert!(expanded.validate().is_ok());
    }

    #[test]
    fn nearest_picks_minimum_distance() {
        let origin = Coordinates::new(40.0, -95.0);
        let points = [
            Coordinates::new(40.1, -95.0),
            Coordinates::new(40.01, -95.0),
            Coordinates::new(39.5, -95.0),
        ];
        let (closest, miles) = nearest(origin, &points, |p| *p).unwrap();
        assert_eq!(*closest, points[1]);
        assert!(miles < 1.0);
    }

    #[test]
    fn nearest_of_nothing_is_none() {
        let points: Vec<Coordinates> = Vec::new();
        assert!(nearest(Coordinates::new(0.0, 0.0), &points, |p| *p).is_none());
    }
}
