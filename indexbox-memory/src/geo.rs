//! Great-circle distance on the sphere Redis uses for its geo commands.

use indexbox_core::Point;

const EARTH_RADIUS_IN_METERS: f64 = 6372797.560856;

/// Haversine distance between two points, in meters.
pub(crate) fn distance(a: Point, b: Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let u = ((lat2 - lat1) / 2.0).sin();
    let v = ((b.x.to_radians() - a.x.to_radians()) / 2.0).sin();
    2.0 * EARTH_RADIUS_IN_METERS * (u * u + lat1.cos() * lat2.cos() * v * v).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point() {
        let palermo = Point::new(13.361389, 38.115556);
        assert_eq!(distance(palermo, palermo), 0.0);
    }

    #[test]
    fn test_palermo_catania() {
        // GEODIST Sicily Palermo Catania
        let palermo = Point::new(13.361389, 38.115556);
        let catania = Point::new(15.087269, 37.502669);
        let meters = distance(palermo, catania);
        assert!((meters - 166274.1516).abs() < 5.0, "got {meters}");
    }
}
