use crate::error::{GapError, Result};
use geo::Point;

/// Parse a single decimal coordinate, rejecting text that is not a finite number.
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();
    let value = trimmed.parse::<f64>().map_err(|_| {
        GapError::Parse(format!("Invalid coordinate value: '{}'", coord_str))
    })?;

    if !value.is_finite() {
        return Err(GapError::Parse(format!(
            "Coordinate must be finite, got: '{}'",
            coord_str
        )));
    }

    Ok(value)
}

/// Build a point from longitude (x) and latitude (y) text.
///
/// # Examples
/// ```
/// use geo_sensor_gaps::utils::parse_point;
///
/// let point = parse_point("-4.2247", "57.4778").unwrap();
/// assert_eq!(point.x(), -4.2247);
/// assert!(parse_point("west", "57.4778").is_err());
/// ```
pub fn parse_point(x_text: &str, y_text: &str) -> Result<Point<f64>> {
    Ok(Point::new(parse_coordinate(x_text)?, parse_coordinate(y_text)?))
}

/// Exact-equality join key for a point. `-0.0` folds into `0.0` so that
/// both spellings of zero match.
pub fn coordinate_key(point: &Point<f64>) -> (u64, u64) {
    fn bits(value: f64) -> u64 {
        if value == 0.0 {
            0.0f64.to_bits()
        } else {
            value.to_bits()
        }
    }
    (bits(point.x()), bits(point.y()))
}

/// Calculate the distance between two points using the Haversine formula
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance in km between two lon/lat points.
pub fn distance_km(a: &Point<f64>, b: &Point<f64>) -> f64 {
    haversine_distance(a.y(), a.x(), b.y(), b.x())
}
