//! Region geometry text encoding.
//!
//! A region's geometry column holds a type tag followed by whitespace
//! separated `x,y` pairs. Rings are concatenated; a ring ends at the first
//! later point equal to the ring's opening point, and the next pair opens
//! a new ring. Holes cannot be expressed.

use crate::error::{GapError, Result};
use crate::utils::coordinates::parse_coordinate;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use tracing::debug;

/// Parse a tagged ring sequence into a multipolygon.
///
/// Any unparseable pair fails the whole field. Points after the last
/// closed ring are dropped, as are rings that close on their opening point.
///
/// # Examples
/// ```
/// use geo_sensor_gaps::utils::parse_multipolygon;
///
/// let geom = parse_multipolygon("POLY 0,0 1,0 1,1 0,0 5,5 6,5 6,6 5,5").unwrap();
/// assert_eq!(geom.0.len(), 2);
/// assert!(parse_multipolygon("POLY x,0 1,0 1,1 x,0").is_err());
/// ```
pub fn parse_multipolygon(text: &str) -> Result<MultiPolygon<f64>> {
    let mut tokens = text.split_whitespace();

    // The type tag carries no information; rings come from point repetition.
    if tokens.next().is_none() {
        return Err(GapError::Parse("Empty geometry field".to_string()));
    }

    let mut polygons = Vec::new();
    let mut ring: Vec<Coord<f64>> = Vec::new();
    let mut pair_count = 0;

    for token in tokens {
        let coord = parse_pair(token)?;
        pair_count += 1;

        if ring.first() == Some(&coord) {
            let closed = std::mem::take(&mut ring);
            if closed.len() < 2 {
                debug!("Dropping degenerate ring at ({}, {})", coord.x, coord.y);
                continue;
            }
            polygons.push(Polygon::new(LineString::new(closed), vec![]));
        } else {
            ring.push(coord);
        }
    }

    if pair_count == 0 {
        return Err(GapError::Parse(format!(
            "Geometry field has no coordinates: '{}'",
            text.trim()
        )));
    }

    if !ring.is_empty() {
        debug!(
            "Dropping unclosed ring of {} point(s) after {} closed ring(s)",
            ring.len(),
            polygons.len()
        );
    }

    Ok(MultiPolygon::new(polygons))
}

/// Write a multipolygon back in the tagged ring encoding, each ring
/// repeating its opening point to close it.
pub fn format_multipolygon(tag: &str, geom: &MultiPolygon<f64>) -> String {
    let mut text = String::from(tag);
    for polygon in &geom.0 {
        let exterior = polygon.exterior();
        for coord in exterior.coords() {
            text.push(' ');
            text.push_str(&format!("{},{}", coord.x, coord.y));
        }
        // LineString::new does not close on its own
        if !exterior.is_closed() {
            if let Some(first) = exterior.0.first() {
                text.push_str(&format!(" {},{}", first.x, first.y));
            }
        }
    }
    text
}

fn parse_pair(token: &str) -> Result<Coord<f64>> {
    let mut parts = token.split(',');
    match (parts.next(), parts.next()) {
        (Some(x), Some(y)) => Ok(Coord {
            x: parse_coordinate(x)?,
            y: parse_coordinate(y)?,
        }),
        _ => Err(GapError::Parse(format!(
            "Expected an 'x,y' pair, got: '{}'",
            token
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ring(points: &[(f64, f64)]) -> Polygon<f64> {
        Polygon::new(LineString::from(points.to_vec()), vec![])
    }

    #[test]
    fn test_single_ring_drops_closing_point() {
        let geom = parse_multipolygon("POLY 0,0 1,0 1,1 0,0").unwrap();

        assert_eq!(geom.0.len(), 1);
        assert_eq!(geom.0[0], ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]));
        // Stored closed exactly once
        assert_eq!(geom.0[0].exterior().0.len(), 4);
    }

    #[test]
    fn test_rings_restart_with_new_anchor() {
        let geom = parse_multipolygon("POLY 0,0 1,0 1,1 0,0 5,5 6,5 6,6 5,5").unwrap();

        assert_eq!(
            geom.0,
            vec![
                ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
                ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)]),
            ]
        );
    }

    #[test]
    fn test_many_rings() {
        let mut text = String::from("MULTIPOLYGON");
        for i in 0..50 {
            let o = i as f64 * 10.0;
            text.push_str(&format!(" {o},0 {},0 {},1 {o},0", o + 1.0, o + 1.0));
        }
        let geom = parse_multipolygon(&text).unwrap();
        assert_eq!(geom.0.len(), 50);
    }

    #[test]
    fn test_tolerates_irregular_whitespace() {
        let geom = parse_multipolygon("  POLYGON\t-4.5,54.1   -4.4,54.1\n-4.4,54.2 -4.5,54.1 ").unwrap();
        assert_eq!(geom.0.len(), 1);
    }

    #[test]
    fn test_unparseable_leading_point_fails_field() {
        assert!(matches!(
            parse_multipolygon("POLY a,b 1,0 1,1 a,b"),
            Err(GapError::Parse(_))
        ));
    }

    #[test]
    fn test_unparseable_later_point_fails_field() {
        assert!(parse_multipolygon("POLY 0,0 1,0 1;1 0,0").is_err());
        assert!(parse_multipolygon("POLY 0,0 1,0 7 0,0").is_err());
    }

    #[test]
    fn test_empty_and_tag_only_fields_fail() {
        assert!(parse_multipolygon("").is_err());
        assert!(parse_multipolygon("POLY").is_err());
    }

    #[test]
    fn test_two_point_rings_close_independently() {
        let geom = parse_multipolygon("POLY 0,0 1,0 0,0 5,5 6,5 5,5").unwrap();

        assert_eq!(
            geom.0,
            vec![
                ring(&[(0.0, 0.0), (1.0, 0.0)]),
                ring(&[(5.0, 5.0), (6.0, 5.0)]),
            ]
        );
    }

    #[test]
    fn test_immediately_repeated_anchor_is_not_a_ring() {
        let geom = parse_multipolygon("POLY 0,0 0,0 5,5 6,5 6,6 5,5").unwrap();
        assert_eq!(geom.0.len(), 1);
        assert_eq!(geom.0[0].exterior().0[0], Coord { x: 5.0, y: 5.0 });

        let geom = parse_multipolygon("POLY 3,3 3,3").unwrap();
        assert!(geom.0.is_empty());
    }

    #[test]
    fn test_unclosed_tail_is_dropped() {
        let geom = parse_multipolygon("POLY 0,0 1,0 1,1 0,0 9,9 8,9").unwrap();
        assert_eq!(geom.0.len(), 1);

        let open_only = parse_multipolygon("POLY 0,0 1,0 1,1").unwrap();
        assert!(open_only.0.is_empty());
    }

    #[test]
    fn test_format_round_trips() {
        let text = "MULTIPOLYGON 0,0 1,0 1,1 0,0 5,5 6,5 6,6 5,5";
        let geom = parse_multipolygon(text).unwrap();
        assert_eq!(format_multipolygon("MULTIPOLYGON", &geom), text);
    }
}
