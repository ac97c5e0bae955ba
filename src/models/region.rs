use geo::{Centroid, Contains, MultiPolygon, Point};

use super::ExtraData;

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: u64,
    pub region_id: String,
    pub geom: MultiPolygon<f64>,
    pub extra_data: ExtraData,
}

impl Region {
    pub fn new(id: u64, region_id: String, geom: MultiPolygon<f64>, extra_data: ExtraData) -> Self {
        Self {
            id,
            region_id,
            geom,
            extra_data,
        }
    }

    /// Area-weighted centroid; `None` for a region without rings.
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geom.centroid()
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.geom.contains(point)
    }

    pub fn ring_count(&self) -> usize {
        self.geom.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn unit_square(offset: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (offset, 0.0),
                (offset + 1.0, 0.0),
                (offset + 1.0, 1.0),
                (offset, 1.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_region_geometry_helpers() {
        let region = Region::new(
            1,
            "R1".to_string(),
            MultiPolygon::new(vec![unit_square(0.0)]),
            ExtraData::new(),
        );

        let centroid = region.centroid().unwrap();
        assert!((centroid.x() - 0.5).abs() < 1e-9);
        assert!((centroid.y() - 0.5).abs() < 1e-9);
        assert!(region.contains(&Point::new(0.25, 0.75)));
        assert!(!region.contains(&Point::new(1.5, 0.5)));
        assert_eq!(region.ring_count(), 1);
    }

    #[test]
    fn test_empty_region_has_no_centroid() {
        let region = Region::new(2, "R2".to_string(), MultiPolygon::new(vec![]), ExtraData::new());
        assert!(region.centroid().is_none());
        assert_eq!(region.ring_count(), 0);
    }
}
