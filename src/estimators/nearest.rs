use super::{EstimationContext, EstimationMethod, RegionEstimate, RegionEstimator};
use crate::utils::distance_km;
use chrono::NaiveDate;
use geo::Point;

/// Each region takes the value of the observation closest to its centroid.
/// Ties go to the earlier reading.
#[derive(Debug)]
pub struct NearestNeighbourEstimator<'a> {
    context: EstimationContext<'a>,
    centroids: Vec<Option<Point<f64>>>,
}

impl<'a> NearestNeighbourEstimator<'a> {
    pub fn new(context: EstimationContext<'a>) -> Self {
        let centroids = context.centroids();
        Self { context, centroids }
    }
}

impl RegionEstimator for NearestNeighbourEstimator<'_> {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::NearestNeighbour
    }

    fn estimate_all(&self, timestamp: NaiveDate) -> Vec<RegionEstimate> {
        let observations = self.context.observations(timestamp);

        self.context
            .regions()
            .iter()
            .zip(&self.centroids)
            .map(|(region, centroid)| {
                let value = centroid.and_then(|c| {
                    observations
                        .iter()
                        .map(|o| (distance_km(&c, o.location()), o.value))
                        .min_by(|a, b| a.0.total_cmp(&b.0))
                        .map(|(_, value)| value)
                });
                RegionEstimate::new(region, value)
            })
            .collect()
    }
}
