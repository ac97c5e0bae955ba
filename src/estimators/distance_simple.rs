use super::{mean, EstimationContext, EstimationMethod, Observation, RegionEstimate, RegionEstimator};
use crate::models::Region;
use crate::utils::distance_km;
use chrono::NaiveDate;
use geo::Point;

/// Distances this close (km) count as the same distance
const TIE_TOLERANCE_KM: f64 = 1e-9;

/// Mean of the observations inside a region; a region without any takes
/// the mean of the observations nearest its centroid.
#[derive(Debug)]
pub struct DistanceSimpleEstimator<'a> {
    context: EstimationContext<'a>,
    centroids: Vec<Option<Point<f64>>>,
}

impl<'a> DistanceSimpleEstimator<'a> {
    pub fn new(context: EstimationContext<'a>) -> Self {
        let centroids = context.centroids();
        Self { context, centroids }
    }

    fn estimate_region(region: &Region, centroid: Option<Point<f64>>, observations: &[Observation<'_>]) -> Option<f64> {
        let inside = mean(
            observations
                .iter()
                .filter(|o| region.contains(o.location()))
                .map(|o| o.value),
        );
        if inside.is_some() {
            return inside;
        }

        let centroid = centroid?;
        let distances: Vec<f64> = observations
            .iter()
            .map(|o| distance_km(&centroid, o.location()))
            .collect();
        let nearest = distances.iter().copied().min_by(f64::total_cmp)?;

        mean(
            observations
                .iter()
                .zip(&distances)
                .filter(|(_, d)| **d - nearest <= TIE_TOLERANCE_KM)
                .map(|(o, _)| o.value),
        )
    }
}

impl RegionEstimator for DistanceSimpleEstimator<'_> {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::DistanceSimple
    }

    fn estimate_all(&self, timestamp: NaiveDate) -> Vec<RegionEstimate> {
        let observations = self.context.observations(timestamp);

        self.context
            .regions()
            .iter()
            .zip(&self.centroids)
            .map(|(region, centroid)| {
                let value = Self::estimate_region(region, *centroid, &observations);
                RegionEstimate::new(region, value)
            })
            .collect()
    }
}
