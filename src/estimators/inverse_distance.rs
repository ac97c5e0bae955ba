use super::{EstimationContext, EstimationMethod, Observation, RegionEstimate, RegionEstimator};
use crate::utils::constants::COINCIDENT_DISTANCE_KM;
use crate::utils::distance_km;
use chrono::NaiveDate;
use geo::Point;

/// Inverse-distance weighting around each region centroid:
/// `Σ vᵢ/dᵢᵖ / Σ 1/dᵢᵖ`.
#[derive(Debug)]
pub struct InverseDistanceEstimator<'a> {
    context: EstimationContext<'a>,
    centroids: Vec<Option<Point<f64>>>,
    power: f64,
}

impl<'a> InverseDistanceEstimator<'a> {
    pub fn new(context: EstimationContext<'a>, power: f64) -> Self {
        let centroids = context.centroids();
        Self {
            context,
            centroids,
            power,
        }
    }

    fn interpolate(&self, target: &Point<f64>, observations: &[Observation<'_>]) -> Option<f64> {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for observation in observations {
            let distance = distance_km(target, observation.location());
            if distance <= COINCIDENT_DISTANCE_KM {
                return Some(observation.value);
            }
            let weight = distance.powf(-self.power);
            weighted_sum += weight * observation.value;
            weight_total += weight;
        }

        (weight_total > 0.0).then(|| weighted_sum / weight_total)
    }
}

impl RegionEstimator for InverseDistanceEstimator<'_> {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::InverseDistance
    }

    fn estimate_all(&self, timestamp: NaiveDate) -> Vec<RegionEstimate> {
        let observations = self.context.observations(timestamp);

        self.context
            .regions()
            .iter()
            .zip(&self.centroids)
            .map(|(region, centroid)| {
                let value = centroid.and_then(|c| self.interpolate(&c, &observations));
                RegionEstimate::new(region, value)
            })
            .collect()
    }
}
