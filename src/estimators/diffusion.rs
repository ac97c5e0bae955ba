use super::{mean, EstimationContext, EstimationMethod, RegionEstimate, RegionEstimator};
use chrono::NaiveDate;
use geo::Intersects;

/// Regions holding observations take their mean. Values then spread ring
/// by ring: each pass, a region without a value takes the mean of its
/// valued neighbours from the previous pass. Regions are neighbours when
/// their geometries touch or overlap.
#[derive(Debug)]
pub struct DiffusionEstimator<'a> {
    context: EstimationContext<'a>,
    neighbours: Vec<Vec<usize>>,
    max_rings: usize,
}

impl<'a> DiffusionEstimator<'a> {
    pub fn new(context: EstimationContext<'a>, max_rings: usize) -> Self {
        let regions = context.regions();
        let mut neighbours = vec![Vec::new(); regions.len()];

        for i in 0..regions.len() {
            for j in (i + 1)..regions.len() {
                if regions[i].geom.intersects(&regions[j].geom) {
                    neighbours[i].push(j);
                    neighbours[j].push(i);
                }
            }
        }

        Self {
            context,
            neighbours,
            max_rings,
        }
    }

    pub fn neighbours_of(&self, index: usize) -> &[usize] {
        self.neighbours.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl RegionEstimator for DiffusionEstimator<'_> {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Diffusion
    }

    fn estimate_all(&self, timestamp: NaiveDate) -> Vec<RegionEstimate> {
        let regions = self.context.regions();
        let observations = self.context.observations(timestamp);

        let mut values: Vec<Option<f64>> = regions
            .iter()
            .map(|region| {
                mean(
                    observations
                        .iter()
                        .filter(|o| region.contains(o.location()))
                        .map(|o| o.value),
                )
            })
            .collect();

        for _ in 0..self.max_rings {
            let next: Vec<Option<f64>> = values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    value.or_else(|| mean(self.neighbours[i].iter().filter_map(|&j| values[j])))
                })
                .collect();

            if next == values {
                break;
            }
            values = next;
        }

        regions
            .iter()
            .zip(values)
            .map(|(region, value)| RegionEstimate::new(region, value))
            .collect()
    }
}
