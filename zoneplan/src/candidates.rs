use crate::models::Building;

/// Distinct coordinate values per axis, sorted ascending. An optimal
/// rectangle can always be snapped so that each of its edges lies on
/// one of these values.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateAxes {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl CandidateAxes {
    pub fn from_buildings(buildings: &[Building]) -> Self {
        Self {
            xs: distinct_sorted(buildings.iter().map(|b| b.x)),
            ys: distinct_sorted(buildings.iter().map(|b| b.y)),
        }
    }

    pub fn x_index(&self, x: f64) -> Option<usize> {
        index_of(&self.xs, x)
    }

    pub fn y_index(&self, y: f64) -> Option<usize> {
        index_of(&self.ys, y)
    }
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    // -0.0 and 0.0 are the same boundary
    v.dedup_by(|a, b| a == b);
    v
}

fn index_of(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| {
        if probe == &value {
            std::cmp::Ordering::Equal
        } else {
            probe.total_cmp(&value)
        }
    })
    .ok()
}
