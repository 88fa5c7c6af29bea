use serde::Serialize;
use zoneplan::models::Building;

/// A rectangle edge or diagonal as `[[x1, y1], [x2, y2]]`.
pub type Segment = [[f64; 2]; 2];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OptimizeResponse {
    pub cost: f64,
    pub rectangle: Vec<Segment>,
    pub buildings: Vec<Building>,
    pub raw_output: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
