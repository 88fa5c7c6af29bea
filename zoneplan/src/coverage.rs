//! Cost model and direct evaluation of a single rectangle.
//!
//! All cost models are separable per building: a building contributes
//! either a covered cost or an excluded cost depending only on its own
//! gaps to the rectangle, plus an optional cost for the rectangle frame
//! itself. The search relies on that shape to price rectangles from
//! precomputed tables.

use crate::models::{Building, Rectangle};
use std::cmp::Ordering;

/// Absolute tolerance for every cost and area tie.
pub const EPSILON: f64 = 1e-9;

/// How the cost of a policy reacts to a rectangle growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// A larger rectangle never costs more.
    NeverIncreases,
    /// A larger rectangle never costs less.
    NeverDecreases,
    Unordered,
}

/// A replaceable placement cost model.
pub trait CostPolicy {
    /// Name used to select the policy.
    fn name(&self) -> &'static str;

    /// Penalty for a building left outside of the rectangle. At least
    /// one of the gaps is positive.
    fn excluded_cost(&self, building: &Building, gap_x: f64, gap_y: f64) -> f64;

    /// Cost of a building inside or on the boundary of the rectangle.
    fn covered_cost(&self, _building: &Building) -> f64 {
        0.0
    }

    /// Cost of the rectangle itself, independent of the buildings.
    fn frame_cost(&self, _rect: &Rectangle) -> f64 {
        0.0
    }

    fn growth(&self, buildings: &[Building]) -> Growth;

    fn admits_negative_weights(&self) -> bool {
        false
    }
}

/// Every building outside of the rectangle costs its weight times its
/// Euclidean distance to the rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExclusionDistance;

impl CostPolicy for ExclusionDistance {
    fn name(&self) -> &'static str {
        "exclusion-distance"
    }

    fn excluded_cost(&self, building: &Building, gap_x: f64, gap_y: f64) -> f64 {
        building.weight * gap_x.hypot(gap_y)
    }

    fn growth(&self, buildings: &[Building]) -> Growth {
        if buildings.iter().all(|b| b.weight >= 0.0) {
            Growth::NeverIncreases
        } else {
            Growth::Unordered
        }
    }
}

/// The rectangle costs its perimeter plus the weight of every covered
/// building. Negative weights reward covering a building.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerimeterWeight;

impl CostPolicy for PerimeterWeight {
    fn name(&self) -> &'static str {
        "perimeter-weight"
    }

    fn excluded_cost(&self, _building: &Building, _gap_x: f64, _gap_y: f64) -> f64 {
        0.0
    }

    fn covered_cost(&self, building: &Building) -> f64 {
        building.weight
    }

    fn frame_cost(&self, rect: &Rectangle) -> f64 {
        rect.perimeter()
    }

    fn growth(&self, buildings: &[Building]) -> Growth {
        if buildings.iter().all(|b| b.weight >= 0.0) {
            Growth::NeverDecreases
        } else {
            Growth::Unordered
        }
    }

    fn admits_negative_weights(&self) -> bool {
        true
    }
}

pub type BoxedPolicy = Box<dyn CostPolicy + Send + Sync>;

pub const POLICY_NAMES: [&str; 2] = ["exclusion-distance", "perimeter-weight"];

pub fn policy_by_name(name: &str) -> Option<BoxedPolicy> {
    match name {
        "exclusion-distance" => Some(Box::new(ExclusionDistance)),
        "perimeter-weight" => Some(Box::new(PerimeterWeight)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub covered: usize,
    pub cost: f64,
}

/// Counts the buildings covered by `rect` and prices it under `policy`.
///
/// Per building terms are summed in ascending order so the total does
/// not depend on the order of `buildings`.
pub fn evaluate<P>(rect: &Rectangle, buildings: &[Building], policy: &P) -> Coverage
where
    P: CostPolicy + ?Sized,
{
    let mut covered = 0;
    let mut terms: Vec<f64> = buildings
        .iter()
        .map(|b| match rect.gaps(b) {
            (gx, gy) if gx == 0.0 && gy == 0.0 => {
                covered += 1;
                policy.covered_cost(b)
            }
            (gx, gy) => policy.excluded_cost(b, gx, gy),
        })
        .collect();
    terms.sort_by(f64::total_cmp);

    let cost = policy.frame_cost(rect) + terms.iter().sum::<f64>();
    Coverage { covered, cost }
}

/// Orders two costs, treating values within [`EPSILON`] as equal.
pub fn cmp_cost(a: f64, b: f64) -> Ordering {
    cmp_within(a, b, EPSILON)
}

/// Orders two areas, treating values within [`EPSILON`] as equal.
pub fn cmp_area(a: f64, b: f64) -> Ordering {
    cmp_within(a, b, EPSILON)
}

fn cmp_within(a: f64, b: f64, tol: f64) -> Ordering {
    if (a - b).abs() <= tol {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Bound on the rounding error of a cost assembled from precomputed
/// partial sums instead of [`evaluate`].
///
/// Such a cost adds and subtracts a few `n` partial sums, none larger
/// than the combined magnitude of all building and frame terms, so its
/// drift is a small multiple of that magnitude times the machine epsilon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    slack: f64,
}

impl Tolerance {
    pub fn for_buildings(buildings: &[Building]) -> Self {
        let span = Rectangle::bounding(buildings)
            .map(|r| r.width() + r.height())
            .unwrap_or_default();
        let mass: f64 = buildings.iter().map(|b| b.weight.abs()).sum();
        let magnitude = 1.0 + mass * (1.0 + span) + 2.0 * span;
        let ops = 8 * buildings.len() + 32;

        Self {
            slack: ops as f64 * f64::EPSILON * magnitude,
        }
    }

    pub fn slack(&self) -> f64 {
        self.slack
    }

    /// Compares the exact cost behind the estimate `approx` with the
    /// exact cost `exact` under [`cmp_cost`], or returns `None` when the
    /// estimate is too close to tell.
    pub fn settle(&self, approx: f64, exact: f64) -> Option<Ordering> {
        let (lo, hi) = (approx - self.slack, approx + self.slack);
        if hi < exact - EPSILON {
            Some(Ordering::Less)
        } else if lo > exact + EPSILON {
            Some(Ordering::Greater)
        } else if lo >= exact - EPSILON && hi <= exact + EPSILON {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buildings() -> Vec<Building> {
        vec![
            Building::new(0.0, 0.0, 1.0),
            Building::new(10.0, 0.0, 1.0),
            Building::new(0.0, 10.0, 5.0),
            Building::new(13.0, 14.0, 2.0),
        ]
    }

    #[test]
    fn test_exclusion_distance() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let cov = evaluate(&rect, &buildings(), &ExclusionDistance);
        assert_eq!(cov.covered, 3);
        // (13, 14) is 3 right and 4 above the corner (10, 10)
        assert!((cov.cost - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_exclusion_distance_boundary_is_covered() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 0.0);
        let cov = evaluate(&rect, &buildings(), &ExclusionDistance);
        assert_eq!(cov.covered, 2);
        assert!((cov.cost - (5.0 * 10.0 + 2.0 * 205f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_order_independent() {
        let mut b = buildings();
        b.push(Building::new(-0.3, 7.1, 0.7));
        b.push(Building::new(4.4, -2.9, 1.3));
        let rect = Rectangle::new(1.0, 1.0, 2.0, 3.0);
        let first = evaluate(&rect, &b, &ExclusionDistance);
        b.reverse();
        let second = evaluate(&rect, &b, &ExclusionDistance);
        assert_eq!(first.cost.to_bits(), second.cost.to_bits());
    }

    #[test]
    fn test_perimeter_weight() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let cov = evaluate(&rect, &buildings(), &PerimeterWeight);
        assert_eq!(cov.covered, 3);
        assert_eq!(cov.cost, 40.0 + 7.0);

        let mut b = buildings();
        assert_eq!(PerimeterWeight.growth(&b), Growth::NeverDecreases);
        b[0].weight = -3.0;
        assert_eq!(PerimeterWeight.growth(&b), Growth::Unordered);
    }

    #[test]
    fn test_policy_by_name() {
        for name in POLICY_NAMES {
            assert_eq!(policy_by_name(name).unwrap().name(), name);
        }
        assert!(policy_by_name("area").is_none());
    }

    #[test]
    fn test_exclusion_distance_negative_weight_is_unordered() {
        let mut b = buildings();
        assert_eq!(ExclusionDistance.growth(&b), Growth::NeverIncreases);
        b[2].weight = -0.5;
        assert_eq!(ExclusionDistance.growth(&b), Growth::Unordered);
    }

    #[test]
    fn test_cmp_cost() {
        assert_eq!(cmp_cost(1.0, 1.0 + 1e-12), Ordering::Equal);
        assert_eq!(cmp_cost(1.0, 1.5), Ordering::Less);
        assert_eq!(cmp_cost(1e9 + 1.0, 1e9), Ordering::Greater);
        assert_eq!(cmp_area(3.0, 2.0), Ordering::Greater);
    }

    #[test]
    fn test_tolerance_does_not_grow_with_weight_times_span() {
        let b = vec![
            Building::new(0.0, 0.0, 1000.0),
            Building::new(1e6, 0.0, 1000.0),
            Building::new(1e6, 1.0, 1.0),
        ];
        let tol = Tolerance::for_buildings(&b);
        assert!(tol.slack() < 1e-3, "{}", tol.slack());
        assert_eq!(tol.settle(1.0, 0.0), Some(Ordering::Greater));
        assert_eq!(tol.settle(-1.0, 0.0), Some(Ordering::Less));
        assert_eq!(tol.settle(0.0, 0.0), None);
    }

    #[test]
    fn test_tolerance_settles_small_problems() {
        let tol = Tolerance::for_buildings(&[Building::new(1.0, 2.0, 1.0)]);
        assert_eq!(tol.settle(2.0, 2.0), Some(Ordering::Equal));
        assert_eq!(tol.settle(2.1, 2.0), Some(Ordering::Greater));
        assert_eq!(tol.settle(1.9, 2.0), Some(Ordering::Less));
    }
}
