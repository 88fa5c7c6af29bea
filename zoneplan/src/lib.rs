pub mod candidates;
pub mod coverage;
pub mod error;
pub mod format;
pub mod loader;
pub mod models;
pub mod search;

use anyhow::Result;
use coverage::{CostPolicy, ExclusionDistance};
use loader::ParseOptions;
use log::debug;
use models::OptimizationResult;

/// Runs the whole engine on a text payload under the default
/// exclusion distance policy and returns the rendered result.
///
/// Errors are either an [`error::ParseError`] or an
/// [`error::InvariantError`] and can be told apart with
/// `downcast_ref`.
pub fn run_optimizer(input: &str) -> Result<String> {
    run_optimizer_with(input, &ExclusionDistance)
}

pub fn run_optimizer_with<P: CostPolicy + ?Sized>(input: &str, policy: &P) -> Result<String> {
    let res = solve(input, policy)?;
    Ok(format::render(&res))
}

pub fn solve<P: CostPolicy + ?Sized>(input: &str, policy: &P) -> Result<OptimizationResult> {
    let opts = ParseOptions {
        allow_negative_weights: policy.admits_negative_weights(),
    };
    let problem = loader::parse_with(input, &opts)?;
    debug!(
        "Parsed {} buildings, {} required",
        problem.buildings.len(),
        problem.required
    );

    let res = search::optimize(&problem, policy)?;
    Ok(res)
}
