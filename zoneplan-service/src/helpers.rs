use crate::models::Segment;
use anyhow::{Context, Result};
use zoneplan::models::Building;

/// Splits optimizer output into the cost and one segment per
/// following line.
pub fn parse_output(stdout: &str) -> Result<(f64, Vec<Segment>)> {
    let mut lines = stdout.trim().lines();

    let cost = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("Optimizer returned no output"))?;
    let cost = cost
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid cost `{cost}` in optimizer output"))?;

    let segments = lines
        .map(|l| {
            let [x1, y1, x2, y2] = numbers::<4>(l)
                .with_context(|| format!("Invalid rectangle `{l}` in optimizer output"))?;
            Ok([[x1, y1], [x2, y2]])
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((cost, segments))
}

/// Re-reads the building list from the original payload, skipping
/// the `n k` header.
pub fn echo_buildings(input: &str) -> Result<Vec<Building>> {
    input
        .trim()
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let [x, y, weight] =
                numbers::<3>(l).with_context(|| format!("Invalid building line `{l}`"))?;
            Ok(Building { x, y, weight })
        })
        .collect()
}

fn numbers<const N: usize>(line: &str) -> Result<[f64; N]> {
    let values = line
        .split_whitespace()
        .map(|t| t.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;
    let len = values.len();
    values
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected {N} values, found {len}"))
}
