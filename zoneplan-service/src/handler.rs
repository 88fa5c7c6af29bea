use crate::{
    conf,
    helpers::{echo_buildings, parse_output},
    models::OptimizeResponse,
    optimizer::{run_with_timeout, Optimizer},
    staging::StagedInput,
};
use anyhow::{bail, Result};
use log::info;
use std::time::Duration;

/// Stages the uploaded payload, runs the optimizer on it and builds
/// the response document. The staged file is removed on every path.
pub async fn optimize(
    optimizer: &dyn Optimizer,
    cfg: &conf::Config,
    payload: &[u8],
) -> Result<OptimizeResponse> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        bail!("No file uploaded");
    }

    let staged = StagedInput::create(&cfg.staging.dir, payload).await?;
    let input = staged.read().await?;

    let timeout = Duration::from_secs(cfg.optimizer.timeout);
    let stdout = run_with_timeout(optimizer, &input, timeout).await?;
    drop(staged);

    let (cost, rectangle) = parse_output(&stdout)?;
    let buildings = echo_buildings(&input)?;
    info!("Optimized {} buildings, cost {cost}", buildings.len());

    Ok(OptimizeResponse {
        cost,
        rectangle,
        buildings,
        raw_output: stdout.trim().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::EmbeddedOptimizer;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use zoneplan::models::Building;

    /// Records where the payload was staged and fails.
    struct Failing {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Optimizer for Failing {
        async fn run_optimizer(&self, input: &str) -> Result<String> {
            self.seen.lock().unwrap().push(input.to_owned());
            bail!("boom")
        }
    }

    fn config(dir: &std::path::Path) -> conf::Config {
        let mut cfg = conf::Config::default();
        cfg.staging.dir = dir.to_string_lossy().into_owned();
        cfg
    }

    fn staged_files(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("input_"))
            .count()
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("zoneplan-{name}-{}", xid::new()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_optimize() {
        let dir = scratch_dir("ok");
        let opt = EmbeddedOptimizer::new("exclusion-distance");
        let res = optimize(&opt, &config(&dir), b"3 2\n0 0 1\n10 0 1\n0 10 5\n")
            .await
            .unwrap();

        assert_eq!(res.cost, 0.0);
        assert_eq!(res.rectangle, vec![[[0.0, 0.0], [10.0, 10.0]]]);
        assert_eq!(
            res.buildings,
            vec![
                Building::new(0.0, 0.0, 1.0),
                Building::new(10.0, 0.0, 1.0),
                Building::new(0.0, 10.0, 5.0),
            ]
        );
        assert_eq!(res.raw_output, "0.000000\n0 0 10 10");
        assert_eq!(staged_files(&dir), 0);

        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["buildings"][2]["weight"], 5.0);
        assert_eq!(json["rectangle"][0][1][0], 10.0);
    }

    #[tokio::test]
    async fn test_optimize_cleans_up_on_failure() {
        let dir = scratch_dir("fail");
        let opt = Failing {
            seen: Mutex::new(Vec::new()),
        };
        let err = optimize(&opt, &config(&dir), b"1 1\n0 0 1\n")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(opt.seen.lock().unwrap().as_slice(), ["1 1\n0 0 1\n"]);
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_optimize_no_upload() {
        let dir = scratch_dir("empty");
        let opt = EmbeddedOptimizer::new("exclusion-distance");
        let err = optimize(&opt, &config(&dir), b" \n").await.unwrap_err();
        assert_eq!(err.to_string(), "No file uploaded");
    }

    #[tokio::test]
    async fn test_optimize_parse_error() {
        let dir = scratch_dir("parse");
        let opt = EmbeddedOptimizer::new("exclusion-distance");
        let err = optimize(&opt, &config(&dir), b"2 1\n0 0 1\n")
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<zoneplan::error::ParseError>().is_some());
        assert_eq!(staged_files(&dir), 0);
    }
}
