use crate::conf::{self, Mode};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::{process::Stdio, time::Duration};
use tokio::{io::AsyncWriteExt, process::Command, sync::oneshot};
use zoneplan::coverage::policy_by_name;

/// Turns a text payload into the optimizer's text output.
#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn run_optimizer(&self, input: &str) -> Result<String>;
}

pub fn from_config(cfg: &conf::Optimizer) -> Result<Box<dyn Optimizer>> {
    if policy_by_name(&cfg.policy).is_none() {
        bail!("Unknown optimizer policy `{}`", cfg.policy);
    }

    let opt: Box<dyn Optimizer> = match cfg.mode {
        Mode::Process => Box::new(ProcessOptimizer::new(&cfg.command, &cfg.policy)),
        Mode::Embedded => Box::new(EmbeddedOptimizer::new(&cfg.policy)),
    };
    Ok(opt)
}

/// Runs `optimizer`, giving up after `timeout`. A run which overruns
/// is discarded.
pub async fn run_with_timeout(
    optimizer: &dyn Optimizer,
    input: &str,
    timeout: Duration,
) -> Result<String> {
    match tokio::time::timeout(timeout, optimizer.run_optimizer(input)).await {
        Ok(res) => res,
        Err(_) => {
            warn!("Optimizer did not finish within {timeout:?}");
            bail!("optimizer timed out")
        }
    }
}

/// Spawns the optimizer executable, feeding the payload on stdin.
pub struct ProcessOptimizer {
    command: String,
    policy: String,
}

impl ProcessOptimizer {
    pub fn new(command: &str, policy: &str) -> Self {
        Self {
            command: command.to_owned(),
            policy: policy.to_owned(),
        }
    }
}

#[async_trait]
impl Optimizer for ProcessOptimizer {
    async fn run_optimizer(&self, input: &str) -> Result<String> {
        debug!("Spawning {}", self.command);
        let mut child = Command::new(&self.command)
            .arg("--policy")
            .arg(&self.policy)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed spawning optimizer {}", self.command))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Optimizer stdin is not available")?;
        let payload = input.to_owned();
        let writer = tokio::spawn(async move {
            let res = stdin.write_all(payload.as_bytes()).await;
            // closing stdin signals the end of the payload
            drop(stdin);
            res
        });

        let output = child.wait_with_output().await?;
        if let Err(err) = writer.await? {
            debug!("Writing optimizer input failed: {err}");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                bail!("optimizer failed ({})", output.status);
            }
            bail!("{stderr}");
        }

        let stdout = String::from_utf8(output.stdout).context("Optimizer output is not UTF-8")?;
        Ok(stdout)
    }
}

/// Runs the engine in-process on a dedicated thread.
pub struct EmbeddedOptimizer {
    policy: String,
}

impl EmbeddedOptimizer {
    pub fn new(policy: &str) -> Self {
        Self {
            policy: policy.to_owned(),
        }
    }
}

#[async_trait]
impl Optimizer for EmbeddedOptimizer {
    async fn run_optimizer(&self, input: &str) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let input = input.to_owned();
        let policy = self.policy.clone();

        // A detached thread lets a timed out run be abandoned without
        // holding up the runtime.
        std::thread::spawn(move || {
            let res = match policy_by_name(&policy) {
                Some(policy) => zoneplan::run_optimizer_with(&input, policy.as_ref()),
                None => Err(anyhow::anyhow!("Unknown optimizer policy `{policy}`")),
            };
            let _ = tx.send(res);
        });

        rx.await.context("Optimizer thread stopped unexpectedly")?
    }
}
