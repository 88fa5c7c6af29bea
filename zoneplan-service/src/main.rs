mod conf;
mod handler;
mod helpers;
mod models;
mod optimizer;
mod staging;

use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use env_logger::Env;
use log::{debug, error, info};
use models::ErrorResponse;
use std::{env, process::ExitCode};
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> ExitCode {
    let logger = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
    if let Err(err) = logger {
        eprintln!("Failed building logger: {err}");
    }

    match run().await {
        Ok(doc) => {
            println!("{doc}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Optimization failed: {err:#}");
            let doc = ErrorResponse {
                error: err.to_string(),
            };
            match serde_json::to_string_pretty(&doc) {
                Ok(doc) => println!("{doc}"),
                Err(err) => error!("Failed rendering error response: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<String> {
    info!("Reading config ...");
    let cfg = load_config()?;
    debug!("Config: {cfg:#?}");

    let optimizer = optimizer::from_config(&cfg.optimizer)?;
    let payload = read_payload(env::args().nth(1)).await?;

    info!("Running optimizer ...");
    let res = handler::optimize(optimizer.as_ref(), &cfg, &payload).await?;

    let doc = serde_json::to_string_pretty(&res)?;
    Ok(doc)
}

fn load_config() -> Result<conf::Config> {
    let mut b = Config::builder();

    b = add_source_files_for_dir(b, "config");
    b = add_source_files_for_dir(b, "dev.config");
    b = b.add_source(Environment::with_prefix("ZONEPLAN").separator("_"));

    let cfg = b
        .build()
        .context("Failed to build config")?
        .try_deserialize()
        .context("Failed deserializing config")?;
    Ok(cfg)
}

/// Reads the uploaded payload from the given path, or from stdin
/// when no path or `-` is given.
async fn read_payload(path: Option<String>) -> Result<Vec<u8>> {
    match path.as_deref() {
        None | Some("-") => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed reading stdin")?;
            Ok(buf)
        }
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed reading {path}")),
    }
}

fn add_source_files_for_dir(
    builder: ConfigBuilder<DefaultState>,
    name: &str,
) -> ConfigBuilder<DefaultState> {
    builder
        .add_source(File::new(&format!("{name}.yaml"), FileFormat::Yaml).required(false))
        .add_source(File::new(&format!("{name}.yml"), FileFormat::Yaml).required(false))
        .add_source(File::new(&format!("{name}.toml"), FileFormat::Toml).required(false))
        .add_source(File::new(&format!("{name}.json"), FileFormat::Json5).required(false))
}
