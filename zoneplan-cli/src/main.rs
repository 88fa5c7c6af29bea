use std::{
    env, fs,
    io::{self, Read},
    process::ExitCode,
};

use anyhow::{Context, Result};
use env_logger::Env;
use log::{debug, info};
use zoneplan::{
    coverage::{policy_by_name, POLICY_NAMES},
    error::{InvariantError, ParseError},
    run_optimizer_with,
};

const USAGE: &str = "Usage: axis-optimizer [--policy <name>] [<input file> | -]";

#[derive(Debug, PartialEq)]
struct Args {
    policy: String,
    input: Option<String>,
    help: bool,
}

fn main() -> ExitCode {
    // stdout carries the result, keep stderr quiet unless asked
    let logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();
    if let Err(err) = logger {
        eprintln!("Failed building logger: {err}");
    }

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return ExitCode::from(64);
        }
    };

    if args.help {
        println!("{}", help());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let policy = policy_by_name(&args.policy)
        .ok_or_else(|| anyhow::anyhow!("Unknown policy `{}`", args.policy))?;

    let input = match args.input.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed reading stdin")?;
            buf
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed reading {path}"))?,
    };
    debug!("Read {} bytes of input", input.len());

    let output = run_optimizer_with(&input, policy.as_ref())?;
    info!("Optimization finished using policy {}", policy.name());
    Ok(output)
}

fn help() -> String {
    format!("{USAGE}\nPolicies: {}", POLICY_NAMES.join(", "))
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Args> {
    let mut res = Args {
        policy: POLICY_NAMES[0].to_owned(),
        input: None,
        help: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--policy" | "-p" => {
                res.policy = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing value for {arg}"))?;
            }
            "--help" | "-h" => res.help = true,
            _ if res.input.is_none() => res.input = Some(arg),
            _ => anyhow::bail!("Unexpected argument `{arg}`"),
        }
    }

    Ok(res)
}

/// Parse errors and engine defects exit with distinct codes so
/// callers can tell a bad payload from a bug.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ParseError>().is_some() {
        2
    } else if err.downcast_ref::<InvariantError>().is_some() {
        3
    } else {
        1
    }
}
