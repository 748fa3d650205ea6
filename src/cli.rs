use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use crate::api::{
    ApiLimits, EvaluatePayload, SingleGoalPayload, run_http_server, run_plan, run_single_goal,
};
use crate::config::{DEFAULT_MAX_SIMULATIONS, LogFormat, ServerConfig};
use crate::report::Report;

#[derive(Parser, Debug)]
#[command(
    name = "goalcast",
    about = "Monte Carlo goal feasibility after fees, tax and inflation"
)]
pub struct Cli {
    #[arg(long, value_enum, env = "GOALCAST_LOG_FORMAT", default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
    #[arg(
        long,
        env = "GOALCAST_MAX_SIMULATIONS",
        default_value_t = DEFAULT_MAX_SIMULATIONS,
        global = true,
        help = "Upper bound on simulations accepted per request"
    )]
    pub max_simulations: u32,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, env = "GOALCAST_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Evaluate a multi-goal plan read from a JSON file; without `--input`, or for
    /// fields the file omits, the built-in example plan is used.
    Evaluate {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        simulations: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Gross feasibility of a single goal, without tax, fees or inflation.
    EvaluateGoal {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        simulations: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let limits = ApiLimits {
        max_simulations: cli.max_simulations,
    };
    match cli.command {
        Command::Serve { port } => {
            run_http_server(ServerConfig::new(port, cli.max_simulations))
                .await
                .context("HTTP server failed")?;
        }
        Command::Evaluate {
            input,
            simulations,
            seed,
        } => {
            let mut payload = read_payload::<EvaluatePayload>(input.as_deref())?;
            payload.override_settings(simulations, seed);
            print_report(&run_plan(payload, limits)?)?;
        }
        Command::EvaluateGoal {
            input,
            simulations,
            seed,
        } => {
            let mut payload = read_payload::<SingleGoalPayload>(input.as_deref())?;
            payload.override_settings(simulations, seed);
            print_report(&run_single_goal(payload, limits)?)?;
        }
    }
    Ok(())
}

fn read_payload<T: DeserializeOwned + Default>(path: Option<&Path>) -> anyhow::Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_report(report: &Report) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
