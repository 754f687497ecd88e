//! RPM clock controller node
//!
//! Interactive shell over a clock controller backed by a simulated RPM.

use clap::Parser;
use rpmcc_core::{ClockController, RateHz, RpmState};
use rpmcc_node::command::{self, Command, HELP};
use rpmcc_node::{NodeConfig, SimulatedAgent};
use std::io::{self, BufRead};
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Simulated RPM clock controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<String>,

    /// Platform compatible string (overrides config)
    #[arg(short, long)]
    platform: Option<String>,

    /// Pending rate to seed, as <clock>=<hz> (repeatable)
    #[arg(short, long = "rate", value_parser = parse_rate_seed)]
    rates: Vec<(String, RateHz)>,

    /// Probability the agent rejects a request
    #[arg(long)]
    fail_rate: Option<f64>,

    /// Only reject requests for this set (active, sleep)
    #[arg(long, value_parser = parse_state)]
    fail_state: Option<RpmState>,

    /// Simulated agent latency in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_rate_seed(s: &str) -> Result<(String, RateHz), String> {
    let (clock, hz) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <clock>=<hz>, got '{}'", s))?;
    let hz = hz.parse().map_err(|_| format!("invalid rate '{}'", hz))?;
    Ok((clock.to_string(), hz))
}

fn parse_state(s: &str) -> Result<RpmState, String> {
    match s {
        "active" => Ok(RpmState::Active),
        "sleep" => Ok(RpmState::Sleep),
        _ => Err(format!("unknown state '{}'", s)),
    }
}

fn build_config(args: &Args) -> rpmcc_node::Result<NodeConfig> {
    let mut config = match &args.config {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };

    if let Some(platform) = &args.platform {
        config = config.with_platform(platform);
    }
    for (clock, hz) in &args.rates {
        config = config.with_rate(clock, *hz);
    }
    if let Some(rate) = args.fail_rate {
        config = config.with_failure_rate(rate);
    }
    if let Some(state) = args.fail_state {
        config = config.with_fail_state(state);
    }
    if let Some(ms) = args.latency_ms {
        config = config.with_latency(Duration::from_millis(ms));
    }

    config.agent.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Setup logging
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = build_config(&args)?;
    info!("RPM clock node starting on {}", config.controller.platform);

    let (agent, transport) = SimulatedAgent::new(config.agent.clone());
    let agent_state = agent.handle();
    let agent_task = tokio::spawn(agent.run());

    // The controller blocks on every request, so it runs off the async runtime
    let shell = tokio::task::spawn_blocking(move || -> rpmcc_node::Result<()> {
        let cc = ClockController::probe(transport, &config.controller)?;

        println!("\n{}", HELP);
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let cmd = match Command::parse(&line) {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };
            if cmd == Command::Quit {
                break;
            }

            match command::execute(&cc, &agent_state, &cmd) {
                Ok(out) => println!("{}", out),
                Err(e) => println!("error: {}", e),
            }
        }
        Ok(())
    });

    if let Err(e) = shell.await? {
        error!("Node stopped: {}", e);
        return Err(e.into());
    }

    // Controller dropped with the shell; the agent drains and exits
    agent_task.await?;
    info!("RPM clock node stopped");
    Ok(())
}
