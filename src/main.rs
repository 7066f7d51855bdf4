// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:    CLI flags, JSON config file, interactive prompts
// - schema:    Wind sample and reading records
// - parser:    Plain-text wind payload parser
// - stats:     Mean / min / max / sample standard deviation
// - report:    CSV output and the final statistics block
// - transport: Transport trait and the MQTT implementation
// - collector: Session state machine and the event loop runner
// - metrics:   Process-wide counters
// - util:      Time and text helpers
//
mod collector;
mod config;
mod metrics;
mod parser;
mod report;
mod schema;
mod stats;
mod transport;
mod util;

// ------------------------------------------------------------
// External dependencies
// ------------------------------------------------------------

use clap::Parser;
use log::info;

use collector::runner::{Outcome, run_collection};
use config::{Args, Config, FileConfig};
use transport::mqtt::MqttTransport;

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize logging
// - Resolve configuration (flags, config file, prompts)
// - Ask for confirmation
// - Run one collection until the target count or Ctrl+C
//
// Any error returned here exits the process with a non-zero
// status (refused connection, empty topic, unwritable file).
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("MQTT Wind Data Collector");
    println!("{}", util::rule(30));

    let cfg = load_config(&args)?;

    config::print_settings(&cfg);
    if !args.yes {
        let answer = config::prompt_stdin("\nProceed? (y/N): ")?;
        if !config::is_confirmed(&answer) {
            println!("Collection cancelled.");
            return Ok(());
        }
    }

    let mut transport = MqttTransport::connect(&cfg.broker);

    let shutdown = async {
        // If the handler cannot be installed, never fire
        if tokio::signal::ctrl_c().await.is_err() {
            futures_util::future::pending::<()>().await;
        }
    };

    match run_collection(&mut transport, &cfg, shutdown).await? {
        Outcome::Completed(s) => info!("collection complete ({} readings)", s.count),
        Outcome::Interrupted(s) => info!("collection interrupted ({} readings saved)", s.count),
        Outcome::NoData => info!("collection interrupted, nothing saved"),
    }

    Ok(())
}

// ------------------------------------------------------------
// Configuration loader
// ------------------------------------------------------------
//
// Reads the optional JSON config file, overlays CLI flags and
// prompts on stdin for anything still missing.
//
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let file = match &args.config {
        Some(path) => config::load_file_config(path)?,
        None => FileConfig::default(),
    };

    config::resolve(args, file, config::prompt_stdin)
}
