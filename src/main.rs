mod host;

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use host::config::HostConfig;

#[derive(Debug, Parser)]
#[command(name = "digit-telemetry")]
#[command(about = "Live digit recognition monitor and dataset collector")]
struct Cli {
    /// TOML file with [serial] and [session] tables
    #[arg(long, short)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show touch points and recognition results as they arrive
    Live(LiveArgs),
    /// Record labeled samples to a CSV dataset
    Collect(CollectArgs),
}

#[derive(Debug, Args)]
struct PortArgs {
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    baud: Option<u32>,
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,
}

impl PortArgs {
    fn apply(self, config: &mut HostConfig) {
        if let Some(port) = self.port {
            config.serial.port = Some(port);
        }
        if let Some(baud) = self.baud {
            config.serial.baud = baud;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.session.tick_ms = tick_ms;
        }
    }
}

#[derive(Debug, Args)]
struct LiveArgs {
    #[command(flatten)]
    port: PortArgs,
}

#[derive(Debug, Args)]
struct CollectArgs {
    #[command(flatten)]
    port: PortArgs,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => HostConfig::from_file(path)?,
        None => HostConfig::default(),
    };
    let running = host::setup_ctrl_c_handler()?;

    let outcome = match cli.command {
        Commands::Live(args) => {
            args.port.apply(&mut config);
            host::run_live(&config, &running)
        }
        Commands::Collect(args) => {
            args.port.apply(&mut config);
            if let Some(output) = args.output {
                config.session.output = output;
            }
            host::run_collect(&config, &running)
        }
    };

    if outcome.is_ok() && !running.load(Ordering::SeqCst) {
        log::info!("stopped by user");
    }
    outcome
}
