//! Demo runner for the graceful main-task coordinator.
//!
//! ```text
//! setup-main sleep --secs 5        # finishes normally
//! setup-main sleep --secs 60       # press Ctrl+C: cancelled
//! setup-main fail                  # arithmetic error, contained
//! setup-main blocking --secs 5     # Ctrl+C is recorded, body not interrupted
//! setup-main cooperative --secs 30 # body watches the stop condition itself
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use setup_main::config::{load_config, MainConfig};
use setup_main::lifecycle::TaskError;
use setup_main::{setup_main, Hooks, MainTask, StopCondition, TaskResult};

#[derive(Parser)]
#[command(name = "setup-main")]
#[command(about = "Run a demo main task under graceful shutdown", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sleep asynchronously, then finish
    Sleep {
        #[arg(long, default_value_t = 5)]
        secs: u64,
    },
    /// Fail immediately with an arithmetic error
    Fail,
    /// Sleep on a blocking thread (cannot be cancelled)
    Blocking {
        #[arg(long, default_value_t = 5)]
        secs: u64,
    },
    /// Tick once per second and watch the stop condition
    Cooperative {
        #[arg(long, default_value_t = 30)]
        secs: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        },
        None => MainConfig::default(),
    };

    let hooks = Hooks::standard(&config.logging);
    let task = match cli.command {
        Commands::Sleep { secs } => MainTask::future(sleep_for(secs)),
        Commands::Fail => MainTask::future(divide(10, 0)),
        Commands::Blocking { secs } => MainTask::blocking(move |stop| block_for(secs, stop)),
        Commands::Cooperative { secs } => MainTask::with_stop(move |stop| tick(secs, stop)),
    };

    match setup_main(config, hooks, task) {
        Ok(outcome) if outcome.is_failed() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn sleep_for(secs: u64) -> TaskResult {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    Ok(())
}

async fn divide(a: u64, b: u64) -> TaskResult {
    let quotient = a.checked_div(b).ok_or_else(|| TaskError::from("division by zero"))?;
    tracing::info!(quotient, "Division succeeded");
    Ok(())
}

fn block_for(secs: u64, stop: StopCondition) -> TaskResult {
    std::thread::sleep(Duration::from_secs(secs));
    if stop.is_set() {
        tracing::info!("Stop was requested while blocking; finished anyway");
    }
    Ok(())
}

async fn tick(secs: u64, stop: StopCondition) -> TaskResult {
    for n in 1..=secs {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                tracing::info!(tick = n, "Working");
            }
            _ = stop.wait() => {
                tracing::info!(tick = n, "Stop observed by task");
                return Ok(());
            }
        }
    }
    Ok(())
}
