//! Vouchers Retention Worker
//!
//! Runs the retention sweeper against the voucher store until the process
//! receives SIGINT or SIGTERM.

use std::process;

use thiserror::Error;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use vouchers_app::{
    context::{AppContext, AppInitError},
    domain::vouchers::retention::RetentionSweeper,
};

use crate::{config::WorkerConfig, observability::ObservabilityError};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config;
mod observability;
mod shutdown;

/// Fatal worker failures.
#[derive(Debug, Error)]
enum WorkerError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error("failed to initialize app context: {0}")]
    AppInit(#[from] AppInitError),

    #[error("retention sweeper task failed: {0}")]
    Sweeper(#[from] JoinError),
}

/// Vouchers retention worker entry point
#[tokio::main]
pub async fn main() {
    let config = WorkerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(run_error) = run(config).await {
        #[expect(
            clippy::print_stderr,
            reason = "the subscriber may be the thing that failed to initialize"
        )]
        {
            eprintln!("{run_error}");
        }

        process::exit(1);
    }
}

async fn run(config: WorkerConfig) -> Result<(), WorkerError> {
    observability::init_subscriber(&config.logging)?;

    let app = AppContext::from_database_url(&config.database.database_url, config.app_settings())
        .await?;

    let cancel = CancellationToken::new();

    let sweeper = RetentionSweeper::new(app.vouchers).with_interval(config.retention.interval());

    let sweeper_task = tokio::spawn(sweeper.run(cancel.clone()));

    // Listen for shutdown signal
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(shutdown_cancel).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    sweeper_task.await?;

    info!("worker stopped");

    Ok(())
}
