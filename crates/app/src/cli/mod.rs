use clap::{Args, Parser, Subcommand};
use vouchers_app::{
    context::{AppContext, AppSettings},
    domain::vouchers::DEFAULT_MAX_CODE_ATTEMPTS,
};

mod cleanup;
mod generate;
mod in_use;
mod list;
mod lookup;
mod migrate;
mod output;
mod purge;
mod redeem;

#[derive(Debug, Parser)]
#[command(name = "vouchers-app", about = "Cash voucher back-office CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),
    /// Issue a new voucher
    Generate(generate::GenerateArgs),
    /// Look up vouchers by code
    Lookup(lookup::LookupArgs),
    /// List vouchers matching a filter
    List(list::ListArgs),
    /// Redeem the active vouchers of a code
    Redeem(redeem::RedeemArgs),
    /// Set or clear the in-use flag of a code
    InUse(in_use::InUseArgs),
    /// Delete vouchers past their retention period
    Cleanup(cleanup::CleanupArgs),
    /// Delete every voucher
    Purge(purge::PurgeArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Migrate(args) => migrate::run(args).await,
            Commands::Generate(args) => generate::run(args).await,
            Commands::Lookup(args) => lookup::run(args).await,
            Commands::List(args) => list::run(args).await,
            Commands::Redeem(args) => redeem::run(args).await,
            Commands::InUse(args) => in_use::run(args).await,
            Commands::Cleanup(args) => cleanup::run(args).await,
            Commands::Purge(args) => purge::run(args).await,
        }
    }
}

/// Connection options shared by every command that talks to the service.
#[derive(Debug, Args)]
pub(crate) struct ServiceArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Attempts at finding a free code before generation fails
    #[arg(long, env = "VOUCHER_CODE_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_CODE_ATTEMPTS)]
    max_code_attempts: u32,
}

impl ServiceArgs {
    pub(crate) async fn context(&self) -> Result<AppContext, String> {
        AppContext::from_database_url(
            &self.database_url,
            AppSettings {
                run_migrations: false,
                max_code_attempts: self.max_code_attempts,
            },
        )
        .await
        .map_err(|error| format!("failed to initialise vouchers service: {error}"))
    }
}
