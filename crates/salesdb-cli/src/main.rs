mod db;
mod etl;
mod stats;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "salesdb-cli")]
#[command(about = "Square sales ETL command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Extract, transform and load sales for the configured locations (needs SQUARE_ACCESS_TOKEN)
    Etl {
        /// Cap each location at SALESDB_SAMPLE_ORDER_LIMIT orders
        #[arg(long)]
        sample: bool,
        /// Restrict the run to one location (internal id)
        #[arg(long)]
        location: Option<i64>,
        /// First business-local date to load (requires --end)
        #[arg(long, env = "SALESDB_START_DATE")]
        start: Option<NaiveDate>,
        /// Last business-local date to load, inclusive (requires --start)
        #[arg(long, env = "SALESDB_END_DATE")]
        end: Option<NaiveDate>,
        /// Extract and transform without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show sales row counts and date spans per location
    Stats {
        /// Restrict output to one location (internal id)
        #[arg(long)]
        location: Option<i64>,
    },
    /// Delete one location's sales for one month
    Purge {
        /// Location internal id
        #[arg(long)]
        location: i64,
        /// Month bucket, YYYY-MM
        #[arg(long, value_parser = stats::parse_month_bucket)]
        month: String,
        /// Actually delete; without it only the matching row count is shown
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert locations from the locations file
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("salesdb-cli: run with --help to list commands");
        return Ok(());
    };

    let config = salesdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_db_ping(&config).await,
            DbCommands::Migrate => db::run_db_migrate(&config).await,
            DbCommands::Seed => db::run_db_seed(&config).await,
        },
        Commands::Etl {
            sample,
            location,
            start,
            end,
            dry_run,
        } => {
            let args = etl::EtlArgs {
                sample,
                location,
                start,
                end,
                dry_run,
            };
            let status = etl::run_etl(&config, &args).await?;
            if !status.is_success() {
                anyhow::bail!("etl run finished with status {status}");
            }
            Ok(())
        }
        Commands::Stats { location } => stats::run_stats(&config, location).await,
        Commands::Purge {
            location,
            month,
            confirm,
        } => stats::run_purge(&config, location, &month, confirm).await,
    }
}
