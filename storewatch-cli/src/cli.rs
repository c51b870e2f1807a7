use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storewatch_core::{
    Config, Database, FetchErrorPolicy, ForecastClient, ForecastLedger, Pipeline,
    PipelineOptions, StoreCatalog, client_from_config, read_shop_records,
};
use tracing::info;

use crate::{configure, output};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "storewatch", version, about = "Weather risk tracking for shop locations")]
pub struct Cli {
    /// Runs the ingestion pipeline when no subcommand is given.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync shops from the CSV file and record a forecast for every shop.
    Run(RunArgs),

    /// Print the nearest 3-hour forecast for a coordinate.
    Forecast {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Print stored rows.
    Show {
        table: Table,

        /// Database file, overrides configuration.
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Interactively set the API key and database location.
    Configure,
}

#[derive(Debug, Default, clap::Args)]
pub struct RunArgs {
    /// Shop list CSV, overrides configuration.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Database file, overrides configuration.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Keep going when the forecast for one shop cannot be fetched.
    #[arg(long)]
    pub skip_failed: bool,

    /// Number of forecast requests in flight.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Table {
    Shops,
    Forecasts,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Run(RunArgs::default())) {
            Command::Run(args) => run_pipeline(Config::load()?, args).await,
            Command::Forecast { lat, lon } => forecast(&Config::load()?, lat, lon).await,
            Command::Show { table, db } => {
                let mut config = Config::load()?;
                if let Some(path) = db {
                    config.database_path = Some(path);
                }
                show(&config, table)
            }
            Command::Configure => configure::run(),
        }
    }
}

fn open_database(config: &Config) -> Result<Database> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
    }

    Database::open(&path).with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Open a database that must already exist, without creating it.
fn open_existing_database(config: &Config) -> Result<Database> {
    let path = config.database_path()?;
    if !path.is_file() {
        bail!(
            "Database not found: {}\n\
             Hint: run `storewatch run` first, or pass --db with the path of an existing database.",
            path.display()
        );
    }

    Database::open(&path).with_context(|| format!("Failed to open database: {}", path.display()))
}

async fn run_pipeline(mut config: Config, args: RunArgs) -> Result<()> {
    if let Some(path) = args.csv {
        config.shops_csv = Some(path);
    }
    if let Some(path) = args.db {
        config.database_path = Some(path);
    }
    if args.skip_failed {
        config.on_fetch_error = FetchErrorPolicy::Skip;
    }
    if let Some(n) = args.concurrency {
        config.concurrency = n;
    }

    let api_key = config.api_key()?;
    let csv_path = config.shops_csv();
    let records = read_shop_records(&csv_path)
        .with_context(|| format!("Failed to read shop list: {}", csv_path.display()))?;
    info!(path = %csv_path.display(), records = records.len(), "loaded shop list");

    let mut db = open_database(&config)?;
    let client = client_from_config(&config);
    let options = PipelineOptions {
        on_fetch_error: config.on_fetch_error,
        concurrency: config.concurrency,
    };

    let report = Pipeline::new(client.as_ref(), options)
        .run(&mut db, &records, api_key)
        .await?;

    println!("{}", output::format_report(&report));
    Ok(())
}

async fn forecast(config: &Config, lat: f64, lon: f64) -> Result<()> {
    let api_key = config.api_key()?;
    let client = client_from_config(config);

    let reading = client.fetch(lat, lon, api_key).await?;

    println!("{}", output::format_reading(&reading));
    Ok(())
}

fn show(config: &Config, table: Table) -> Result<()> {
    let db = open_existing_database(config)?;

    let text = match table {
        Table::Shops => output::format_shops(&StoreCatalog::new(db.connection()).shops()?),
        Table::Forecasts => {
            output::format_forecasts(&ForecastLedger::new(db.connection()).list()?)
        }
    };

    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["storewatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "storewatch",
            "run",
            "--csv",
            "shops.csv",
            "--skip-failed",
            "--concurrency",
            "4",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.csv, Some(PathBuf::from("shops.csv")));
                assert!(args.skip_failed);
                assert_eq!(args.concurrency, Some(4));
                assert!(args.db.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn forecast_accepts_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["storewatch", "forecast", "--lat", "-33.8325", "--lon", "18.647499"])
                .unwrap();

        match cli.command {
            Some(Command::Forecast { lat, lon }) => {
                assert_eq!(lat, -33.8325);
                assert_eq!(lon, 18.647499);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn config_with_db(path: PathBuf) -> Config {
        Config {
            database_path: Some(path),
            ..Config::default()
        }
    }

    #[test]
    fn show_fails_for_missing_database_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");

        let err = show(&config_with_db(path.clone()), Table::Shops).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Database not found"));
        assert!(msg.contains("Hint: run `storewatch run` first"));
        assert!(!path.exists());
    }

    #[test]
    fn show_reads_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shops.db");
        Database::open(&path).unwrap();

        let config = config_with_db(path);
        assert!(show(&config, Table::Shops).is_ok());
        assert!(show(&config, Table::Forecasts).is_ok());
    }

    #[test]
    fn show_requires_known_table() {
        assert!(Cli::try_parse_from(["storewatch", "show", "shops"]).is_ok());
        assert!(Cli::try_parse_from(["storewatch", "show", "forecasts"]).is_ok());
        assert!(Cli::try_parse_from(["storewatch", "show", "users"]).is_err());
    }
}
