//! # pricer: Command-Line Pricing Host
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          pricer                                         │
//! │                                                                         │
//! │   argv ──► Cli (clap) ──► PricerConfig::load ──► logging::init          │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                              PricerApp::new (seed / promotions file)    │
//! │                                    │                                    │
//! │              ┌───────────┬─────────┼─────────┬────────────┐             │
//! │              ▼           ▼         ▼         ▼            ▼             │
//! │            price     validate   preview   catalog    conflicts          │
//! │              │                                                          │
//! │              ▼                                                          │
//! │        stdout (JSON)                    logs ──► stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Codes
//! - `0` success
//! - `1` internal failure (storage, logging)
//! - `2` bad input, configuration, or a business rule rejection

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use promo_core::PromotionId;
use serde::Serialize;

pub use app::PricerApp;
pub use config::PricerConfig;
pub use error::{AppError, AppResult};

#[derive(Debug, Parser)]
#[command(
    name = "pricer",
    version,
    about = "Price shopping carts against the promotion catalog",
    after_help = "Examples:\n  pricer price --request demos/new-customer-cart.json\n  pricer price --request cart.json --promotion 00000000-0000-0000-0000-000000003002\n  pricer conflicts"
)]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Extra promotion definitions to load (JSON array).
    #[arg(long, global = true, value_name = "PATH")]
    promotions: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply eligible promotions to a cart request and print the result")]
    Price {
        #[arg(long, value_name = "PATH")]
        request: PathBuf,

        /// Apply only this promotion; fails if it is not eligible.
        #[arg(long, value_name = "UUID")]
        promotion: Option<PromotionId>,
    },
    #[command(about = "Check a cart request and report every problem found")]
    Validate {
        #[arg(long, value_name = "PATH")]
        request: PathBuf,
    },
    #[command(about = "Show which promotions would apply to a cart request and why")]
    Preview {
        #[arg(long, value_name = "PATH")]
        request: PathBuf,
    },
    #[command(about = "List every promotion in the catalog")]
    Catalog,
    #[command(about = "List conflicts between active promotions")]
    Conflicts,
    #[command(about = "Print the effective configuration")]
    Config {
        /// Also write it to the config path.
        #[arg(long)]
        write: bool,
    },
}

/// Parses arguments, runs the command and maps failures to an exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn execute(cli: Cli) -> AppResult<String> {
    let mut config = PricerConfig::load(cli.config.clone())?;
    if let Some(path) = cli.promotions {
        config.catalog.promotions_file = Some(path);
    }
    logging::init(&config.logging)?;

    let pretty = cli.pretty;
    match cli.command {
        Command::Config { write } => {
            if write {
                config.save(cli.config)?;
            }
            Ok(toml::to_string_pretty(&config)?)
        }
        Command::Price { request, promotion } => {
            let request = app::read_request(&request)?;
            render(&PricerApp::new(config)?.price(&request, promotion)?, pretty)
        }
        Command::Validate { request } => {
            let request = app::read_request(&request)?;
            render(&PricerApp::new(config)?.validate(&request)?, pretty)
        }
        Command::Preview { request } => {
            let request = app::read_request(&request)?;
            render(&PricerApp::new(config)?.preview(&request)?, pretty)
        }
        Command::Catalog => render(&PricerApp::new(config)?.catalog()?, pretty),
        Command::Conflicts => render(&PricerApp::new(config)?.conflicts()?, pretty),
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> AppResult<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}
