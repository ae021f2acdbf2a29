pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod dedup;
pub mod error;
pub mod io_utils;
pub mod mapping;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod score;
pub mod stats;
pub mod validate;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

pub use config::CleaningConfig;
pub use dedup::{LatestRow, MostComplete, SurvivorPolicy};
pub use error::{ConfigError, SchemaError};
pub use pipeline::{CleanOutcome, Cleaner, clean};
pub use record::{CanonicalRecord, RawRecord, RawTable, RecordType};
pub use stats::CleaningStats;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging(quiet: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            let level = if quiet {
                LevelFilter::Warn
            } else {
                LevelFilter::Info
            };
            builder.filter_module("record_scrub", level);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let quiet = matches!(&cli.command, Commands::Clean(args) if args.quiet);
    init_logging(quiet);
    match cli.command {
        Commands::Clean(args) => clean::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
        Commands::Config(args) => handle_config(&args),
    }
}

fn handle_config(args: &cli::ConfigArgs) -> Result<()> {
    let config = CleaningConfig::default();
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            config
                .save(path)
                .with_context(|| format!("Writing configuration to {path:?}"))?;
            info!("Default configuration written to {path:?}");
        }
        _ => {
            let yaml = config.to_yaml_string()?;
            std::io::stdout()
                .write_all(yaml.as_bytes())
                .context("Writing configuration to stdout")?;
        }
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
