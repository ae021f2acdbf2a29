use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    dedup::{LatestRow, MostComplete, SurvivorPolicy},
    record::RecordType,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean and deduplicate contact and account exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize, validate, and deduplicate a CSV export
    Clean(CleanArgs),
    /// Show how input headers map onto canonical fields
    Columns(ColumnsArgs),
    /// Write the default cleaning configuration as YAML
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum RecordKind {
    Contacts,
    Accounts,
}

impl From<RecordKind> for RecordType {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Contacts => RecordType::Contact,
            RecordKind::Accounts => RecordType::Account,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum KeepPolicy {
    #[default]
    MostComplete,
    Latest,
}

impl KeepPolicy {
    pub fn into_policy(self) -> Box<dyn SurvivorPolicy> {
        match self {
            KeepPolicy::MostComplete => Box::new(MostComplete::default()),
            KeepPolicy::Latest => Box::new(LatestRow),
        }
    }
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Input CSV file to clean (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Kind of records in the input
    #[arg(short = 'k', long = "kind", value_enum)]
    pub kind: RecordKind,
    /// YAML configuration overriding the default alias tables and lists
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Which duplicate survives when several rows share an identity key
    #[arg(long = "keep", value_enum, default_value = "most-complete")]
    pub keep: KeepPolicy,
    /// Append a `source` column with this value to every output row
    #[arg(long = "source")]
    pub source: Option<String>,
    /// Write the run statistics as JSON to this file
    #[arg(long = "stats-json")]
    pub stats_json: Option<PathBuf>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Suppress progress messages and the summary block
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input CSV file whose header row should be inspected
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Kind of records in the input
    #[arg(short = 'k', long = "kind", value_enum)]
    pub kind: RecordKind,
    /// YAML configuration overriding the default alias tables
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
