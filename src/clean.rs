use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::CleanArgs,
    config::CleaningConfig,
    io_utils,
    pipeline::{CleanOutcome, Cleaner, Diagnostics},
    printable_delimiter,
    record::RecordType,
    report,
    stats::CleaningStats,
};

#[derive(Debug, Serialize)]
struct StatsReport<'a> {
    record_type: RecordType,
    policy: &'a str,
    stats: &'a CleaningStats,
    diagnostics: &'a Diagnostics,
}

pub fn execute(args: &CleanArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    let record_type = RecordType::from(args.kind);

    info!(
        "Reading {} records from '{}' with delimiter '{}'",
        record_type,
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let table = io_utils::read_raw_table_from_path(&args.input, delimiter, input_encoding)?;
    info!(
        "Loaded {} row(s) across {} column(s)",
        table.len(),
        table.headers.len()
    );

    let cleaner = Cleaner::new(&config).with_boxed_policy(args.keep.into_policy());
    // A schema failure must surface before the output file is created.
    let outcome = cleaner.clean(&table, record_type)?;

    let output_delimiter = io_utils::resolve_output_delimiter(
        args.output.as_deref(),
        args.output_delimiter,
        delimiter,
    );
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), output_delimiter)?;
    let written = io_utils::write_outcome(&mut writer, &outcome, args.source.as_deref())?;

    if let Some(path) = &args.stats_json {
        write_stats(path, &outcome, cleaner.policy_name())?;
        info!("Statistics written to {path:?}");
    }
    if !args.quiet {
        eprint!("{}", report::render_summary(&outcome));
    }
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            info!("Wrote {written} clean row(s) to {path:?}");
        }
        _ => info!("Wrote {written} clean row(s) to stdout"),
    }
    Ok(())
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<CleaningConfig> {
    match path {
        Some(path) => CleaningConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}")),
        None => Ok(CleaningConfig::default()),
    }
}

fn write_stats(path: &Path, outcome: &CleanOutcome, policy: &str) -> Result<()> {
    let report = StatsReport {
        record_type: outcome.record_type,
        policy,
        stats: &outcome.stats,
        diagnostics: &outcome.diagnostics,
    };
    io_utils::write_json(path, &report)
}
