//! Header mapping preview.
//!
//! Reads only the header row of an input file and lists which canonical field
//! each column would feed, so alias tables can be checked before a full run.

use anyhow::Result;
use log::{info, warn};

use crate::{
    clean::load_config, cli::ColumnsArgs, io_utils, mapping::ColumnMapping, record::RecordType,
    report,
};

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    let record_type = RecordType::from(args.kind);

    let mut reader = io_utils::open_csv_reader_from_path(&args.input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, input_encoding)?;
    let mapping =
        ColumnMapping::resolve_lenient(&headers, record_type, config.aliases_for(record_type));

    let rows = report::mapping_rows(&headers, &mapping);
    print!(
        "{}",
        report::render_rows(&["#", "header", "normalized", "field"], &rows)
    );

    let unmapped = record_type
        .fields()
        .iter()
        .filter(|field| !mapping.is_mapped(**field))
        .map(|field| field.as_str())
        .collect::<Vec<_>>();
    if !unmapped.is_empty() {
        warn!("No column feeds {}", unmapped.join(", "));
    }
    mapping.ensure_required()?;
    info!(
        "{} of {} column(s) map onto {} fields",
        headers.len() - mapping.unmapped_headers().len(),
        headers.len(),
        record_type
    );
    Ok(())
}
