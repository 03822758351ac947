pub mod cli;
pub mod convert;
pub mod data;
pub mod dbf;
pub mod error;
pub mod io_utils;
pub mod schema;
pub mod xlsx;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    convert::ConversionReport,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("dbf_convert", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::CsvToDbf(args) => handle_csv_to_dbf(&args),
        Commands::DbfToCsv(args) => handle_dbf_to_csv(&args),
        Commands::DbfToXlsx(args) => handle_dbf_to_xlsx(&args),
        Commands::Info(args) => handle_info(&args),
    }
}

fn handle_csv_to_dbf(args: &cli::CsvToDbfArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let report = convert::csv_to_dbf(
        &args.input,
        &args.output,
        optional(&args.names),
        optional(&args.types),
        delimiter,
        encoding,
    )?;
    emit_report(&report, args.report_json)
}

fn handle_dbf_to_csv(args: &cli::DbfToCsvArgs) -> Result<()> {
    let delimiter = io_utils::resolve_output_delimiter(args.output.as_deref(), args.delimiter);
    let report = convert::dbf_to_csv(
        &args.input,
        args.output.as_deref(),
        optional(&args.names),
        delimiter,
    )?;
    emit_report(&report, args.report_json)
}

fn handle_dbf_to_xlsx(args: &cli::DbfToXlsxArgs) -> Result<()> {
    let report = convert::dbf_to_xlsx(&args.input, &args.output, optional(&args.names))?;
    emit_report(&report, args.report_json)
}

fn handle_info(args: &cli::InfoArgs) -> Result<()> {
    let (schema, count) = convert::describe_table(&args.input)?;
    for field in &schema.fields {
        println!("{:<12} {} ({})", field.name, field.ftype, field.ftype.tag());
    }
    println!("{count} record(s)");
    Ok(())
}

fn optional(values: &[String]) -> Option<&[String]> {
    if values.is_empty() { None } else { Some(values) }
}

fn emit_report(report: &ConversionReport, as_json: bool) -> Result<()> {
    info!(
        "Wrote {} row(s), skipped {} row(s), {} cell(s) nulled",
        report.rows_written, report.rows_skipped, report.cells_nulled
    );
    if as_json {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}
