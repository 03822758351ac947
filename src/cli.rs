use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert between CSV, DBF, and XLSX tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a delimited text file into a new DBF table
    CsvToDbf(CsvToDbfArgs),
    /// Convert a DBF table into delimited text
    DbfToCsv(DbfToCsvArgs),
    /// Convert a DBF table into a single-sheet Excel workbook
    DbfToXlsx(DbfToXlsxArgs),
    /// Display a DBF table's fields and record count
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct CsvToDbfArgs {
    /// Input CSV file to convert
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination DBF file path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Comma-separated field names (defaults to the CSV header row)
    #[arg(long = "names", value_delimiter = ',')]
    pub names: Vec<String>,
    /// Comma-separated field types matched positionally to the names,
    /// e.g. `C,N,F,L,D`; unrecognized tokens fall back to Character
    #[arg(long = "types", value_delimiter = ',')]
    pub types: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Print the conversion report as JSON on stdout
    #[arg(long = "report-json")]
    pub report_json: bool,
}

#[derive(Debug, Args)]
pub struct DbfToCsvArgs {
    /// Input DBF file to convert
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Comma-separated output column names (defaults to the table's fields)
    #[arg(long = "names", value_delimiter = ',')]
    pub names: Vec<String>,
    /// Delimiter to use for output
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Print the conversion report as JSON on stdout
    #[arg(long = "report-json")]
    pub report_json: bool,
}

#[derive(Debug, Args)]
pub struct DbfToXlsxArgs {
    /// Input DBF file to convert
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination .xlsx file path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Comma-separated output column names (defaults to the table's fields)
    #[arg(long = "names", value_delimiter = ',')]
    pub names: Vec<String>,
    /// Print the conversion report as JSON on stdout
    #[arg(long = "report-json")]
    pub report_json: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// DBF file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
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
