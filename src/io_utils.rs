//! I/O helpers for the delimited-text endpoints.
//!
//! Provides delimiter resolution (extension-based auto-detection with manual
//! override), reader/writer construction for the `csv` crate, input decoding
//! via `encoding_rs` (UTF-8 by default), and the `-` path convention for
//! writing CSV to stdout. Output is always UTF-8 and always quoted for
//! round-trip safety.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{ConvertError, ConvertResult};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> ConvertResult<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| ConvertError::Unexpected(format!("unknown encoding '{value}'"))),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    if let Some(path) = path {
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str())
            && ext.eq_ignore_ascii_case("tsv")
        {
            return DEFAULT_TSV_DELIMITER;
        }
    }
    DEFAULT_CSV_DELIMITER
}

/// Opens a byte-record CSV reader over a regular file. The header row is
/// left for the caller to consume via [`reader_headers`].
pub fn open_csv_reader(path: &Path, delimiter: u8) -> ConvertResult<csv::Reader<BufReader<File>>> {
    if !path.exists() {
        return Err(ConvertError::EndpointNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    Ok(builder.from_reader(BufReader::new(file)))
}

/// Opens a CSV writer over a file, or stdout when the path is omitted or `-`.
pub fn open_csv_writer(
    path: Option<&Path>,
    delimiter: u8,
) -> ConvertResult<csv::Writer<Box<dyn Write>>> {
    let dest: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(File::create(p)?)),
        _ => Box::new(std::io::stdout()),
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(dest))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> ConvertResult<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(ConvertError::Unexpected(format!(
            "failed to decode input with encoding {}",
            encoding.name()
        )))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> ConvertResult<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> ConvertResult<Vec<String>>
where
    R: std::io::Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_follows_extension_unless_overridden() {
        assert_eq!(
            resolve_input_delimiter(Path::new("data.tsv"), None),
            DEFAULT_TSV_DELIMITER
        );
        assert_eq!(
            resolve_input_delimiter(Path::new("data.csv"), None),
            DEFAULT_CSV_DELIMITER
        );
        assert_eq!(
            resolve_input_delimiter(Path::new("data.tsv"), Some(b';')),
            b';'
        );
        assert_eq!(
            resolve_output_delimiter(Some(Path::new("out.tsv")), None),
            DEFAULT_TSV_DELIMITER
        );
    }

    #[test]
    fn unknown_encoding_label_is_rejected() {
        assert!(resolve_encoding(Some("utf-8")).is_ok());
        assert!(resolve_encoding(Some("windows-1252")).is_ok());
        assert!(resolve_encoding(Some("not-a-charset")).is_err());
    }

    #[test]
    fn missing_input_is_endpoint_not_found() {
        let err = open_csv_reader(Path::new("/no/such/file.csv"), b',').unwrap_err();
        assert!(matches!(err, ConvertError::EndpointNotFound(_)));
    }
}
