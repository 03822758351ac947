//! Conversion orchestration: resolve schema, validate, coerce, write.
//!
//! Each conversion runs the same pipeline: acquire both endpoints (scoped,
//! released on every exit path), resolve the schema, then stream rows —
//! validate the shape, coerce every cell, append to the destination. A
//! failure to open an endpoint or resolve the schema aborts before any row
//! is processed; a malformed row or unparsable cell never aborts, it is
//! counted in the report and processing continues.

use std::path::Path;

use encoding_rs::Encoding;
use log::{info, warn};
use serde::Serialize;

use crate::{
    data::{TypedValue, coerce},
    dbf::{DbfSink, DbfSource},
    error::ConvertResult,
    io_utils,
    schema::Schema,
    xlsx,
};

/// Per-conversion outcome. `cells_nulled` counts cells whose coercion
/// produced `Null`; skipped rows are rows dropped for a column-count
/// mismatch. Nothing fails silently: every source row lands in exactly one
/// of the two row counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub rows_written: usize,
    pub rows_skipped: usize,
    pub cells_nulled: usize,
}

/// True iff the raw row's column count matches the schema.
pub fn row_shape_ok(row: &[String], schema: &Schema) -> bool {
    row.len() == schema.len()
}

/// Coerces one validated row into a positionally aligned typed record,
/// returning the record and the number of cells that degraded to `Null`.
pub fn coerce_row(row: &[String], schema: &Schema) -> (Vec<TypedValue>, usize) {
    let mut nulled = 0;
    let record = schema
        .fields
        .iter()
        .zip(row)
        .map(|(field, raw)| {
            let value = coerce(raw, field.ftype);
            if value.is_null() {
                nulled += 1;
            }
            value
        })
        .collect();
    (record, nulled)
}

/// Converts a delimited text file into a freshly created DBF table.
pub fn csv_to_dbf(
    input: &Path,
    output: &Path,
    names: Option<&[String]>,
    types: Option<&[String]>,
    delimiter: u8,
    encoding: &'static Encoding,
) -> ConvertResult<ConversionReport> {
    info!(
        "Converting '{}' -> '{}'",
        input.display(),
        output.display()
    );
    let mut reader = io_utils::open_csv_reader(input, delimiter)?;
    let header = io_utils::reader_headers(&mut reader, encoding)?;
    let schema = Schema::resolve(Some(&header), names, types)?;
    let mut sink = DbfSink::create(output, &schema)?;

    let mut report = ConversionReport::default();
    let mut record = csv::ByteRecord::new();
    let mut row_number = 0usize;
    while reader.read_byte_record(&mut record)? {
        row_number += 1;
        let row = io_utils::decode_record(&record, encoding)?;
        if !row_shape_ok(&row, &schema) {
            warn!(
                "Skipping row {row_number}: expected {} column(s), found {}",
                schema.len(),
                row.len()
            );
            report.rows_skipped += 1;
            continue;
        }
        let (typed, nulled) = coerce_row(&row, &schema);
        sink.append(&typed)?;
        report.rows_written += 1;
        report.cells_nulled += nulled;
    }
    Ok(report)
}

/// Converts a DBF table into delimited text (stdout when `output` is `None`
/// or `-`), one header row then one row per stored record, `Null` rendered
/// as an empty field.
pub fn dbf_to_csv(
    input: &Path,
    output: Option<&Path>,
    names: Option<&[String]>,
    delimiter: u8,
) -> ConvertResult<ConversionReport> {
    info!(
        "Converting '{}' -> {}",
        input.display(),
        output
            .map(|p| format!("'{}'", p.display()))
            .unwrap_or_else(|| "stdout".to_string())
    );
    let mut source = DbfSource::open(input)?;
    let schema = source.schema().clone().with_overrides(names, None)?;
    let mut writer = io_utils::open_csv_writer(output, delimiter)?;
    writer.write_record(&schema.names())?;

    let mut report = ConversionReport::default();
    source.stream(|row| {
        let rendered: Vec<String> = row.iter().map(TypedValue::as_display).collect();
        writer.write_record(&rendered)?;
        report.rows_written += 1;
        Ok(())
    })?;
    writer.flush()?;
    Ok(report)
}

/// Converts a DBF table into a single-sheet spreadsheet. The spreadsheet
/// contract is write-only and whole-table, so records are materialized
/// before the workbook is produced.
pub fn dbf_to_xlsx(
    input: &Path,
    output: &Path,
    names: Option<&[String]>,
) -> ConvertResult<ConversionReport> {
    info!(
        "Converting '{}' -> '{}'",
        input.display(),
        output.display()
    );
    let mut source = DbfSource::open(input)?;
    let schema = source.schema().clone().with_overrides(names, None)?;
    let mut records = Vec::new();
    source.stream(|row| {
        records.push(row);
        Ok(())
    })?;
    xlsx::write_table(output, &schema, &records)?;
    Ok(ConversionReport {
        rows_written: records.len(),
        rows_skipped: 0,
        cells_nulled: 0,
    })
}

/// Reads a DBF table's schema and record count, for display.
pub fn describe_table(input: &Path) -> ConvertResult<(Schema, usize)> {
    let mut source = DbfSource::open(input)?;
    let schema = source.schema().clone();
    let mut count = 0usize;
    source.stream(|_| {
        count += 1;
        Ok(())
    })?;
    Ok((schema, count))
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use super::*;
    use crate::schema::{Field, FieldType};
    use chrono::NaiveDate;
    use encoding_rs::UTF_8;

    fn typed_schema() -> Schema {
        Schema::new(vec![
            Field {
                name: "ID".to_string(),
                ftype: FieldType::Integer,
            },
            Field {
                name: "NAME".to_string(),
                ftype: FieldType::Character,
            },
            Field {
                name: "PRICE".to_string(),
                ftype: FieldType::Float,
            },
            Field {
                name: "ACTIVE".to_string(),
                ftype: FieldType::Logical,
            },
            Field {
                name: "ORDERED".to_string(),
                ftype: FieldType::Date,
            },
        ])
    }

    #[test]
    fn coerced_record_is_positionally_aligned() {
        let schema = typed_schema();
        let row: Vec<String> = ["1", "Widget", "9.99", "yes", "2023-01-15"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (record, nulled) = coerce_row(&row, &schema);
        assert_eq!(record.len(), schema.len());
        assert_eq!(nulled, 0);
        assert_eq!(record[0], TypedValue::Integer(1));
        assert_eq!(record[1], TypedValue::Character("Widget".to_string()));
        assert_eq!(record[2], TypedValue::Float(9.99));
        assert_eq!(record[3], TypedValue::Logical(true));
        assert_eq!(
            record[4],
            TypedValue::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
        );
    }

    #[test]
    fn coercion_failures_are_counted_not_fatal() {
        let schema = typed_schema();
        let row: Vec<String> = ["x", "Widget", "cheap", "no", "not-a-date"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (record, nulled) = coerce_row(&row, &schema);
        assert_eq!(record.len(), schema.len());
        assert_eq!(nulled, 3);
        assert_eq!(record[3], TypedValue::Logical(false));
    }

    #[test]
    fn row_shape_mismatch_is_detected() {
        let schema = typed_schema();
        let short: Vec<String> = vec!["1".to_string(), "Widget".to_string()];
        assert!(!row_shape_ok(&short, &schema));
    }

    #[test]
    fn short_rows_are_skipped_and_counted() {
        let dir = tempfile::tempdir().expect("temp dir");
        let csv_path = dir.path().join("orders.csv");
        let dbf_path = dir.path().join("orders.dbf");
        let mut file = fs::File::create(&csv_path).expect("create csv");
        writeln!(file, "ID,NAME,PRICE").unwrap();
        writeln!(file, "1,Widget,9.99").unwrap();
        writeln!(file, "2,Gadget").unwrap();
        writeln!(file, "3,Sprocket,1.25").unwrap();
        drop(file);

        let types: Vec<String> = ["I", "C", "N"].iter().map(|s| s.to_string()).collect();
        let report = csv_to_dbf(&csv_path, &dbf_path, None, Some(&types), b',', UTF_8)
            .expect("conversion succeeds");
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.cells_nulled, 0);
    }

    #[test]
    fn destination_rows_preserve_source_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let csv_path = dir.path().join("in.csv");
        let dbf_path = dir.path().join("mid.dbf");
        let out_path = dir.path().join("out.csv");
        let mut file = fs::File::create(&csv_path).expect("create csv");
        writeln!(file, "NAME").unwrap();
        for name in ["alpha", "beta", "gamma"] {
            writeln!(file, "{name}").unwrap();
        }
        drop(file);

        csv_to_dbf(&csv_path, &dbf_path, None, None, b',', UTF_8).expect("to dbf");
        let report =
            dbf_to_csv(&dbf_path, Some(&out_path), None, b',').expect("back to csv");
        assert_eq!(report.rows_written, 3);

        let output = fs::read_to_string(&out_path).expect("read output");
        let values: Vec<&str> = output.lines().skip(1).map(|l| l.trim_matches('"')).collect();
        assert_eq!(values, vec!["alpha", "beta", "gamma"]);
    }
}
