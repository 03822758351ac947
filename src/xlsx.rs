//! Spreadsheet sink over `rust_xlsxwriter`.
//!
//! Write-only, whole-table contract: one worksheet, a header row, then one
//! data row per record. Values keep their native cell types; `Null` leaves
//! the cell blank.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::{data::TypedValue, error::ConvertResult, schema::Schema};

pub fn write_table(
    path: &Path,
    schema: &Schema,
    records: &[Vec<TypedValue>],
) -> ConvertResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, field) in schema.fields.iter().enumerate() {
        worksheet.write_string(0, col as u16, &field.name)?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col_idx, value) in record.iter().enumerate() {
            let col = col_idx as u16;
            match value {
                TypedValue::Character(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                TypedValue::Integer(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                TypedValue::Float(f) => {
                    worksheet.write_number(row, col, *f)?;
                }
                TypedValue::Logical(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                TypedValue::Date(d) => {
                    worksheet.write_datetime_with_format(row, col, d, &date_format)?;
                }
                TypedValue::DateTime(dt) => {
                    worksheet.write_datetime_with_format(row, col, dt, &datetime_format)?;
                }
                TypedValue::Null => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
