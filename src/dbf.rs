//! DBF source/sink adapter over the `dbase` crate.
//!
//! The table format is a collaborator, not core logic: this module only
//! translates between [`TypedValue`] rows and `dbase` field values, and maps
//! the schema's type tags onto concrete field declarations when a new table
//! is created. Binary-format constraints (field widths, name length, memo
//! storage) are owned by `dbase`.

use std::{fs::File, io::BufReader, path::Path};

use chrono::{Datelike, NaiveDate, Timelike};
use dbase::{FieldValue, Record, TableWriter, TableWriterBuilder};

use crate::{
    data::TypedValue,
    error::{ConvertError, ConvertResult},
    schema::{Field, FieldType, Schema},
};

const CHARACTER_FIELD_WIDTH: u8 = 254;
const NUMERIC_FIELD_WIDTH: u8 = 20;
const NUMERIC_FIELD_DECIMALS: u8 = 5;

/// Forward iteration over an existing DBF table, schema first.
pub struct DbfSource {
    reader: dbase::Reader<BufReader<File>>,
    schema: Schema,
}

impl DbfSource {
    pub fn open(path: &Path) -> ConvertResult<Self> {
        if !path.exists() {
            return Err(ConvertError::EndpointNotFound(path.to_path_buf()));
        }
        let reader = dbase::Reader::from_path(path)?;
        let fields = reader
            .fields()
            .iter()
            .map(|info| Field {
                name: info.name().to_string(),
                ftype: schema_type(info.field_type()),
            })
            .collect();
        Ok(DbfSource {
            reader,
            schema: Schema::new(fields),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Streams stored records in order, invoking `emit` once per typed row.
    /// A read failure is fatal and surfaces as [`ConvertError::Table`].
    pub fn stream<F>(&mut self, mut emit: F) -> ConvertResult<()>
    where
        F: FnMut(Vec<TypedValue>) -> ConvertResult<()>,
    {
        let schema = self.schema.clone();
        for record in self.reader.iter_records() {
            let record = record?;
            let row = schema
                .fields
                .iter()
                .map(|field| {
                    record
                        .get(&field.name)
                        .map(typed_value)
                        .unwrap_or(TypedValue::Null)
                })
                .collect();
            emit(row)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for DbfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbfSource")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Append-only writer for a freshly created DBF table.
pub struct DbfSink {
    writer: TableWriter<std::io::BufWriter<File>>,
    schema: Schema,
}

impl std::fmt::Debug for DbfSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbfSink")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl DbfSink {
    /// Declares the table structure from the schema and creates the file.
    /// The structure must exist before the first append.
    pub fn create(path: &Path, schema: &Schema) -> ConvertResult<Self> {
        let mut builder = TableWriterBuilder::new();
        for field in &schema.fields {
            let name = dbase::FieldName::try_from(field.name.as_str()).map_err(|_| {
                ConvertError::SchemaMismatch(format!(
                    "field name '{}' is not usable as a table field name",
                    field.name
                ))
            })?;
            builder = match field.ftype {
                FieldType::Character | FieldType::Memo | FieldType::Binary => {
                    builder.add_character_field(name, CHARACTER_FIELD_WIDTH)
                }
                FieldType::Numeric | FieldType::Float => {
                    builder.add_numeric_field(name, NUMERIC_FIELD_WIDTH, NUMERIC_FIELD_DECIMALS)
                }
                // Numeric with no decimals rather than the binary 4-byte
                // integer field, which has no null encoding.
                FieldType::Integer => builder.add_numeric_field(name, NUMERIC_FIELD_WIDTH, 0),
                FieldType::Logical => builder.add_logical_field(name),
                FieldType::Date => builder.add_date_field(name),
                FieldType::DateTime => builder.add_datetime_field(name),
            };
        }
        let writer = builder.build_with_file_dest(path)?;
        Ok(DbfSink {
            writer,
            schema: schema.clone(),
        })
    }

    pub fn append(&mut self, row: &[TypedValue]) -> ConvertResult<()> {
        let mut record = Record::default();
        for (field, value) in self.schema.fields.iter().zip(row) {
            record.insert(field.name.clone(), stored_value(field.ftype, value));
        }
        self.writer.write_record(&record)?;
        Ok(())
    }
}

fn schema_type(ftype: dbase::FieldType) -> FieldType {
    match ftype {
        dbase::FieldType::Character => FieldType::Character,
        dbase::FieldType::Numeric => FieldType::Numeric,
        dbase::FieldType::Float => FieldType::Float,
        dbase::FieldType::Logical => FieldType::Logical,
        dbase::FieldType::Date => FieldType::Date,
        dbase::FieldType::DateTime => FieldType::DateTime,
        dbase::FieldType::Integer => FieldType::Integer,
        dbase::FieldType::Memo => FieldType::Memo,
        dbase::FieldType::Currency | dbase::FieldType::Double => FieldType::Numeric,
        _ => FieldType::Character,
    }
}

fn typed_value(value: &FieldValue) -> TypedValue {
    match value {
        FieldValue::Character(Some(s)) => TypedValue::Character(s.clone()),
        FieldValue::Character(None) => TypedValue::Null,
        FieldValue::Memo(s) => TypedValue::Character(s.clone()),
        FieldValue::Numeric(Some(n)) => TypedValue::Float(*n),
        FieldValue::Numeric(None) => TypedValue::Null,
        FieldValue::Float(Some(f)) => TypedValue::Float(f64::from(*f)),
        FieldValue::Float(None) => TypedValue::Null,
        FieldValue::Currency(n) => TypedValue::Float(*n),
        FieldValue::Double(n) => TypedValue::Float(*n),
        FieldValue::Integer(i) => TypedValue::Integer(i64::from(*i)),
        FieldValue::Logical(Some(b)) => TypedValue::Logical(*b),
        FieldValue::Logical(None) => TypedValue::Null,
        FieldValue::Date(Some(date)) => {
            NaiveDate::from_ymd_opt(date.year() as i32, date.month(), date.day())
                .map(TypedValue::Date)
                .unwrap_or(TypedValue::Null)
        }
        FieldValue::Date(None) => TypedValue::Null,
        FieldValue::DateTime(dt) => {
            let date = dt.date();
            let time = dt.time();
            NaiveDate::from_ymd_opt(date.year() as i32, date.month(), date.day())
                .and_then(|d| d.and_hms_opt(time.hours(), time.minutes(), time.seconds()))
                .map(TypedValue::DateTime)
                .unwrap_or(TypedValue::Null)
        }
        _ => TypedValue::Null,
    }
}

fn stored_value(ftype: FieldType, value: &TypedValue) -> FieldValue {
    match ftype {
        FieldType::Character | FieldType::Memo | FieldType::Binary => match value {
            TypedValue::Null => FieldValue::Character(None),
            other => FieldValue::Character(Some(other.as_display())),
        },
        FieldType::Numeric | FieldType::Float | FieldType::Integer => match value {
            TypedValue::Integer(i) => FieldValue::Numeric(Some(*i as f64)),
            TypedValue::Float(f) => FieldValue::Numeric(Some(*f)),
            _ => FieldValue::Numeric(None),
        },
        FieldType::Logical => match value {
            TypedValue::Logical(b) => FieldValue::Logical(Some(*b)),
            _ => FieldValue::Logical(None),
        },
        FieldType::Date => match value {
            TypedValue::Date(d) => FieldValue::Date(Some(table_date(d))),
            _ => FieldValue::Date(None),
        },
        // The binary timestamp field has no null encoding; absent values
        // store 1900-01-01 00:00:00.
        FieldType::DateTime => match value {
            TypedValue::DateTime(dt) => FieldValue::DateTime(table_datetime(dt)),
            _ => FieldValue::DateTime(dbase::DateTime::new(
                dbase::Date::new(1, 1, 1900),
                dbase::Time::new(0, 0, 0),
            )),
        },
    }
}

fn table_date(d: &NaiveDate) -> dbase::Date {
    dbase::Date::new(d.day(), d.month(), d.year() as u32)
}

fn table_datetime(dt: &chrono::NaiveDateTime) -> dbase::DateTime {
    dbase::DateTime::new(
        table_date(&dt.date()),
        dbase::Time::new(dt.hour(), dt.minute(), dt.second()),
    )
}
