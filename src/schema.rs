//! Field typing and schema resolution.
//!
//! A [`Schema`] is the ordered list of `(name, type)` pairs that governs
//! coercion and output shape for one conversion. It is resolved once per
//! invocation — from the source header, from caller-supplied overrides, or
//! from a DBF field table — and stays immutable afterwards.

use std::fmt;

use crate::error::{ConvertError, ConvertResult};

/// Closed set of supported field types, mirroring the dBase type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Float,
    Logical,
    Date,
    DateTime,
    Memo,
    Binary,
    Integer,
}

impl FieldType {
    /// Parses a type token permissively: single-letter dBase codes and full
    /// words are matched case-insensitively, and anything unrecognized falls
    /// back to `Character` so the cell passes through untyped.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "c" | "character" | "char" | "string" => FieldType::Character,
            "n" | "numeric" => FieldType::Numeric,
            "f" | "float" | "double" => FieldType::Float,
            "l" | "logical" | "boolean" | "bool" => FieldType::Logical,
            "d" | "date" => FieldType::Date,
            "t" | "datetime" | "timestamp" => FieldType::DateTime,
            "m" | "memo" => FieldType::Memo,
            "b" | "binary" | "blob" => FieldType::Binary,
            "i" | "integer" | "int" => FieldType::Integer,
            _ => FieldType::Character,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Character => "character",
            FieldType::Numeric => "numeric",
            FieldType::Float => "float",
            FieldType::Logical => "logical",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Memo => "memo",
            FieldType::Binary => "binary",
            FieldType::Integer => "integer",
        }
    }

    /// Single-letter dBase code for display alongside the full name.
    pub fn tag(&self) -> char {
        match self {
            FieldType::Character => 'C',
            FieldType::Numeric => 'N',
            FieldType::Float => 'F',
            FieldType::Logical => 'L',
            FieldType::Date => 'D',
            FieldType::DateTime => 'T',
            FieldType::Memo => 'M',
            FieldType::Binary => 'B',
            FieldType::Integer => 'I',
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ftype: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Builds an all-`Character` schema from a list of column names.
    pub fn from_names(names: &[String]) -> Self {
        let fields = names
            .iter()
            .map(|name| Field {
                name: name.clone(),
                ftype: FieldType::Character,
            })
            .collect();
        Schema { fields }
    }

    /// Resolves the schema for a text source.
    ///
    /// Field names come from `names` when supplied (validated against the
    /// header length), otherwise from the header verbatim. Types come from
    /// `types` when supplied (validated against the name count), otherwise
    /// every field defaults to `Character`. Pure function of its inputs.
    pub fn resolve(
        header: Option<&[String]>,
        names: Option<&[String]>,
        types: Option<&[String]>,
    ) -> ConvertResult<Schema> {
        let resolved_names: Vec<String> = match (names, header) {
            (Some(supplied), Some(header)) => {
                if supplied.len() != header.len() {
                    return Err(ConvertError::SchemaMismatch(format!(
                        "{} field name(s) supplied but the source has {} column(s)",
                        supplied.len(),
                        header.len()
                    )));
                }
                supplied.to_vec()
            }
            (Some(supplied), None) => supplied.to_vec(),
            (None, Some(header)) => header.to_vec(),
            (None, None) => {
                return Err(ConvertError::SchemaMismatch(
                    "no field names supplied and the source has no header row".to_string(),
                ));
            }
        };
        if resolved_names.is_empty() {
            return Err(ConvertError::SchemaMismatch(
                "schema requires at least one field".to_string(),
            ));
        }

        let resolved_types = resolve_types(types, resolved_names.len())?;
        let fields = resolved_names
            .into_iter()
            .zip(resolved_types)
            .map(|(name, ftype)| Field { name, ftype })
            .collect();
        Ok(Schema { fields })
    }

    /// Applies supplied name/type overrides to a schema obtained from a typed
    /// source (a DBF field table), with the same length validation as
    /// [`Schema::resolve`].
    pub fn with_overrides(
        mut self,
        names: Option<&[String]>,
        types: Option<&[String]>,
    ) -> ConvertResult<Schema> {
        if let Some(supplied) = names {
            if supplied.len() != self.fields.len() {
                return Err(ConvertError::SchemaMismatch(format!(
                    "{} field name(s) supplied but the table has {} field(s)",
                    supplied.len(),
                    self.fields.len()
                )));
            }
            for (field, name) in self.fields.iter_mut().zip(supplied) {
                field.name = name.clone();
            }
        }
        if let Some(supplied) = types {
            if supplied.len() != self.fields.len() {
                return Err(ConvertError::SchemaMismatch(format!(
                    "{} field type(s) supplied but the table has {} field(s)",
                    supplied.len(),
                    self.fields.len()
                )));
            }
            for (field, token) in self.fields.iter_mut().zip(supplied) {
                field.ftype = FieldType::from_token(token);
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in schema order, for header rows.
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

fn resolve_types(types: Option<&[String]>, field_count: usize) -> ConvertResult<Vec<FieldType>> {
    match types {
        None => Ok(vec![FieldType::Character; field_count]),
        Some(supplied) => {
            if supplied.len() != field_count {
                return Err(ConvertError::SchemaMismatch(format!(
                    "{} field type(s) supplied for {} field(s)",
                    supplied.len(),
                    field_count
                )));
            }
            Ok(supplied
                .iter()
                .map(|token| FieldType::from_token(token))
                .collect())
        }
    }
}
