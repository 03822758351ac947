//! Typed cell values and the text-to-value coercion engine.
//!
//! [`coerce()`] is total: a cell that cannot be parsed into its declared
//! type becomes [`TypedValue::Null`] instead of an error, so one bad cell
//! never aborts a conversion. Date and datetime parsing walk a fixed,
//! ordered list of patterns and short-circuit on the first match.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::schema::FieldType;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"];

const TRUTHY_TOKENS: &[&str] = &["true", "t", "yes", "y", "1"];

/// One typed cell. `Null` means the source cell was absent or failed to
/// coerce; it is a first-class value, distinct from an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Character(String),
    Integer(i64),
    Float(f64),
    Logical(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Renders the value for text output. `Null` becomes the empty field.
    pub fn as_display(&self) -> String {
        match self {
            TypedValue::Character(s) => s.clone(),
            TypedValue::Integer(i) => i.to_string(),
            TypedValue::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            TypedValue::Logical(b) => b.to_string(),
            TypedValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            TypedValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            TypedValue::Null => String::new(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Converts one raw text cell into a [`TypedValue`] for the given type.
///
/// Never fails. Character-like types pass the raw string through unchanged
/// (an empty string stays an empty string); numeric, date, and datetime
/// types degrade to `Null` on unparsable input; logical coercion maps
/// anything outside the truthy set to `false`.
pub fn coerce(raw: &str, ftype: FieldType) -> TypedValue {
    match ftype {
        FieldType::Character | FieldType::Memo | FieldType::Binary => {
            TypedValue::Character(raw.to_string())
        }
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(TypedValue::Integer)
            .unwrap_or(TypedValue::Null),
        // A decimal point in the raw text forces a float even when the
        // declared type is the width-agnostic `Numeric`.
        FieldType::Numeric | FieldType::Float => {
            let trimmed = raw.trim();
            if trimmed.contains('.') || ftype == FieldType::Float {
                trimmed
                    .parse::<f64>()
                    .map(TypedValue::Float)
                    .unwrap_or(TypedValue::Null)
            } else {
                trimmed
                    .parse::<i64>()
                    .map(TypedValue::Integer)
                    .unwrap_or(TypedValue::Null)
            }
        }
        FieldType::Logical => {
            let lowered = raw.to_ascii_lowercase();
            TypedValue::Logical(TRUTHY_TOKENS.contains(&lowered.as_str()))
        }
        FieldType::Date => parse_naive_date(raw)
            .map(TypedValue::Date)
            .unwrap_or(TypedValue::Null),
        FieldType::DateTime => parse_naive_datetime(raw)
            .map(TypedValue::DateTime)
            .unwrap_or(TypedValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_with_decimal_point_parses_as_float() {
        assert_eq!(coerce("9.99", FieldType::Numeric), TypedValue::Float(9.99));
    }

    #[test]
    fn numeric_without_decimal_point_parses_as_integer() {
        assert_eq!(coerce("42", FieldType::Numeric), TypedValue::Integer(42));
    }

    #[test]
    fn float_type_forces_float_even_without_decimal_point() {
        assert_eq!(coerce("42", FieldType::Float), TypedValue::Float(42.0));
    }

    #[test]
    fn integer_parses_base_ten_only() {
        assert_eq!(coerce("17", FieldType::Integer), TypedValue::Integer(17));
        assert_eq!(coerce("9.99", FieldType::Integer), TypedValue::Null);
        assert_eq!(coerce("abc", FieldType::Integer), TypedValue::Null);
    }

    #[test]
    fn empty_numeric_cell_degrades_to_null() {
        assert_eq!(coerce("", FieldType::Numeric), TypedValue::Null);
        assert_eq!(coerce("", FieldType::Integer), TypedValue::Null);
    }

    #[test]
    fn logical_truthy_set_is_case_insensitive() {
        for raw in ["true", "T", "Yes", "Y", "1"] {
            assert_eq!(coerce(raw, FieldType::Logical), TypedValue::Logical(true));
        }
        for raw in ["0", "no", "", "maybe", "false"] {
            assert_eq!(coerce(raw, FieldType::Logical), TypedValue::Logical(false));
        }
    }

    #[test]
    fn date_patterns_are_tried_in_order() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(coerce("2023-01-15", FieldType::Date), TypedValue::Date(expected));
        assert_eq!(coerce("01/15/2023", FieldType::Date), TypedValue::Date(expected));
        assert_eq!(coerce("15-Jan-2023", FieldType::Date), TypedValue::Date(expected));
    }

    #[test]
    fn unparsable_date_degrades_to_null() {
        assert_eq!(coerce("not-a-date", FieldType::Date), TypedValue::Null);
        assert_eq!(coerce("2023-13-45", FieldType::Date), TypedValue::Null);
    }

    #[test]
    fn datetime_patterns_match_in_order() {
        let expected =
            NaiveDateTime::parse_from_str("2023-01-15 08:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            coerce("2023-01-15 08:30:00", FieldType::DateTime),
            TypedValue::DateTime(expected)
        );
        assert_eq!(
            coerce("01/15/2023 08:30:00", FieldType::DateTime),
            TypedValue::DateTime(expected)
        );
        assert_eq!(coerce("yesterday", FieldType::DateTime), TypedValue::Null);
    }

    #[test]
    fn character_passes_through_including_empty() {
        assert_eq!(
            coerce("  spaced  ", FieldType::Character),
            TypedValue::Character("  spaced  ".to_string())
        );
        assert_eq!(
            coerce("", FieldType::Memo),
            TypedValue::Character(String::new())
        );
        assert!(!coerce("", FieldType::Binary).is_null());
    }

    #[test]
    fn null_renders_as_empty_field() {
        assert_eq!(TypedValue::Null.as_display(), "");
        assert_eq!(TypedValue::Float(42.0).as_display(), "42");
        assert_eq!(TypedValue::Float(9.99).as_display(), "9.99");
        let date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(TypedValue::Date(date).as_display(), "2023-01-15");
    }
}
