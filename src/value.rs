use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Date rendering used throughout the crate for date-typed cells.
pub const YMD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Represents a single generic cell value read from a spreadsheet.
///
/// A sheet is read as `Vec<Vec<CellValue>>` - a list of rows, each row a list
/// of cell values. The variants mirror what the conversion table in
/// [`crate::reader::excel`] can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A text cell, or a numeric/date cell rendered to text.
    Text(String),
    /// A numeric cell kept as a number.
    Number(f64),
    /// A boolean cell.
    Bool(bool),
    /// A blank or unreadable cell.
    Empty,
}

impl CellValue {
    /// Checks if the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Numeric rendering policy applied while reading.
///
/// The default policy renders integer-valued numerics as plain integer text
/// and keeps every other numeric as a number. A fixed policy renders every
/// numeric as text with the given number of decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberFormat {
    decimals: Option<usize>,
}

impl NumberFormat {
    /// The default policy: integer-valued numerics become integer text.
    pub fn general() -> Self {
        NumberFormat { decimals: None }
    }

    /// Render every numeric as text with `decimals` decimal places.
    pub fn fixed(decimals: usize) -> Self {
        NumberFormat {
            decimals: Some(decimals),
        }
    }

    /// Checks if this policy formats every numeric, not just integer-valued
    /// ones.
    pub fn is_fixed(&self) -> bool {
        self.decimals.is_some()
    }

    /// Renders a numeric value under this policy.
    pub fn format(&self, value: f64) -> String {
        match self.decimals {
            Some(d) => format!("{value:.d$}"),
            None => format!("{}", value.round() as i64),
        }
    }
}

/// Represents the typed value a table row exposes for one named field.
///
/// The variants are the fixed set of field types the table writer dispatches
/// on; see [`crate::writer::excel::add_cols`] for the formatting rules.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// A row object that can be laid out as a table row by named-field lookup.
///
/// The table writer asks each row for its fields by name at runtime.
/// Returning `None` for an unknown name is not an error; the cell is left
/// empty and the lookup failure is logged.
pub trait TableRow {
    /// Returns the value of the named field, if the row has one.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Text("abc".to_string()).to_string(), "abc");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_number_format_general() {
        let nf = NumberFormat::general();
        assert!(!nf.is_fixed());
        assert_eq!(nf.format(123.0), "123");
        assert_eq!(nf.format(123.6), "124");
    }

    #[test]
    fn test_number_format_fixed() {
        let nf = NumberFormat::fixed(2);
        assert!(nf.is_fixed());
        assert_eq!(nf.format(123.456), "123.46");
        assert_eq!(nf.format(7.0), "7.00");
    }

    #[test]
    fn test_number_format_default_is_general() {
        assert_eq!(NumberFormat::default(), NumberFormat::general());
    }

    #[test]
    fn test_field_value_from_str() {
        assert_eq!(
            FieldValue::from("remark"),
            FieldValue::Text("remark".to_string())
        );
    }
}
