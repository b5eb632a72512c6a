//! Formatted document output.
//!
//! This module writes styled spreadsheet tables and Word documents; the cell
//! models, file formats and styling engines are owned by the wrapped writers.

pub mod excel;
pub mod word;
