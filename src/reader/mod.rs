//! Spreadsheet input.
//!
//! This module reads spreadsheet files into generic row lists
//! (`Vec<Vec<CellValue>>`), leaving the file formats to the wrapped reader.

pub mod excel;
