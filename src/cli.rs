use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::reader::excel::read_sheet_with_format;
use crate::value::{CellValue, NumberFormat};
use crate::writer::excel::{fill_rows_data, fill_table_header};

/// How to pull rows out of the input workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadArgs {
    pub sheet: usize,
    pub start_row: usize,
    pub decimals: Option<usize>,
}

/// How to lay the rows out when re-exporting as a styled table.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    /// Optional merged title row.
    pub title: Option<String>,
    /// Treat the first row as column names.
    pub header: bool,
    /// Declared column widths; defaults to 10 per column.
    pub col_widths: Option<Vec<f64>>,
}

fn load_rows(input: &Path, args: &ReadArgs) -> Result<Vec<Vec<CellValue>>> {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("cannot open {}", input.display()))?,
    );
    let format = match args.decimals {
        Some(d) => NumberFormat::fixed(d),
        None => NumberFormat::general(),
    };
    let rows = read_sheet_with_format(reader, &file_name, args.sheet, args.start_row, format)
        .with_context(|| format!("cannot read {}", input.display()))?;
    Ok(rows)
}

/// Dumps one sheet as tab-separated text.
pub fn run_dump(input: &Path, output: &mut dyn Write, args: &ReadArgs) -> Result<()> {
    let rows = load_rows(input, args)?;
    for row in rows {
        let line = row
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(output, "{line}")?;
    }
    Ok(())
}

/// Re-exports one sheet as a styled table workbook.
pub fn run_export(
    input: &Path,
    output: &mut dyn Write,
    args: &ReadArgs,
    export: &ExportArgs,
) -> Result<()> {
    let mut rows = load_rows(input, args)?;

    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    anyhow::ensure!(col_count > 0, "input sheet has no data");

    let col_names: Vec<String> = if export.header {
        let first = rows.remove(0);
        (0..col_count)
            .map(|i| first.get(i).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    } else {
        (1..=col_count).map(|i| format!("Column {i}")).collect()
    };
    let col_widths = export
        .col_widths
        .clone()
        .unwrap_or_else(|| vec![10.0; col_count]);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let name_refs: Vec<&str> = col_names.iter().map(String::as_str).collect();
    let next_row = fill_table_header(worksheet, export.title.as_deref(), &name_refs, &col_widths)?;
    fill_rows_data(worksheet, &rows, &col_widths, next_row)?;

    let buffer = workbook.save_to_buffer()?;
    output.write_all(&buffer)?;
    Ok(())
}
