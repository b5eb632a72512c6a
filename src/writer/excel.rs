use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Worksheet};
use unicode_width::UnicodeWidthStr;

use crate::error::OfficeError;
use crate::value::{CellValue, FieldValue, TableRow, YMD_DATE_FORMAT};

/// Body and remark text font.
pub const DEFAULT_BODY_FONT: &str = "楷体";

/// Height in points of a merged title row.
pub const TITLE_ROW_HEIGHT: f64 = 30.0;
/// Height in points of a column-name row.
pub const HEADER_ROW_HEIGHT: f64 = 19.0;
/// Height in points of a body row.
pub const BODY_ROW_HEIGHT: f64 = 18.0;

/// Character units per declared column-width unit.
const COLUMN_WIDTH_FACTOR: f64 = 2.0;
/// Height in points of one wrapped text line.
const BASE_LINE_HEIGHT: f64 = 15.0;
/// Characters per wrapped line assumed for remark cells.
const REMARK_CHARS_PER_LINE: f64 = 80.0;

/// The reusable cell style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleCategory {
    /// 20 pt bold, for merged title rows.
    Header,
    /// 10 pt, for plain body cells.
    Main,
    /// 10 pt bold on a 25% grey fill, for column-name rows.
    ColumnHeader,
    /// 12 pt without borders.
    NoBorder,
}

impl StyleCategory {
    pub fn desc(&self) -> &'static str {
        match self {
            StyleCategory::Header => "table title",
            StyleCategory::Main => "body text",
            StyleCategory::ColumnHeader => "column names",
            StyleCategory::NoBorder => "borderless, 12pt",
        }
    }

    /// Builds the format for this preset.
    pub fn format(&self) -> Format {
        match self {
            StyleCategory::Header => Format::new().set_font_size(20).set_bold(),
            StyleCategory::Main => Format::new().set_font_size(10),
            StyleCategory::ColumnHeader => Format::new()
                .set_font_size(10)
                .set_bold()
                .set_background_color(Color::RGB(0xC0C0C0)),
            StyleCategory::NoBorder => Format::new().set_font_size(12),
        }
    }
}

/// Puts a thin border on all four edges of a format.
pub fn with_thin_border(format: Format) -> Format {
    format
        .set_border_bottom(FormatBorder::Thin)
        .set_border_top(FormatBorder::Thin)
        .set_border_left(FormatBorder::Thin)
        .set_border_right(FormatBorder::Thin)
}

/// Writes the table header: an optional merged title row followed by a styled
/// column-name row, using the default title and column-name presets.
///
/// Returns the next free row index.
pub fn fill_table_header(
    worksheet: &mut Worksheet,
    title: Option<&str>,
    col_names: &[&str],
    col_widths: &[f64],
) -> Result<u32, OfficeError> {
    let title_format = StyleCategory::Header
        .format()
        .set_align(FormatAlign::Center);
    let col_format = with_thin_border(
        StyleCategory::ColumnHeader
            .format()
            .set_align(FormatAlign::Center),
    );
    fill_table_header_from(worksheet, title, col_names, col_widths, 0, &title_format, &col_format)
}

/// Writes the table header starting at `start_row` with explicit formats.
///
/// The title row is merged across all columns and 30 pt high; an empty or
/// absent title writes no title row. The column-name row is 19 pt high and
/// applies the declared column widths. Returns the next free row index.
pub fn fill_table_header_from(
    worksheet: &mut Worksheet,
    title: Option<&str>,
    col_names: &[&str],
    col_widths: &[f64],
    start_row: u32,
    title_format: &Format,
    col_format: &Format,
) -> Result<u32, OfficeError> {
    let col_count = col_widths.len();
    let mut row = start_row;

    if let Some(title) = title.filter(|t| !t.is_empty()) {
        // A merged region needs at least two cells.
        if col_count > 1 {
            worksheet.merge_range(row, 0, row, (col_count - 1) as u16, title, title_format)?;
        } else {
            worksheet.write_string_with_format(row, 0, title, title_format)?;
        }
        worksheet.set_row_height(row, TITLE_ROW_HEIGHT)?;
        row += 1;
    }

    worksheet.set_row_height(row, HEADER_ROW_HEIGHT)?;
    for (i, width) in col_widths.iter().enumerate() {
        worksheet.set_column_width(i as u16, width * COLUMN_WIDTH_FACTOR)?;
        let name = col_names.get(i).copied().unwrap_or("");
        worksheet.write_string_with_format(row, i as u16, name, col_format)?;
    }
    row += 1;
    Ok(row)
}

/// Writes one centered, bordered body row at `row`.
///
/// Values are stringified through their [`CellValue`] rendering; a missing
/// value writes an empty cell. Column widths are re-applied so the row can
/// also be written without a preceding header.
pub fn fill_row_data(
    worksheet: &mut Worksheet,
    values: &[CellValue],
    col_widths: &[f64],
    row: u32,
) -> Result<(), OfficeError> {
    let format = with_thin_border(
        Format::new()
            .set_align(FormatAlign::Center)
            .set_font_name(DEFAULT_BODY_FONT)
            .set_font_size(12),
    );
    worksheet.set_row_height(row, HEADER_ROW_HEIGHT)?;
    for (i, width) in col_widths.iter().enumerate() {
        worksheet.set_column_width(i as u16, width * COLUMN_WIDTH_FACTOR)?;
        let text = values.get(i).map(|v| v.to_string()).unwrap_or_default();
        worksheet.write_string_with_format(row, i as u16, &text, &format)?;
    }
    Ok(())
}

/// Writes a list of body rows starting at `start_row`.
pub fn fill_rows_data(
    worksheet: &mut Worksheet,
    rows: &[Vec<CellValue>],
    col_widths: &[f64],
    start_row: u32,
) -> Result<(), OfficeError> {
    for (index, values) in rows.iter().enumerate() {
        fill_row_data(worksheet, values, col_widths, start_row + index as u32)?;
    }
    Ok(())
}

/// Carries the write position and sequence number across [`add_cols`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCursor {
    /// Next row index to write.
    pub row: u32,
    /// Next sequence number for column 0.
    pub seq: i64,
}

impl WriteCursor {
    pub fn new(row: u32, seq: i64) -> Self {
        WriteCursor { row, seq }
    }
}

/// Describes how [`add_cols`] lays a row list out as a table.
#[derive(Debug, Clone)]
pub struct TableLayout<'a> {
    /// Field name per column; index 0 is the sequence column and its name is
    /// never looked up. Names past `col_count` are only consulted for the
    /// remark field.
    pub fields: &'a [&'a str],
    /// Number of visible columns.
    pub col_count: usize,
    /// Optional group-title row written before the data rows.
    pub group_title: Option<&'a str>,
    /// Field whose non-empty value is written as a merged remark row under
    /// its data row instead of into a column.
    pub remark_field: Option<&'a str>,
}

/// Lays out a list of row objects as table rows via named-field lookup.
///
/// Each row object becomes one 18 pt body row: a sequence number in column 0,
/// then one cell per named field, dispatched on the field's type - text as
/// text, dates as `%Y-%m-%d` text, decimals as numbers, floats/doubles as
/// numbers with a "0.00" format. When a group title is set it is written
/// first as a merged, left-aligned row. When a remark field is named and a
/// row's remark is non-empty, an extra wrap-text row is inserted under that
/// data row, merged from column 1 to the last column, with its height
/// computed by [`auto_row_height`].
///
/// The cursor's row and sequence number are advanced in place, so successive
/// calls append to the same sheet.
pub fn add_cols<T: TableRow>(
    worksheet: &mut Worksheet,
    rows: &[T],
    layout: &TableLayout<'_>,
    cursor: &mut WriteCursor,
    main_format: &Format,
) -> Result<(), OfficeError> {
    let col_count = layout.col_count;
    let last_col = col_count.saturating_sub(1) as u16;
    let main = with_thin_border(
        main_format
            .clone()
            .set_align(FormatAlign::Center)
            .set_text_wrap(),
    );
    let decimal = main.clone().set_num_format("0.00");
    let remark_style = with_thin_border(
        Format::new()
            .set_font_name(DEFAULT_BODY_FONT)
            .set_font_size(12)
            .set_align(FormatAlign::Left),
    );
    let remark_body = remark_style
        .clone()
        .set_text_wrap()
        .set_align(FormatAlign::Top);

    if let Some(title) = layout.group_title.filter(|t| !t.is_empty()) {
        if col_count > 1 {
            worksheet.merge_range(cursor.row, 0, cursor.row, last_col, title, &remark_style)?;
        } else {
            worksheet.write_string_with_format(cursor.row, 0, title, &remark_style)?;
        }
        worksheet.set_row_height(cursor.row, BODY_ROW_HEIGHT)?;
        cursor.row += 1;
    }

    for row_obj in rows {
        let row_index = cursor.row;
        worksheet.set_row_height(row_index, BODY_ROW_HEIGHT)?;
        worksheet.write_number_with_format(row_index, 0, cursor.seq as f64, &main)?;
        cursor.seq += 1;
        cursor.row += 1;

        let mut remark_text: Option<String> = None;
        for (i, name) in layout.fields.iter().enumerate().skip(1) {
            let value = row_obj.field(name);
            if layout.remark_field == Some(*name) {
                remark_text = value.map(|v| field_text(&v)).filter(|t| !t.is_empty());
                continue;
            }
            if i >= col_count {
                continue;
            }
            let col = i as u16;
            match value {
                None => {
                    log::warn!("row field {name:?} not found, writing empty cell");
                    worksheet.write_string_with_format(row_index, col, "", &main)?;
                }
                Some(FieldValue::Text(s)) => {
                    worksheet.write_string_with_format(row_index, col, &s, &main)?;
                }
                Some(FieldValue::Date(d)) => {
                    let text = d.format(YMD_DATE_FORMAT).to_string();
                    worksheet.write_string_with_format(row_index, col, &text, &main)?;
                }
                Some(FieldValue::DateTime(d)) => {
                    let text = d.format(YMD_DATE_FORMAT).to_string();
                    worksheet.write_string_with_format(row_index, col, &text, &main)?;
                }
                Some(FieldValue::Decimal(d)) => {
                    let number = d.to_f64().unwrap_or(0.0);
                    worksheet.write_number_with_format(row_index, col, number, &main)?;
                }
                Some(FieldValue::Float(v)) => {
                    worksheet.write_number_with_format(row_index, col, f64::from(v), &decimal)?;
                }
                Some(FieldValue::Double(v)) => {
                    worksheet.write_number_with_format(row_index, col, v, &decimal)?;
                }
            }
        }

        if let Some(text) = remark_text {
            let remark_row = cursor.row;
            worksheet.write_string_with_format(remark_row, 0, "", &remark_body)?;
            if col_count > 2 {
                worksheet.merge_range(remark_row, 1, remark_row, last_col, &text, &remark_body)?;
            } else {
                worksheet.write_string_with_format(remark_row, 1, &text, &remark_body)?;
            }
            worksheet
                .set_row_height(remark_row, auto_row_height(&text, REMARK_CHARS_PER_LINE))?;
            cursor.row += 1;
        }
    }

    Ok(())
}

fn field_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Date(d) => d.format(YMD_DATE_FORMAT).to_string(),
        FieldValue::DateTime(d) => d.format(YMD_DATE_FORMAT).to_string(),
        FieldValue::Decimal(d) => d.to_string(),
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Double(v) => v.to_string(),
    }
}

/// Computes a row height in points for wrapped text.
///
/// The text's display width (CJK counts double) is charged against
/// `chars_per_line` characters per line, with every whitespace or newline
/// break charging one full line; each line adds 15 pt.
pub fn auto_row_height(text: &str, chars_per_line: f64) -> f64 {
    let mut count = UnicodeWidthStr::width(text) as f64;
    let breaks = text.split_whitespace().count().saturating_sub(1)
        + text.lines().count().saturating_sub(1);
    count += breaks as f64 * chars_per_line;
    (((count / (chars_per_line * 2.0)) as u32) + 1) as f64 * BASE_LINE_HEIGHT
}
