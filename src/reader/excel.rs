use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Sheets, Xls, Xlsx};

use crate::error::OfficeError;
use crate::value::{CellValue, NumberFormat, YMD_DATE_FORMAT};

const EXT_XLS: &str = ".xls";
const EXT_XLSX: &str = ".xlsx";

/// Opens a workbook from a reader, dispatching on the file-name extension.
///
/// `.xls` opens the BIFF reader, `.xlsx` the OOXML reader. Any other
/// extension (or a name without one) is rejected with
/// [`OfficeError::UnsupportedFormat`].
///
/// # Arguments
///
/// * `rs` - The reader positioned at the start of the file content.
/// * `file_name` - The file name whose extension selects the format.
pub fn open_workbook<RS: Read + Seek>(
    rs: RS,
    file_name: &str,
) -> Result<Sheets<RS>, OfficeError> {
    let ext = match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => return Err(OfficeError::UnsupportedFormat(file_name.to_string())),
    };
    if ext.eq_ignore_ascii_case(EXT_XLS) {
        Ok(Sheets::Xls(
            Xls::new(rs).map_err(calamine::Error::from)?,
        ))
    } else if ext.eq_ignore_ascii_case(EXT_XLSX) {
        Ok(Sheets::Xlsx(
            Xlsx::new(rs).map_err(calamine::Error::from)?,
        ))
    } else {
        Err(OfficeError::UnsupportedFormat(ext.to_string()))
    }
}

/// Opens a workbook file, dispatching on the path's extension.
pub fn open_workbook_path<P: AsRef<Path>>(
    path: P,
) -> Result<Sheets<BufReader<File>>, OfficeError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let reader = BufReader::new(File::open(path)?);
    open_workbook(reader, &file_name)
}

/// Reads every sheet of a workbook into one concatenated row list.
///
/// Rows whose cells are all blank are skipped. Numbers are rendered under
/// the default [`NumberFormat`].
pub fn read_all<RS: Read + Seek>(
    rs: RS,
    file_name: &str,
) -> Result<Vec<Vec<CellValue>>, OfficeError> {
    let mut workbook = open_workbook(rs, file_name)?;
    let format = NumberFormat::general();
    let mut list = Vec::new();
    for index in 0..workbook.sheet_names().len() {
        if let Some(range) = workbook.worksheet_range_at(index) {
            collect_rows(&range?, 0, &format, &mut list);
        }
    }
    Ok(list)
}

/// Reads one sheet by index, skipping `start_row` leading rows of the used
/// range.
///
/// A sheet index past the end of the workbook yields an empty list.
pub fn read_sheet<RS: Read + Seek>(
    rs: RS,
    file_name: &str,
    sheet_index: usize,
    start_row: usize,
) -> Result<Vec<Vec<CellValue>>, OfficeError> {
    read_sheet_with_format(rs, file_name, sheet_index, start_row, NumberFormat::general())
}

/// Reads one sheet by index under an explicit [`NumberFormat`].
pub fn read_sheet_with_format<RS: Read + Seek>(
    rs: RS,
    file_name: &str,
    sheet_index: usize,
    start_row: usize,
    format: NumberFormat,
) -> Result<Vec<Vec<CellValue>>, OfficeError> {
    let mut workbook = open_workbook(rs, file_name)?;
    let mut list = Vec::new();
    if let Some(range) = workbook.worksheet_range_at(sheet_index) {
        collect_rows(&range?, start_row, &format, &mut list);
    }
    Ok(list)
}

fn collect_rows(
    range: &calamine::Range<Data>,
    start_row: usize,
    format: &NumberFormat,
    list: &mut Vec<Vec<CellValue>>,
) {
    for row in range.rows().skip(start_row) {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        list.push(row.iter().map(|c| cell_value(c, format)).collect());
    }
}

/// Converts one raw cell into a [`CellValue`].
///
/// The fixed conversion table:
/// - strings stay text;
/// - integers (and, under the default format, floats with no fractional
///   part) are rendered as integer text;
/// - other floats stay numbers;
/// - date cells are rendered as `%Y-%m-%d` text;
/// - booleans stay booleans;
/// - blank and error cells become [`CellValue::Empty`].
///
/// Formula cells never reach this function as formulas; the wrapped reader
/// hands over their cached values.
pub fn cell_value(data: &Data, format: &NumberFormat) -> CellValue {
    match data {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Text(format.format(*i as f64)),
        Data::Float(f) => {
            // Integer-valued floats stand in for "General"-formatted cells,
            // which the wrapped reader does not flag explicitly.
            if format.is_fixed() || (f.fract() == 0.0 && f.abs() < 1e15) {
                CellValue::Text(format.format(*f))
            } else {
                CellValue::Number(*f)
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(
            dt.as_datetime()
                .map(|d| d.format(YMD_DATE_FORMAT).to_string())
                .unwrap_or_default(),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn sample_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "name").unwrap();
        worksheet.write_string(0, 1, "count").unwrap();
        worksheet.write_string(0, 2, "ratio").unwrap();
        worksheet.write_string(1, 0, "widget").unwrap();
        worksheet.write_number(1, 1, 42.0).unwrap();
        worksheet.write_number(1, 2, 0.25).unwrap();
        worksheet.write_boolean(2, 0, true).unwrap();
        worksheet
            .write_datetime_with_format(
                2,
                1,
                ExcelDateTime::from_ymd(2020, 5, 22).unwrap(),
                &Format::new().set_num_format("yyyy-mm-dd"),
            )
            .unwrap();
        workbook
    }

    #[test]
    fn test_read_sheet_conversion_table() {
        let mut workbook = sample_workbook();
        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        workbook.save(temp_file.path()).unwrap();

        let reader = BufReader::new(File::open(temp_file.path()).unwrap());
        let rows = read_sheet(reader, "sample.xlsx", 0, 0).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], CellValue::Text("name".to_string()));
        // Integer-valued numeric renders as integer text.
        assert_eq!(rows[1][1], CellValue::Text("42".to_string()));
        // Fractional numeric stays a number.
        assert_eq!(rows[1][2], CellValue::Number(0.25));
        assert_eq!(rows[2][0], CellValue::Bool(true));
        // Date cell renders as yyyy-mm-dd text.
        assert_eq!(rows[2][1], CellValue::Text("2020-05-22".to_string()));
    }

    #[test]
    fn test_read_sheet_start_row() {
        let mut workbook = sample_workbook();
        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        workbook.save(temp_file.path()).unwrap();

        let reader = BufReader::new(File::open(temp_file.path()).unwrap());
        let rows = read_sheet(reader, "sample.xlsx", 0, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::Text("widget".to_string()));
    }

    #[test]
    fn test_read_sheet_with_fixed_format() {
        let mut workbook = sample_workbook();
        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        workbook.save(temp_file.path()).unwrap();

        let reader = BufReader::new(File::open(temp_file.path()).unwrap());
        let rows =
            read_sheet_with_format(reader, "sample.xlsx", 0, 0, NumberFormat::fixed(2)).unwrap();
        assert_eq!(rows[1][1], CellValue::Text("42.00".to_string()));
        assert_eq!(rows[1][2], CellValue::Text("0.25".to_string()));
    }

    #[test]
    fn test_read_sheet_missing_index_is_empty() {
        let mut workbook = sample_workbook();
        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        workbook.save(temp_file.path()).unwrap();

        let reader = BufReader::new(File::open(temp_file.path()).unwrap());
        let rows = read_sheet(reader, "sample.xlsx", 5, 0).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_all_concatenates_sheets() {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.write_string(0, 0, "a").unwrap();
        let second = workbook.add_worksheet();
        second.write_string(0, 0, "b").unwrap();
        let buffer = workbook.save_to_buffer().unwrap();

        let rows = read_all(Cursor::new(buffer), "two.xlsx").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::Text("a".to_string()));
        assert_eq!(rows[1][0], CellValue::Text("b".to_string()));
    }

    #[test]
    fn test_open_workbook_rejects_unknown_extension() {
        let err = open_workbook(Cursor::new(Vec::new()), "data.csv").err().unwrap();
        assert!(matches!(err, OfficeError::UnsupportedFormat(_)));
        assert_eq!(err.code(), "7002");

        let err = open_workbook(Cursor::new(Vec::new()), "noextension").err().unwrap();
        assert!(matches!(err, OfficeError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_open_workbook_extension_is_case_insensitive() {
        let mut workbook = sample_workbook();
        let buffer = workbook.save_to_buffer().unwrap();
        assert!(open_workbook(Cursor::new(buffer), "SAMPLE.XLSX").is_ok());
    }

    #[test]
    fn test_cell_value_blank_and_error() {
        let nf = NumberFormat::general();
        assert_eq!(cell_value(&Data::Empty, &nf), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::Error(calamine::CellErrorType::Div0), &nf),
            CellValue::Empty
        );
    }
}
