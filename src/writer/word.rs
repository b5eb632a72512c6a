use std::collections::HashMap;
use std::io::{Seek, Write};

use docx_rs::{
    AlignmentType, Docx, Paragraph, Pic, Run, RunFonts, Style, StyleType, Table, TableCell,
    TableRow as WordTableRow, WidthType,
};

use crate::error::OfficeError;

/// EMU per pixel at 96 dpi.
const EMU_PER_PIXEL: u32 = 9525;

/// A reusable run/paragraph formatting descriptor.
#[derive(Debug, Clone, Default)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<usize>,
    pub bold: bool,
    pub alignment: Option<AlignmentType>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn font_size(mut self, size: usize) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn alignment(mut self, alignment: AlignmentType) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// Builds a paragraph holding `text` with the style applied.
///
/// Font sizes are converted to the document model's half-points.
pub fn styled_paragraph(text: &str, style: Option<&TextStyle>) -> Paragraph {
    let mut run = Run::new().add_text(text);
    let mut paragraph = Paragraph::new();
    if let Some(style) = style {
        if let Some(family) = &style.font_family {
            run = run.fonts(RunFonts::new().ascii(family).east_asia(family));
        }
        if let Some(size) = style.font_size {
            run = run.size(size * 2);
        }
        if style.bold {
            run = run.bold();
        }
        if let Some(alignment) = &style.alignment {
            paragraph = paragraph.align(alignment.clone());
        }
    }
    paragraph.add_run(run)
}

/// Appends a table to the document: a header row built from `headers`, then
/// one row per data map.
///
/// Cells are resolved through `header_keys`; a key missing from a data map
/// writes an empty cell. Column widths are applied in DXA to the table grid
/// and to every cell, so the grid survives rows of differing content.
pub fn add_table(
    docx: Docx,
    data: &[HashMap<String, String>],
    header_keys: &[&str],
    headers: &[&str],
    col_widths: &[usize],
    header_style: Option<&TextStyle>,
    body_style: Option<&TextStyle>,
) -> Docx {
    let mut rows = Vec::with_capacity(data.len() + 1);

    let header_cells = header_keys
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let text = headers.get(i).copied().unwrap_or("");
            table_cell(text, header_style, col_widths.get(i).copied())
        })
        .collect();
    rows.push(WordTableRow::new(header_cells));

    for row_data in data {
        let cells = header_keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let text = row_data.get(*key).map(String::as_str).unwrap_or("");
                table_cell(text, body_style, col_widths.get(i).copied())
            })
            .collect();
        rows.push(WordTableRow::new(cells));
    }

    docx.add_table(Table::new(rows).set_grid(col_widths.to_vec()))
}

fn table_cell(text: &str, style: Option<&TextStyle>, width: Option<usize>) -> TableCell {
    let mut cell = TableCell::new().add_paragraph(styled_paragraph(text, style));
    if let Some(width) = width {
        cell = cell.width(width, WidthType::Dxa);
    }
    cell
}

/// Appends a title paragraph bound to a named paragraph style.
pub fn add_title(docx: Docx, style_id: &str, text: &str) -> Docx {
    docx.add_paragraph(
        Paragraph::new()
            .style(style_id)
            .add_run(Run::new().add_text(text)),
    )
}

/// Builds a named, bold paragraph style for headings.
///
/// Register it on the document with `Docx::add_style`, then bind paragraphs
/// to it by id via [`add_title`].
pub fn heading_style(style_id: &str, size_pt: usize) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(style_id)
        .size(size_pt * 2)
        .bold()
}

/// Appends a picture scaled to the given pixel size.
///
/// The bytes must decode as an image; the wrapped writer rejects anything
/// else.
pub fn add_picture(docx: Docx, bytes: &[u8], width_px: u32, height_px: u32) -> Docx {
    log::debug!("embedding picture at {width_px}x{height_px} px");
    let pic = Pic::new(bytes).size(width_px * EMU_PER_PIXEL, height_px * EMU_PER_PIXEL);
    docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)))
}

/// Builds the document and packs the docx container into `writer`.
pub fn save_document<W: Write + Seek>(docx: Docx, writer: W) -> Result<(), OfficeError> {
    docx.build()
        .pack(writer)
        .map_err(docx_rs::DocxError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn document_xml(docx: Docx) -> String {
        String::from_utf8(docx.build().document).unwrap()
    }

    fn sample_rows() -> Vec<HashMap<String, String>> {
        let mut first = HashMap::new();
        first.insert("name".to_string(), "gizmo".to_string());
        first.insert("price".to_string(), "9.99".to_string());
        let mut second = HashMap::new();
        second.insert("name".to_string(), "widget".to_string());
        vec![first, second]
    }

    #[test]
    fn test_add_table_header_and_body() {
        let docx = add_table(
            Docx::new(),
            &sample_rows(),
            &["name", "price"],
            &["Name", "Price"],
            &[2000, 3000],
            Some(&TextStyle::new().bold()),
            None,
        );
        let xml = document_xml(docx);

        assert!(xml.contains("<w:tbl>"));
        assert!(xml.contains("Name"));
        assert!(xml.contains("Price"));
        assert!(xml.contains("gizmo"));
        assert!(xml.contains("widget"));
        // Cell widths are written in DXA.
        assert!(xml.contains("w:w=\"2000\""));
        assert!(xml.contains("w:w=\"3000\""));
    }

    #[test]
    fn test_add_table_missing_key_writes_empty_cell() {
        let docx = add_table(
            Docx::new(),
            &sample_rows(),
            &["name", "price"],
            &["Name", "Price"],
            &[2000, 3000],
            None,
            None,
        );
        let xml = document_xml(docx);
        // Two data rows plus the header row, even though the second data map
        // has no "price" entry.
        assert_eq!(xml.matches("<w:tr>").count(), 3);
    }

    #[test]
    fn test_styled_paragraph() {
        let style = TextStyle::new()
            .font_family("楷体")
            .font_size(12)
            .bold()
            .alignment(AlignmentType::Center);
        let docx = Docx::new().add_paragraph(styled_paragraph("hello", Some(&style)));
        let xml = document_xml(docx);

        assert!(xml.contains("hello"));
        assert!(xml.contains("楷体"));
        // 12pt is written as 24 half-points.
        assert!(xml.contains("w:val=\"24\""));
        assert!(xml.contains("center"));
    }

    #[test]
    fn test_styled_paragraph_without_style() {
        let docx = Docx::new().add_paragraph(styled_paragraph("plain", None));
        let xml = document_xml(docx);
        assert!(xml.contains("plain"));
    }

    #[test]
    fn test_add_title_uses_named_style() {
        let docx = Docx::new().add_style(heading_style("Title1", 14));
        let docx = add_title(docx, "Title1", "Quarterly Report");
        let built = docx.build();

        let document = String::from_utf8(built.document).unwrap();
        assert!(document.contains("Quarterly Report"));
        assert!(document.contains("Title1"));

        let styles = String::from_utf8(built.styles).unwrap();
        assert!(styles.contains("Title1"));
    }

    #[test]
    fn test_add_picture_emits_drawing() {
        // Smallest well-formed 24bpp BMP: one white pixel.
        let mut bmp: Vec<u8> = vec![
            0x42, 0x4D, 0x3A, 0, 0, 0, 0, 0, 0, 0, 0x36, 0, 0, 0, 0x28, 0, 0, 0, 1, 0, 0, 0, 1,
            0, 0, 0, 1, 0, 0x18, 0, 0, 0, 0, 0, 0x04, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
        ];
        bmp.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);

        let docx = add_picture(Docx::new(), &bmp, 100, 50);
        let xml = document_xml(docx);
        assert!(xml.contains("<w:drawing>"));
    }

    #[test]
    fn test_save_document_packs_container() {
        let docx = Docx::new().add_paragraph(styled_paragraph("hello", None));
        let mut buffer = Cursor::new(Vec::new());
        save_document(docx, &mut buffer).unwrap();
        // A docx container is a zip archive.
        assert_eq!(&buffer.get_ref()[..2], b"PK");
    }
}
