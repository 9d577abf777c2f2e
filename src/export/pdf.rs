use std::io::BufWriter;

use printpdf::*;

use crate::export::ExportError;
use crate::reports::Table;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MM: f32 = 280.0;
const BOTTOM_MM: f32 = 15.0;
/// Courier at 7pt fits about 110 characters between the margins.
const LINE_CHARS: usize = 110;

/// Render a report table as a paginated PDF: a titled header on every
/// page, one line per record, new page when the cursor reaches the
/// bottom margin.
pub fn table_to_pdf(table: &Table) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&table.title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;

    let header = truncate(&table.columns.join(" | "), LINE_CHARS);

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut page_number = 1;
    let mut y = page_header(&layer, &bold, &font, &table.title, &header, page_number);

    for row in &table.rows {
        if y < Mm(BOTTOM_MM) {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            page_number += 1;
            y = page_header(&layer, &bold, &font, &table.title, &header, page_number);
        }
        let line = truncate(&row.join(" | "), LINE_CHARS);
        layer.use_text(&line, 7.0, Mm(15.0), y, &font);
        y -= Mm(4.0);
    }

    if table.rows.is_empty() {
        layer.use_text("(no records)", 9.0, Mm(15.0), y, &font);
    }

    save_to_bytes(doc)
}

/// One-page confirmation handed to the patient when an appointment is
/// booked.
pub fn appointment_confirmation_pdf(
    chart_number: &str,
    date: &str,
    time: &str,
    reason: &str,
) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Appointment Confirmation",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;

    let mut y = Mm(270.0);
    layer.use_text("Appointment Confirmation", 14.0, Mm(20.0), y, &bold);
    y -= Mm(12.0);
    layer.use_text(format!("Chart number: {chart_number}"), 11.0, Mm(20.0), y, &font);
    y -= Mm(7.0);
    layer.use_text(format!("Date: {date}"), 11.0, Mm(20.0), y, &font);
    y -= Mm(7.0);
    layer.use_text(format!("Time: {time}"), 11.0, Mm(20.0), y, &font);
    y -= Mm(10.0);
    layer.use_text("Reason:", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for line in wrap_text(reason, 80) {
        layer.use_text(&line, 10.0, Mm(25.0), y, &font);
        y -= Mm(5.0);
    }

    save_to_bytes(doc)
}

/// Draw the title + column header at the top of a page and return the
/// cursor position for the first data line.
fn page_header(
    layer: &PdfLayerReference,
    bold: &IndirectFontRef,
    font: &IndirectFontRef,
    title: &str,
    header: &str,
    page_number: u32,
) -> Mm {
    let mut y = Mm(TOP_MM);
    layer.use_text(title, 13.0, Mm(15.0), y, bold);
    layer.use_text(format!("page {page_number}"), 8.0, Mm(185.0), y, font);
    y -= Mm(8.0);
    layer.use_text(header, 7.0, Mm(15.0), y, font);
    y -= Mm(6.0);
    y
}

fn save_to_bytes(doc: PdfDocumentReference) -> Result<Vec<u8>, ExportError> {
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("PDF buffer error: {e}")))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
