//! Serialises a [`Canvas`] to PDF bytes.
//!
//! Text uses the standard Helvetica faces with `WinAnsiEncoding`, so no
//! font program is embedded.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};

use crate::PdfError;
use crate::canvas::{Canvas, DrawOp, Font, MM_TO_PT, Rgb};

const REGULAR: &[u8] = b"F1";
const BOLD: &[u8] = b"F2";

/// Encodes text to `WinAnsiEncoding`.
///
/// Characters outside the code page degrade to a close ASCII form or `?`.
#[must_use]
pub fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => {
                out.push(u8::try_from(u32::from(c)).unwrap_or(b'?'));
            }
            '€' => out.push(0x80),
            '…' => out.push(0x85),
            '\u{2019}' => out.push(0x92),
            '\u{2013}' => out.push(0x96),
            '\u{2014}' => out.push(0x97),
            '→' => out.extend_from_slice(b"->"),
            '\u{202f}' => out.push(b' '),
            _ => out.push(b'?'),
        }
    }
    out
}

fn color(rgb: Rgb) -> Vec<Object> {
    let (r, g, b) = rgb;
    vec![
        Object::from(f32::from(r) / 255.0),
        Object::from(f32::from(g) / 255.0),
        Object::from(f32::from(b) / 255.0),
    ]
}

fn pt(mm: f32) -> Object {
    Object::from(mm * MM_TO_PT)
}

fn operations(canvas: &Canvas, ops: &[DrawOp]) -> Vec<Operation> {
    let height = canvas.size().height;
    let mut out = Vec::new();

    for op in ops {
        match op {
            DrawOp::Text { x, y, font, text } => {
                out.push(Operation::new("BT", vec![]));
                out.push(Operation::new("rg", color(font.color)));
                out.push(Operation::new("Tf", font_operands(*font)));
                out.push(Operation::new("Td", vec![pt(*x), pt(height - y)]));
                out.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                out.push(Operation::new("ET", vec![]));
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height: h,
                color: fill,
            } => {
                out.push(Operation::new("rg", color(*fill)));
                out.push(Operation::new(
                    "re",
                    vec![pt(*x), pt(height - y - h), pt(*width), pt(*h)],
                ));
                out.push(Operation::new("f", vec![]));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color: stroke,
            } => {
                out.push(Operation::new("RG", color(*stroke)));
                out.push(Operation::new("w", vec![pt(*width)]));
                out.push(Operation::new("m", vec![pt(*x1), pt(height - y1)]));
                out.push(Operation::new("l", vec![pt(*x2), pt(height - y2)]));
                out.push(Operation::new("S", vec![]));
            }
        }
    }

    out
}

fn font_operands(font: Font) -> Vec<Object> {
    let name = if font.bold { BOLD } else { REGULAR };
    vec![Object::Name(name.to_vec()), Object::from(font.size)]
}

fn font_dictionary(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Builds the PDF document for `canvas`.
///
/// # Errors
///
/// * If a content stream fails to encode
/// * If the document fails to serialise
pub fn to_pdf_bytes(canvas: &Canvas, title: &str) -> Result<Vec<u8>, PdfError> {
    let size = canvas.size();
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font_dictionary("Helvetica"));
    let bold = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::with_capacity(canvas.page_count());
    for page in canvas.pages() {
        let content = Content {
            operations: operations(canvas, &page.ops),
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::Serialize(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                pt(size.width),
                pt(size.height),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).map_err(|e| PdfError::Serialize(e.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("fare-control"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Serialize(e.to_string()))?;

    log::debug!(
        "to_pdf_bytes: {} pages, {} bytes",
        canvas.page_count(),
        bytes.len()
    );

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageSize;

    #[test]
    fn encodes_latin_one_and_euro() {
        assert_eq!(win_ansi("Élevé"), vec![0xc9, b'l', b'e', b'v', 0xe9]);
        assert_eq!(win_ansi("150.00 €"), b"150.00 \x80".to_vec());
        assert_eq!(win_ansi("Lyon → Paris"), b"Lyon -> Paris".to_vec());
    }

    #[test]
    fn writes_a_pdf_header() {
        let mut canvas = Canvas::new(PageSize::PORTRAIT);
        canvas.add_page();
        canvas.text(10.0, 10.0, Font::regular(10.0), "Bonjour");
        canvas.add_page();

        let bytes = to_pdf_bytes(&canvas, "Essai").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
