use crate::constants::markers;
use crate::document::DocumentKind;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::any::Any;
use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Result of turning an uploaded blob into plain text.
///
/// Unsupported formats and parser failures are not errors at this
/// boundary: `text()` renders them as the marker strings the chat shows,
/// and the variant tells callers the text is not real document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    Unsupported,
    Failed { kind: DocumentKind, detail: String },
}

impl Extraction {
    pub fn is_text(&self) -> bool {
        matches!(self, Extraction::Text(_))
    }

    pub fn text(&self) -> String {
        match self {
            Extraction::Text(text) => text.clone(),
            Extraction::Unsupported => markers::UNSUPPORTED_FORMAT.to_string(),
            Extraction::Failed { kind, detail } => {
                format!("Error extracting {} text: {}", kind.label(), detail)
            }
        }
    }
}

#[derive(Debug, Error)]
enum ExtractError {
    #[error("{0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("{0}")]
    Pdf(#[from] lopdf::Error),
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Extract plain text from `blob`, dispatching on the declared extension.
pub fn extract(blob: &[u8], declared_extension: &str) -> Extraction {
    let Some(kind) = DocumentKind::from_extension(declared_extension) else {
        return Extraction::Unsupported;
    };

    let result = match kind {
        DocumentKind::Txt => extract_txt(blob),
        DocumentKind::Pdf => extract_pdf(blob),
        DocumentKind::Docx => extract_docx(blob),
    };

    match result {
        Ok(text) => Extraction::Text(text),
        Err(e) => Extraction::Failed {
            kind,
            detail: e.to_string(),
        },
    }
}

fn extract_txt(blob: &[u8]) -> Result<String, ExtractError> {
    Ok(std::str::from_utf8(blob)?.to_string())
}

/// Page texts concatenated in page order.
///
/// lopdf panics on some damaged object streams, so parsing runs under
/// `catch_unwind` and a panic becomes an ordinary extraction failure.
fn extract_pdf(blob: &[u8]) -> Result<String, ExtractError> {
    panic::catch_unwind(AssertUnwindSafe(|| pdf_page_text(blob)))
        .unwrap_or_else(|payload| Err(ExtractError::Malformed(panic_detail(payload.as_ref()))))
}

fn pdf_page_text(blob: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(blob)?;
    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        text.push_str(&doc.extract_text(&[*page_number])?);
    }
    Ok(text)
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "parser panicked".to_string()
    }
}

fn extract_docx(blob: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(blob))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;
    docx_body_text(&xml)
}

/// Body paragraphs of a WordprocessingML document, each followed by a
/// newline. Paragraphs inside tables and nested text boxes are skipped.
fn docx_body_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut paragraph = String::new();
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    let top_level = |table_depth: usize, paragraph_depth: usize| {
        table_depth == 0 && paragraph_depth == 1
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" => {
                    paragraph_depth += 1;
                    if top_level(table_depth, paragraph_depth) {
                        paragraph.clear();
                    }
                }
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref() == b"p" && table_depth == 0 && paragraph_depth == 0 {
                    text.push('\n');
                } else if run_depth > 0 && top_level(table_depth, paragraph_depth) {
                    match name.as_ref() {
                        b"tab" => paragraph.push('\t'),
                        b"br" | b"cr" => paragraph.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if in_text && top_level(table_depth, paragraph_depth) {
                    paragraph.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" => {
                    if top_level(table_depth, paragraph_depth) {
                        text.push_str(&paragraph);
                        text.push('\n');
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
