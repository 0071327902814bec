mod condense;
mod extract;
mod store;

pub use condense::{chunk, condense};
pub use extract::{extract, Extraction};
pub use store::DocumentSet;

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Txt,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Accepts "pdf", ".pdf", ".PDF".
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Txt => "TXT",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        }
    }
}

/// Extension of `name` including the leading dot, or "" when it has none.
pub fn declared_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedDocument {
    pub name: String,
    pub extraction: Extraction,
    /// Condensed text ready to be injected into prompts.
    pub excerpt: String,
}

impl IngestedDocument {
    pub fn is_text(&self) -> bool {
        self.extraction.is_text()
    }
}

/// Turns uploaded blobs into bounded context excerpts.
#[derive(Debug, Clone)]
pub struct DocumentIngestor {
    max_context_chars: usize,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for DocumentIngestor {
    fn default() -> Self {
        Self::new(defaults::MAX_CONTEXT_CHARS)
    }
}

impl DocumentIngestor {
    pub fn new(max_context_chars: usize) -> Self {
        Self {
            max_context_chars,
            chunk_size: defaults::CHUNK_SIZE,
            chunk_overlap: defaults::CHUNK_OVERLAP,
        }
    }

    pub fn with_chunking(mut self, size: usize, overlap: usize) -> Self {
        self.chunk_size = size;
        self.chunk_overlap = overlap;
        self
    }

    pub fn max_context_chars(&self) -> usize {
        self.max_context_chars
    }

    /// Extract then condense. Failed extractions still yield an excerpt
    /// (the in-band error text) so the document can be listed and removed.
    pub fn ingest(&self, name: &str, blob: &[u8]) -> IngestedDocument {
        let extraction = extract(blob, &declared_extension(name));
        let full_text = extraction.text();

        if extraction.is_text() {
            info!(document = %name, chars = full_text.chars().count(), "document extracted");
        } else {
            warn!(document = %name, detail = %full_text, "document extraction failed");
        }

        IngestedDocument {
            name: name.to_string(),
            excerpt: condense(&full_text, self.max_context_chars),
            extraction,
        }
    }

    pub fn chunks(&self, text: &str) -> Vec<String> {
        chunk(text, self.chunk_size, self.chunk_overlap)
    }
}
