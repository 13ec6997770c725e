use std::path::Path;

use thiserror::Error;

mod package;
mod parse;
mod walk;

pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("DOCX package error: {0}")]
    Package(String),
    #[error("package has no word/document.xml part")]
    MissingDocument,
    #[error("document XML error: {0}")]
    Xml(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A DOCX package holding all intermediate state.
///
/// Constructed via [`Document::open`] or [`Document::from_bytes`]. Keeps the
/// full zip entry list (so untouched parts round-trip byte-identical), the
/// `word/document.xml` source, and a parsed index of its text blocks.
///
/// Text blocks are visited in one canonical order — all top-level paragraphs
/// in document order, then each top-level table's rows, cells, and cell
/// paragraphs in nested document order — by both [`Document::visit_text_blocks`]
/// and [`Document::fill_text_blocks`]. A read pass and a rewrite pass over the
/// same document therefore see the same block sequence.
pub struct Document {
    entries: Vec<(String, Vec<u8>)>,
    xml: String,
    body: Vec<BodyItem>,
}

impl Document {
    /// Open a DOCX file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocxError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse DOCX bytes into a navigable document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let entries = package::read_package(bytes)?;

        let raw = entries
            .iter()
            .find(|(name, _)| name == package::DOCUMENT_PART)
            .map(|(_, data)| data.clone())
            .ok_or(DocxError::MissingDocument)?;
        let xml = String::from_utf8(raw).map_err(|e| DocxError::Xml(e.to_string()))?;

        let body = parse::parse_body(&xml)?;

        Ok(Document { entries, xml, body })
    }

    /// Number of text blocks the traversal visits.
    pub fn block_count(&self) -> usize {
        walk::blocks(&self.body).len()
    }

    /// Apply `handler` to every text block, in canonical order, read-only.
    pub fn visit_text_blocks<F: FnMut(&str)>(&self, mut handler: F) {
        for paragraph in walk::blocks(&self.body) {
            handler(&paragraph.text);
        }
    }

    /// Apply `handler` to every text block, in canonical order, rewriting
    /// each block for which it returns `Some(new_text)`.
    ///
    /// Rewritten paragraphs keep their open tag, paragraph properties, and
    /// first run's properties; the run sequence collapses to a single run
    /// holding the new text. Blocks where the handler returns `None` stay
    /// byte-identical. Returns the number of rewritten blocks.
    pub fn fill_text_blocks<F: FnMut(&str) -> Option<String>>(
        &mut self,
        mut handler: F,
    ) -> Result<usize, DocxError> {
        let mut edits = Vec::new();
        for paragraph in walk::blocks(&self.body) {
            if let Some(new_text) = handler(&paragraph.text) {
                edits.push(walk::Edit::for_paragraph(paragraph, new_text));
            }
        }

        let rewritten = edits.len();
        if rewritten > 0 {
            walk::apply_edits(&mut self.xml, edits);
            // Spans are stale after the edit; rebuild the block index.
            self.body = parse::parse_body(&self.xml)?;
        }

        Ok(rewritten)
    }

    /// Serialize the package, with the current document XML, back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let entries: Vec<(String, Vec<u8>)> = self
            .entries
            .iter()
            .map(|(name, data)| {
                if name == package::DOCUMENT_PART {
                    (name.clone(), self.xml.as_bytes().to_vec())
                } else {
                    (name.clone(), data.clone())
                }
            })
            .collect();

        package::write_package(&entries)
    }

    /// Write the package to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocxError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
