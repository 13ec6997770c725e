use std::ops::Range;

/// One paragraph of the document body, top-level or inside a table cell.
///
/// Byte ranges index into the owning document's `word/document.xml` source
/// and become stale as soon as that source is edited; the body index is
/// reparsed after every edit batch.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Full `<w:p>...</w:p>` span (the whole tag when self-closing).
    pub(crate) span: Range<usize>,
    /// The paragraph open tag, `<w:p ...>`.
    pub(crate) open: Range<usize>,
    /// `<w:pPr>...</w:pPr>` span, if the paragraph has properties.
    pub(crate) properties: Option<Range<usize>>,
    /// The first run's `<w:rPr>...</w:rPr>` span, if present.
    pub(crate) run_properties: Option<Range<usize>>,
    /// Concatenated visible text of the paragraph's runs: `w:t` content
    /// with entities decoded, plus `\t` for `w:tab` and `\n` for
    /// `w:br`/`w:cr`.
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// A top-level element of the document body, in document order.
#[derive(Debug, Clone)]
pub enum BodyItem {
    Paragraph(Paragraph),
    Table(Table),
}
