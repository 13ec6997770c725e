use std::ops::Range;

use quick_xml::escape::escape;

use crate::types::{BodyItem, Paragraph};

/// Canonical block order: every top-level paragraph in document order, then
/// every top-level table's paragraphs in row/cell/paragraph order.
///
/// Both traversal entry points on [`crate::Document`] iterate this one
/// sequence, so the extraction and fill passes cannot diverge.
pub(crate) fn blocks(body: &[BodyItem]) -> Vec<&Paragraph> {
    let mut out = Vec::new();

    for item in body {
        if let BodyItem::Paragraph(paragraph) = item {
            out.push(paragraph);
        }
    }

    for item in body {
        if let BodyItem::Table(table) = item {
            for row in &table.rows {
                for cell in &row.cells {
                    for paragraph in &cell.paragraphs {
                        out.push(paragraph);
                    }
                }
            }
        }
    }

    out
}

/// A pending paragraph rewrite, captured as spans into the pre-edit XML.
pub(crate) struct Edit {
    pub span: Range<usize>,
    pub open: Range<usize>,
    pub properties: Option<Range<usize>>,
    pub run_properties: Option<Range<usize>>,
    pub text: String,
}

impl Edit {
    pub(crate) fn for_paragraph(paragraph: &Paragraph, text: String) -> Self {
        Self {
            span: paragraph.span.clone(),
            open: paragraph.open.clone(),
            properties: paragraph.properties.clone(),
            run_properties: paragraph.run_properties.clone(),
            text,
        }
    }
}

/// Apply paragraph rewrites to the document XML.
///
/// Edits are applied back to front so earlier byte offsets stay valid while
/// later spans are replaced.
pub(crate) fn apply_edits(xml: &mut String, mut edits: Vec<Edit>) {
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    for edit in edits {
        let replacement = rebuild_paragraph(xml, &edit);
        xml.replace_range(edit.span.clone(), &replacement);
    }
}

/// Rebuild one paragraph around its new text.
///
/// The original open tag and paragraph properties are kept; the run
/// sequence collapses to a single run carrying the first run's properties
/// and one `w:t` with the new text. Finer run-level style boundaries are
/// discarded.
fn rebuild_paragraph(xml: &str, edit: &Edit) -> String {
    let mut out = String::with_capacity(edit.span.len() + edit.text.len());

    let open = &xml[edit.open.clone()];
    if let Some(stripped) = open.strip_suffix("/>") {
        out.push_str(stripped);
        out.push('>');
    } else {
        out.push_str(open);
    }

    if let Some(properties) = &edit.properties {
        out.push_str(&xml[properties.clone()]);
    }

    out.push_str("<w:r>");
    if let Some(run_properties) = &edit.run_properties {
        out.push_str(&xml[run_properties.clone()]);
    }
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape(&edit.text));
    out.push_str("</w:t></w:r></w:p>");

    out
}
