use std::collections::BTreeSet;

use crate::prelude::*;
use docfill_core::scan::{self, FieldMapping, ScanState};

/// Extraction pass: walk the document once with a fresh scan state and
/// collect every resolved label.
///
/// Returns the sorted, deduplicated label set. The document is not
/// modified.
pub fn extract_document_labels(doc: &docx::Document) -> Vec<String> {
    let mut state = ScanState::new();
    let mut labels = BTreeSet::new();

    doc.visit_text_blocks(|text| {
        for label in scan::extract_labels(text, &mut state) {
            labels.insert(label);
        }
    });

    labels.into_iter().collect()
}

/// Fill pass: walk the document again with its own fresh scan state and
/// substitute every blank with its mapped value.
///
/// The walk order and the label decisions are identical to the extraction
/// pass by construction, so values land in the blanks their labels were
/// read from. Returns the number of rewritten blocks.
pub fn fill_document(doc: &mut docx::Document, mapping: &FieldMapping) -> Result<usize> {
    let mut state = ScanState::new();

    doc.fill_text_blocks(|text| scan::fill_text(text, &mut state, mapping))
        .map_err(|e| eyre!("Failed to rewrite document blocks: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_bytes(body: &str) -> Vec<u8> {
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );

        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap();

        cursor.into_inner()
    }

    fn paragraph(text: &str) -> String {
        f!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
    }

    fn texts(doc: &docx::Document) -> Vec<String> {
        let mut out = Vec::new();
        doc.visit_text_blocks(|text| out.push(text.to_string()));
        out
    }

    fn mapping(pairs: &[(&str, &str)]) -> FieldMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_labels_sorted_and_deduplicated() {
        let body = [
            paragraph("Name: ____"),
            paragraph("Date: ____"),
            paragraph("Name: ____"),
        ]
        .concat();
        let doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        let labels = extract_document_labels(&doc);
        assert_eq!(labels, vec!["Date:".to_string(), "Name:".to_string()]);
    }

    #[test]
    fn test_carried_label_reaches_table_cells() {
        // The label line is a top-level paragraph; the blank sits in a table
        // cell visited later in the traversal.
        let body = f!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph("Valabilitate ofertă"),
            paragraph("____")
        );
        let doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        let labels = extract_document_labels(&doc);
        assert_eq!(labels, vec!["Valabilitate ofertă".to_string()]);
    }

    #[test]
    fn test_fill_round_trip() {
        let body = [
            paragraph("intro text"),
            paragraph("nothing here"),
            paragraph("Name: ____ rest"),
        ]
        .concat();
        let mut doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        let labels = extract_document_labels(&doc);
        assert_eq!(labels, vec!["Name:".to_string()]);

        let rewritten =
            fill_document(&mut doc, &mapping(&[("Name:", "Alice")])).unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(
            texts(&doc),
            vec![
                "intro text".to_string(),
                "nothing here".to_string(),
                "Name: Alice rest".to_string(),
            ]
        );
    }

    #[test]
    fn test_fill_multi_blank_line() {
        let body = paragraph("Name: ____ Date: ____");
        let mut doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        fill_document(
            &mut doc,
            &mapping(&[("Name:", "Alice"), ("Date:", "2024-01-01")]),
        )
        .unwrap();

        assert_eq!(texts(&doc), vec!["Name: Alice Date: 2024-01-01".to_string()]);
    }

    #[test]
    fn test_unmapped_labels_fill_as_empty() {
        let body = paragraph("Unknown: ____");
        let mut doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        let rewritten = fill_document(&mut doc, &FieldMapping::new()).unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(texts(&doc), vec!["Unknown: ".to_string()]);
    }

    #[test]
    fn test_passes_agree_on_block_order() {
        // Extraction visits top-level paragraphs before table cells; the
        // carried label the fill pass sees must match. If the two passes
        // disagreed on order, the value would land in the wrong blank.
        let body = f!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph("Beneficiar"),
            paragraph("____"),
            paragraph("Furnizor"),
            paragraph("____")
        );
        let mut doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        let labels = extract_document_labels(&doc);
        assert_eq!(
            labels,
            vec!["Beneficiar".to_string(), "Furnizor".to_string()]
        );

        fill_document(
            &mut doc,
            &mapping(&[("Beneficiar", "ACME"), ("Furnizor", "Initech")]),
        )
        .unwrap();

        assert_eq!(
            texts(&doc),
            vec![
                "Beneficiar".to_string(),
                "ACME".to_string(),
                "Furnizor".to_string(),
                "Initech".to_string(),
            ]
        );
    }

    #[test]
    fn test_fill_without_blanks_rewrites_nothing() {
        let body = [paragraph("chapter one"), paragraph("plain text")].concat();
        let mut doc = docx::Document::from_bytes(&docx_bytes(&body)).unwrap();

        let rewritten = fill_document(&mut doc, &FieldMapping::new()).unwrap();
        assert_eq!(rewritten, 0);
    }
}
