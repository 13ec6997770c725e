use std::ops::Range;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::types::{BodyItem, Cell, Paragraph, Row, Table};
use crate::DocxError;

/// In-progress paragraph state while its events stream by.
struct ParaBuilder {
    start: usize,
    open_end: usize,
    properties: Option<Range<usize>>,
    run_properties: Option<Range<usize>>,
    text: String,
    first_run_seen: bool,
    in_first_run: bool,
}

impl ParaBuilder {
    fn new(start: usize, open_end: usize) -> Self {
        Self {
            start,
            open_end,
            properties: None,
            run_properties: None,
            text: String::new(),
            first_run_seen: false,
            in_first_run: false,
        }
    }

    fn finish(self, end: usize) -> Paragraph {
        Paragraph {
            span: self.start..end,
            open: self.start..self.open_end,
            properties: self.properties,
            run_properties: self.run_properties,
            text: self.text,
        }
    }
}

/// Parse the body of `word/document.xml` into the block index.
///
/// One event pass over the XML. Byte spans are recovered from the reader
/// position before and after each event, which for a string reader is the
/// exact extent of the event's source text.
///
/// Structure rules, matching what the fill algorithm considers a text
/// block: top-level `w:p` elements and `w:p` elements directly inside the
/// cells of top-level tables. Paragraphs inside nested tables or inside
/// drawings (text boxes) are not indexed, and neither are headers or
/// footers, which live in other package parts.
pub(crate) fn parse_body(xml: &str) -> Result<Vec<BodyItem>, DocxError> {
    let mut reader = Reader::from_str(xml);

    let mut items: Vec<BodyItem> = Vec::new();

    // Table assembly. `tbl_depth` counts w:tbl nesting; only depth-1 tables
    // directly in the body are indexed.
    let mut table: Option<Table> = None;
    let mut row: Option<Row> = None;
    let mut cell: Option<Cell> = None;
    let mut tbl_depth = 0usize;

    // Paragraph assembly. `nested_p` counts w:p elements inside an open
    // paragraph (text boxes); `skip_p` counts w:p elements in regions we do
    // not index (nested tables).
    let mut para: Option<ParaBuilder> = None;
    let mut nested_p = 0usize;
    let mut skip_p = 0usize;
    let mut in_run = false;
    let mut in_text = false;
    let mut in_ppr = false;
    let mut ppr_start = 0usize;
    let mut rpr_start = 0usize;
    let mut in_rpr = false;

    let mut last_pos = 0usize;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocxError::Xml(e.to_string()))?;
        let pos = reader.buffer_position();

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    if para.is_some() {
                        nested_p += 1;
                    } else if tbl_depth == 0 || (tbl_depth == 1 && cell.is_some()) {
                        para = Some(ParaBuilder::new(last_pos, pos));
                    } else {
                        skip_p += 1;
                    }
                }
                b"w:tbl" => {
                    tbl_depth += 1;
                    if tbl_depth == 1 && para.is_none() && skip_p == 0 {
                        table = Some(Table::default());
                    }
                }
                b"w:tr" => {
                    if tbl_depth == 1 && table.is_some() {
                        row = Some(Row::default());
                    }
                }
                b"w:tc" => {
                    if tbl_depth == 1 && row.is_some() {
                        cell = Some(Cell::default());
                    }
                }
                b"w:pPr" => {
                    if para.is_some() && nested_p == 0 && !in_run {
                        in_ppr = true;
                        ppr_start = last_pos;
                    }
                }
                b"w:r" => {
                    if let Some(p) = para.as_mut() {
                        if nested_p == 0 && !in_ppr {
                            in_run = true;
                            p.in_first_run = !p.first_run_seen;
                            p.first_run_seen = true;
                        }
                    }
                }
                b"w:rPr" => {
                    if let Some(p) = para.as_ref() {
                        if in_run
                            && nested_p == 0
                            && p.in_first_run
                            && p.run_properties.is_none()
                        {
                            in_rpr = true;
                            rpr_start = last_pos;
                        }
                    }
                }
                b"w:t" => {
                    if in_run && nested_p == 0 {
                        in_text = true;
                    }
                }
                b"w:tab" => {
                    if in_run && nested_p == 0 && !in_ppr {
                        if let Some(p) = para.as_mut() {
                            p.text.push('\t');
                        }
                    }
                }
                b"w:br" | b"w:cr" => {
                    if in_run && nested_p == 0 {
                        if let Some(p) = para.as_mut() {
                            p.text.push('\n');
                        }
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => {
                    if para.is_none()
                        && skip_p == 0
                        && (tbl_depth == 0 || (tbl_depth == 1 && cell.is_some()))
                    {
                        let paragraph = ParaBuilder::new(last_pos, pos).finish(pos);
                        push_paragraph(paragraph, &mut items, cell.as_mut(), tbl_depth);
                    }
                }
                b"w:pPr" => {
                    if let Some(p) = para.as_mut() {
                        if nested_p == 0 && !in_run {
                            p.properties = Some(last_pos..pos);
                        }
                    }
                }
                b"w:rPr" => {
                    if let Some(p) = para.as_mut() {
                        if in_run && nested_p == 0 && p.in_first_run && p.run_properties.is_none()
                        {
                            p.run_properties = Some(last_pos..pos);
                        }
                    }
                }
                b"w:tab" => {
                    if in_run && nested_p == 0 && !in_ppr {
                        if let Some(p) = para.as_mut() {
                            p.text.push('\t');
                        }
                    }
                }
                b"w:br" | b"w:cr" => {
                    if in_run && nested_p == 0 {
                        if let Some(p) = para.as_mut() {
                            p.text.push('\n');
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    if let Some(p) = para.as_mut() {
                        let decoded = t.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                        p.text.push_str(&decoded);
                    }
                }
            }
            Event::CData(t) => {
                if in_text {
                    if let Some(p) = para.as_mut() {
                        p.text
                            .push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if nested_p > 0 {
                        nested_p -= 1;
                    } else if let Some(builder) = para.take() {
                        in_run = false;
                        in_text = false;
                        let paragraph = builder.finish(pos);
                        push_paragraph(paragraph, &mut items, cell.as_mut(), tbl_depth);
                    } else if skip_p > 0 {
                        skip_p -= 1;
                    }
                }
                b"w:tbl" => {
                    if tbl_depth == 1 {
                        if let Some(t) = table.take() {
                            items.push(BodyItem::Table(t));
                        }
                    }
                    tbl_depth = tbl_depth.saturating_sub(1);
                }
                b"w:tr" => {
                    if tbl_depth == 1 {
                        if let (Some(t), Some(r)) = (table.as_mut(), row.take()) {
                            t.rows.push(r);
                        }
                    }
                }
                b"w:tc" => {
                    if tbl_depth == 1 {
                        if let (Some(r), Some(c)) = (row.as_mut(), cell.take()) {
                            r.cells.push(c);
                        }
                    }
                }
                b"w:pPr" => {
                    if in_ppr {
                        if let Some(p) = para.as_mut() {
                            p.properties = Some(ppr_start..pos);
                        }
                        in_ppr = false;
                    }
                }
                b"w:rPr" => {
                    if in_rpr {
                        if let Some(p) = para.as_mut() {
                            p.run_properties = Some(rpr_start..pos);
                        }
                        in_rpr = false;
                    }
                }
                b"w:r" => {
                    if nested_p == 0 {
                        in_run = false;
                        if let Some(p) = para.as_mut() {
                            p.in_first_run = false;
                        }
                    }
                }
                b"w:t" => {
                    if nested_p == 0 {
                        in_text = false;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }

        last_pos = pos;
    }

    Ok(items)
}

fn push_paragraph(
    paragraph: Paragraph,
    items: &mut Vec<BodyItem>,
    cell: Option<&mut Cell>,
    tbl_depth: usize,
) {
    match cell {
        Some(cell) if tbl_depth == 1 => cell.paragraphs.push(paragraph),
        _ => items.push(BodyItem::Paragraph(paragraph)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        )
    }

    fn paragraph_texts(items: &[BodyItem]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| match item {
                BodyItem::Paragraph(p) => Some(p.text.clone()),
                BodyItem::Table(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_single_paragraph() {
        let xml = document("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");
        let items = parse_body(&xml).unwrap();

        assert_eq!(paragraph_texts(&items), vec!["Hello".to_string()]);
    }

    #[test]
    fn test_paragraph_span_covers_element() {
        let xml = document("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");
        let items = parse_body(&xml).unwrap();

        let BodyItem::Paragraph(p) = &items[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(&xml[p.span.clone()], "<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");
        assert_eq!(&xml[p.open.clone()], "<w:p>");
    }

    #[test]
    fn test_runs_concatenate_with_tabs_and_breaks() {
        let xml = document(
            "<w:p><w:r><w:t>Name:</w:t><w:tab/></w:r>\
             <w:r><w:t>____</w:t><w:br/><w:t>next</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        assert_eq!(paragraph_texts(&items), vec!["Name:\t____\nnext".to_string()]);
    }

    #[test]
    fn test_entities_are_decoded() {
        let xml = document("<w:p><w:r><w:t>A &amp; B &lt;C&gt;</w:t></w:r></w:p>");
        let items = parse_body(&xml).unwrap();

        assert_eq!(paragraph_texts(&items), vec!["A & B <C>".to_string()]);
    }

    #[test]
    fn test_empty_and_self_closing_paragraphs() {
        let xml = document("<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p><w:p></w:p>");
        let items = parse_body(&xml).unwrap();

        assert_eq!(
            paragraph_texts(&items),
            vec!["".to_string(), "x".to_string(), "".to_string()]
        );
    }

    #[test]
    fn test_properties_spans_are_captured() {
        let xml = document(
            "<w:p><w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r>\
             <w:r><w:rPr><w:i/></w:rPr><w:t>Italic</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        let BodyItem::Paragraph(p) = &items[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            &xml[p.properties.clone().unwrap()],
            "<w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr>"
        );
        // Only the first run's properties are kept.
        assert_eq!(
            &xml[p.run_properties.clone().unwrap()],
            "<w:rPr><w:b/></w:rPr>"
        );
        assert_eq!(p.text, "BoldItalic");
    }

    #[test]
    fn test_second_run_properties_are_not_borrowed() {
        // First run has no rPr; the second run's rPr must not be attributed
        // to a collapse of the first.
        let xml = document(
            "<w:p><w:r><w:t>plain</w:t></w:r>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        let BodyItem::Paragraph(p) = &items[0] else {
            panic!("expected paragraph");
        };
        assert!(p.run_properties.is_none());
    }

    #[test]
    fn test_table_structure() {
        let xml = document(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>\
             <w:tbl>\
             <w:tr><w:tc><w:p><w:r><w:t>a1</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>b1</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:p><w:r><w:t>a2</w:t></w:r></w:p>\
             <w:p><w:r><w:t>a2bis</w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            paragraph_texts(&items),
            vec!["before".to_string(), "after".to_string()]
        );

        let BodyItem::Table(table) = &items[1] else {
            panic!("expected table");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[0].cells[0].paragraphs[0].text, "a1");
        assert_eq!(table.rows[0].cells[1].paragraphs[0].text, "b1");
        let second_row_cell = &table.rows[1].cells[0];
        assert_eq!(second_row_cell.paragraphs.len(), 2);
        assert_eq!(second_row_cell.paragraphs[1].text, "a2bis");
    }

    #[test]
    fn test_nested_table_paragraphs_are_not_indexed() {
        let xml = document(
            "<w:tbl><w:tr><w:tc>\
             <w:p><w:r><w:t>outer</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             </w:tc></w:tr></w:tbl>",
        );
        let items = parse_body(&xml).unwrap();

        assert_eq!(items.len(), 1);
        let BodyItem::Table(table) = &items[0] else {
            panic!("expected table");
        };
        let cell = &table.rows[0].cells[0];
        assert_eq!(cell.paragraphs.len(), 1);
        assert_eq!(cell.paragraphs[0].text, "outer");
    }

    #[test]
    fn test_text_box_paragraphs_are_not_indexed() {
        let xml = document(
            "<w:p><w:r>\
             <w:drawing><w:txbxContent>\
             <w:p><w:r><w:t>boxed</w:t></w:r></w:p>\
             </w:txbxContent></w:drawing>\
             <w:t>real</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        assert_eq!(paragraph_texts(&items), vec!["real".to_string()]);
    }

    #[test]
    fn test_field_instruction_text_is_ignored() {
        let xml = document(
            "<w:p><w:r><w:instrText>PAGE \\* MERGEFORMAT</w:instrText>\
             <w:t>visible</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        assert_eq!(paragraph_texts(&items), vec!["visible".to_string()]);
    }

    #[test]
    fn test_tab_definitions_in_ppr_do_not_emit_tabs() {
        let xml = document(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>text</w:t></w:r></w:p>",
        );
        let items = parse_body(&xml).unwrap();

        assert_eq!(paragraph_texts(&items), vec!["text".to_string()]);
    }

    #[test]
    fn test_malformed_xml_errors() {
        let xml = document("<w:p><w:r><w:t>oops</w:r></w:p>");
        assert!(matches!(parse_body(&xml), Err(DocxError::Xml(_))));
    }
}
