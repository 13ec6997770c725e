use std::collections::BTreeMap;

use crate::blanks::{find_blanks, strip_blanks};

/// Label-to-value association consulted read-only while filling.
///
/// Absent keys mean "no known value" and substitute as the empty string.
pub type FieldMapping = BTreeMap<String, String>;

/// The resolver memory cell: the most recently established label, carried
/// across text blocks within a single traversal.
///
/// Exactly one `ScanState` is live during a pass. Extraction and filling
/// each start from a fresh state and, because they share the resolution
/// routine below, make identical label decisions for every blank.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    last_label: Option<String>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The carried-over label, if any block has established one yet.
    pub fn last_label(&self) -> Option<&str> {
        self.last_label.as_deref()
    }

    fn remember(&mut self, label: &str) {
        self.last_label = Some(label.to_string());
    }
}

/// A blank together with the label it resolved to.
///
/// `label` is `None` when the blank has no preceding text and no label has
/// been carried over from an earlier block; such blanks fill as the empty
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlank {
    pub start: usize,
    pub end: usize,
    pub label: Option<String>,
}

/// Resolve every blank in one text block, updating `state` as a side effect.
///
/// This is the single decision procedure shared by extraction and filling:
///
/// - Whitespace-only text is skipped entirely, with no state change.
/// - Text with no blanks emits nothing, but its trimmed content becomes the
///   new last label (a bare line of text is assumed to label a following
///   block).
/// - For each blank, left to right: the text since the previous blank's end
///   (or the block start), with placeholder runs stripped and trimmed, is
///   the label; when that is empty the blank inherits the carried-over
///   label instead. Every determined label, either way, becomes the new
///   carried-over label, so a second blank on the same line with no text of
///   its own inherits the first one's label.
/// - Trailing text after the last blank, stripped and trimmed, overrides
///   the carried-over label when non-empty. This applies even when the
///   overridden label was used earlier on the same line.
pub fn resolve_blanks(text: &str, state: &mut ScanState) -> Vec<ResolvedBlank> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let blanks = find_blanks(text);
    if blanks.is_empty() {
        state.remember(text.trim());
        return Vec::new();
    }

    let mut resolved = Vec::with_capacity(blanks.len());
    let mut cursor = 0;
    for blank in blanks {
        let before = strip_blanks(&text[cursor..blank.start]);
        let before = before.trim();

        let label = if before.is_empty() {
            state.last_label().map(str::to_string)
        } else {
            Some(before.to_string())
        };
        if let Some(label) = &label {
            state.remember(label);
        }

        resolved.push(ResolvedBlank {
            start: blank.start,
            end: blank.end,
            label,
        });
        cursor = blank.end;
    }

    let after = strip_blanks(&text[cursor..]);
    let after = after.trim();
    if !after.is_empty() {
        state.remember(after);
    }

    resolved
}

/// Extraction projection: the labels resolved for this block, in blank
/// order, duplicates included, unresolved blanks omitted.
pub fn extract_labels(text: &str, state: &mut ScanState) -> Vec<String> {
    resolve_blanks(text, state)
        .into_iter()
        .filter_map(|blank| blank.label)
        .collect()
}

/// Fill projection: the block text with every blank span replaced by its
/// mapped value, all other characters preserved verbatim.
///
/// Returns `None` when the block needs no rewrite (whitespace-only, or no
/// blanks found); the state still advances exactly as in extraction.
/// Unresolved or unmapped labels substitute as the empty string.
pub fn fill_text(text: &str, state: &mut ScanState, mapping: &FieldMapping) -> Option<String> {
    let resolved = resolve_blanks(text, state);
    if resolved.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for blank in &resolved {
        out.push_str(&text[cursor..blank.start]);
        if let Some(label) = &blank.label {
            if let Some(value) = mapping.get(label) {
                out.push_str(value);
            }
        }
        cursor = blank.end;
    }
    out.push_str(&text[cursor..]);

    Some(out)
}
