use regex::Regex;

/// A placeholder span, as half-open byte offsets into the scanned text.
///
/// Offsets come from the regex engine and therefore always sit on UTF-8
/// character boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankSpan {
    pub start: usize,
    pub end: usize,
}

/// Find every placeholder run in `text`, in increasing start-offset order.
///
/// A placeholder is a run of 3 or more consecutive underscore or period
/// characters. The two characters are interchangeable, so a mixed run like
/// `__..__` counts as a single blank. Spans never overlap.
pub fn find_blanks(text: &str) -> Vec<BlankSpan> {
    let re = Regex::new(r"[_\.]{3,}").unwrap();
    re.find_iter(text)
        .map(|m| BlankSpan {
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Delete every placeholder run from `text`.
///
/// Used to clean label candidates before trimming, so that a stray blank
/// inside the text cannot leak into a label.
pub fn strip_blanks(text: &str) -> String {
    let re = Regex::new(r"[_\.]{3,}").unwrap();
    re.replace_all(text, "").into_owned()
}
