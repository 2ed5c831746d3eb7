use std::ops::Range;

/// A run of cell text, flagged if it matched one of the search terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

// Byte length of `term` matched case-insensitively at the start of `text`.
fn match_len(text: &str, term: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    for t in term.chars() {
        let (_, c) = chars.next()?;
        if !c.to_lowercase().eq(t.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map(|(i, _)| i).unwrap_or(text.len()))
}

/// Byte ranges of `text` matched by any term, merged and sorted.
pub fn match_ranges(text: &str, terms: &[String]) -> Vec<Range<usize>> {
    let terms: Vec<&str> = terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    if terms.is_empty() {
        return Vec::new();
    }
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (start, _) in text.char_indices() {
        let rest = &text[start..];
        let longest = terms.iter().filter_map(|t| match_len(rest, t)).max();
        if let Some(len) = longest {
            let end = start + len;
            match ranges.last_mut() {
                Some(last) if start <= last.end => last.end = last.end.max(end),
                _ => ranges.push(start..end),
            }
        }
    }
    ranges
}

/// Split `text` into plain and highlighted runs for rendering.
pub fn highlight_segments<'a>(text: &'a str, terms: &[String]) -> Vec<TextSegment<'a>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for r in match_ranges(text, terms) {
        if r.start > cursor {
            out.push(TextSegment { text: &text[cursor..r.start], highlighted: false });
        }
        out.push(TextSegment { text: &text[r.clone()], highlighted: true });
        cursor = r.end;
    }
    if cursor < text.len() || out.is_empty() {
        out.push(TextSegment { text: &text[cursor..], highlighted: false });
    }
    out
}
