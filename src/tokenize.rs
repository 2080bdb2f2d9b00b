//! Line normalization for preference files.
//!
//! Each raw line is reduced to its significant text: the trailing comment is
//! cut, whitespace outside the quoted span is removed and the quote marks
//! themselves are dropped. `key = "a b" # note` becomes `key=a b`.

use std::ops::Range;

/// Starts a comment. Also terminates each line in [`token_stream`].
pub const COMMENT: char = '#';

const QUOTE: char = '"';

/// A line that survived normalization, with its 1-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignificantLine {
    pub number: usize,
    pub text: String,
}

/// Protected region of a line: from the first `"` up to the last `"`, or to
/// the end of the line when only one quote is present.
#[derive(Debug, Clone, Copy)]
struct QuotedSpan {
    open: usize,
    close: Option<usize>,
}

impl QuotedSpan {
    fn find(line: &str) -> Option<Self> {
        let open = line.find(QUOTE)?;
        let close = line.rfind(QUOTE).filter(|&close| close > open);
        Some(Self { open, close })
    }

    fn contains(&self, idx: usize) -> bool {
        idx > self.open && self.close.map_or(true, |close| idx < close)
    }
}

/// A normalized line, remembering where the quoted text ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    pub text: String,
    /// Byte range of `text` that came from inside quotes.
    pub quoted: Option<Range<usize>>,
}

impl NormalizedLine {
    pub fn is_quoted(&self, idx: usize) -> bool {
        self.quoted.as_ref().is_some_and(|range| range.contains(&idx))
    }

    /// Offset of the first `needle` at or after `from` that was not quoted.
    pub fn find_unquoted(&self, needle: char, from: usize) -> Option<usize> {
        self.text[from..]
            .match_indices(needle)
            .map(|(idx, _)| idx + from)
            .find(|&idx| !self.is_quoted(idx))
    }

    /// The text from `from` on, with the quoted range shifted to match.
    pub fn tail(&self, from: usize) -> NormalizedLine {
        let quoted = self
            .quoted
            .as_ref()
            .filter(|range| range.end > from)
            .map(|range| range.start.max(from) - from..range.end - from);
        NormalizedLine {
            text: self.text[from..].to_string(),
            quoted,
        }
    }
}

/// Normalize a single raw line.
///
/// Returns `None` for blank lines and lines whose first non-whitespace
/// character starts a comment.
pub fn normalize_line(line: &str) -> Option<String> {
    normalize(line).map(|normalized| normalized.text)
}

/// Like [`normalize_line`], keeping track of the quoted text.
pub fn normalize(line: &str) -> Option<NormalizedLine> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
        return None;
    }

    let span = QuotedSpan::find(line);
    let content = match comment_start(line, span) {
        Some(cut) => &line[..cut],
        None => line,
    };

    let mut text = String::with_capacity(content.len());
    let mut quoted = None;
    match span.filter(|s| s.open < content.len()) {
        Some(span) => {
            push_without_whitespace(&mut text, &content[..span.open]);
            let start = text.len();
            let inner_end = span.close.unwrap_or(content.len());
            text.push_str(&content[span.open + 1..inner_end]);
            quoted = Some(start..text.len());
            if let Some(close) = span.close {
                push_without_whitespace(&mut text, &content[close + 1..]);
            }
        }
        None => push_without_whitespace(&mut text, content),
    }

    Some(NormalizedLine { text, quoted })
}

/// Byte offset of the first `#` that is not inside the quoted span.
///
/// A `#` ahead of the opening quote wins, which drops the quoted text with
/// the rest of the comment.
fn comment_start(line: &str, span: Option<QuotedSpan>) -> Option<usize> {
    line.match_indices(COMMENT)
        .map(|(idx, _)| idx)
        .find(|&idx| !span.is_some_and(|s| s.contains(idx)))
}

fn push_without_whitespace(out: &mut String, text: &str) {
    out.extend(text.chars().filter(|c| !c.is_whitespace()));
}

/// Iterate over the lines of `content` that carry configuration.
pub fn significant_lines(content: &str) -> impl Iterator<Item = SignificantLine> + '_ {
    content.lines().enumerate().filter_map(|(idx, line)| {
        normalize_line(line).map(|text| SignificantLine {
            number: idx + 1,
            text,
        })
    })
}

/// Join every significant line of `content`, each terminated by `#`.
pub fn token_stream(content: &str) -> String {
    let mut stream = String::with_capacity(content.len());
    for line in significant_lines(content) {
        stream.push_str(&line.text);
        stream.push(COMMENT);
    }
    stream
}
