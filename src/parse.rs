//! Section parser.
//!
//! Walks the normalized lines of a source once, emitting a [`Token`] per
//! section header or `key=value` fragment, and folds them into a
//! [`ConfigMapping`].

use std::str::Lines;

use thiserror::Error;
use tracing::warn;

use crate::mapping::{fold, ConfigMapping};
use crate::tokenize::{normalize, NormalizedLine};

const SECTION_OPEN: char = '[';
const SECTION_CLOSE: char = ']';

/// A `[` without a matching `]`.
///
/// A header needs its `]` on the same line. A `[` elsewhere only needs a
/// `]` somewhere after it in the source. Quoted brackets never count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mismatched section label at line {line}: `{text}`")]
pub struct FormatError {
    /// 1-based line number in the source text.
    pub line: usize,
    /// The normalized line that failed.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[name]`, name already lowercased.
    Section(String),
    /// `key=value`, key already lowercased.
    Pair { key: String, value: String },
}

/// Forward cursor over the tokens of one source.
///
/// Yields `(line, token)`. Stops after the first error.
pub struct Tokens<'a> {
    lines: std::iter::Enumerate<Lines<'a>>,
    // Text following `]` on a header line.
    pending: Option<(usize, NormalizedLine)>,
    failed: bool,
}

pub fn tokens(content: &str) -> Tokens<'_> {
    Tokens {
        lines: content.lines().enumerate(),
        pending: None,
        failed: false,
    }
}

impl Tokens<'_> {
    fn next_line(&mut self) -> Option<(usize, NormalizedLine)> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        self.lines
            .by_ref()
            .find_map(|(idx, raw)| normalize(raw).map(|line| (idx + 1, line)))
    }

    /// Whether any remaining line holds an unquoted `]`.
    fn close_follows(&self) -> bool {
        self.lines.clone().any(|(_, raw)| {
            normalize(raw).is_some_and(|line| line.find_unquoted(SECTION_CLOSE, 0).is_some())
        })
    }

    fn fail(&mut self, line: usize, text: String) -> Option<<Self as Iterator>::Item> {
        self.failed = true;
        Some(Err(FormatError { line, text }))
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<(usize, Token), FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let (line, normalized) = self.next_line()?;

            if normalized.text.starts_with(SECTION_OPEN) && !normalized.is_quoted(0) {
                let Some(end) = normalized.find_unquoted(SECTION_CLOSE, 1) else {
                    return self.fail(line, normalized.text);
                };
                let name = fold(&normalized.text[1..end]);
                // `[s] key = v` keeps `key = v` as the first pair of `s`.
                if end + 1 < normalized.text.len() {
                    self.pending = Some((line, normalized.tail(end + 1)));
                }
                return Some(Ok((line, Token::Section(name))));
            }

            if normalized.text.is_empty() {
                continue;
            }

            if let Some(open) = normalized.find_unquoted(SECTION_OPEN, 0) {
                let closed_here = normalized.find_unquoted(SECTION_CLOSE, open).is_some();
                if !closed_here && !self.close_follows() {
                    return self.fail(line, normalized.text);
                }
            }

            match normalized.text.split_once('=') {
                Some((key, value)) => {
                    return Some(Ok((
                        line,
                        Token::Pair {
                            key: fold(key),
                            value: value.to_string(),
                        },
                    )));
                }
                None => warn!(line, fragment = %normalized.text, "ignoring line without '='"),
            }
        }
    }
}

/// Parse one source into a fresh mapping.
pub fn parse(content: &str) -> Result<ConfigMapping, FormatError> {
    let mut mapping = ConfigMapping::new();
    let mut current: Option<String> = None;

    for token in tokens(content) {
        let (line, token) = token?;
        match token {
            Token::Section(name) => {
                mapping.ensure_section(&name);
                current = Some(name);
            }
            Token::Pair { key, value } => match &current {
                Some(section) => mapping.set(section, &key, value),
                None => warn!(line, option = %key, "ignoring option outside any section"),
            },
        }
    }

    Ok(mapping)
}

/// Parse one source and merge it into `mapping`.
///
/// On error `mapping` is left as it was.
pub fn parse_into(mapping: &mut ConfigMapping, content: &str) -> Result<(), FormatError> {
    let parsed = parse(content)?;
    mapping.merge(parsed);
    Ok(())
}
