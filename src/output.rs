//! Terminal output for the `grprefs` binary.

use std::io::{self, IsTerminal};
use std::path::Path;

use similar::{ChangeTag, TextDiff};

use crate::mapping::ConfigMapping;

/// Highlight applied to a piece of terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Error,
    Warning,
    Saved,
    Header,
}

impl Style {
    fn sgr(self) -> &'static str {
        match self {
            Style::Error => "\x1b[1;31m",
            Style::Warning => "\x1b[1;33m",
            Style::Saved => "\x1b[32m",
            Style::Header => "\x1b[36m",
        }
    }
}

/// Whether stdout output should be highlighted.
///
/// `--no-color` beats `--color`, which beats `NO_COLOR`, which beats TTY
/// detection.
pub fn use_colors(force: bool, disable: bool) -> bool {
    let env_allows = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
    !disable && (force || env_allows)
}

#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    colors: bool,
}

impl OutputContext {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// `text` wrapped in the escape codes for `style`, or as-is without colors.
    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.colors {
            format!("{}{text}\x1b[0m", style.sgr())
        } else {
            text.to_string()
        }
    }
}

/// Print the mapping as config text, headers highlighted when colors are on.
///
/// Without colors the output is exactly [`ConfigMapping::to_text`].
pub fn print_mapping(mapping: &ConfigMapping, ctx: &OutputContext) {
    for line in mapping.to_text().lines() {
        if line.starts_with('[') {
            println!("{}", ctx.paint(Style::Header, line));
        } else {
            println!("{line}");
        }
    }
}

pub fn print_files(files: &[impl AsRef<Path>]) {
    for file in files {
        println!("{}", file.as_ref().display());
    }
}

pub fn print_saved(path: &Path, ctx: &OutputContext) {
    eprintln!("{} {}", ctx.paint(Style::Saved, "Saved:"), path.display());
}

pub fn print_warning(message: &str, ctx: &OutputContext) {
    eprintln!("{} {message}", ctx.paint(Style::Warning, "Warning:"));
}

pub fn print_error(message: &str, ctx: &OutputContext) {
    eprintln!("{} {message}", ctx.paint(Style::Error, "Error:"));
}

/// Unified diff of `original` → `updated`, empty when they are equal.
pub fn unified_diff(label: &str, original: &str, updated: &str) -> String {
    let diff = TextDiff::from_lines(original, updated);
    let groups = diff.grouped_ops(3);
    if groups.is_empty() {
        return String::new();
    }

    let mut out = format!("--- {label}\n+++ {label}\n");
    for (idx, group) in groups.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                out.push(sign);
                out.push_str(change.value());
                if change.missing_newline() {
                    out.push('\n');
                }
            }
        }
    }
    out
}

pub fn print_diff(label: &str, original: &str, updated: &str) {
    print!("{}", unified_diff(label, original, updated));
}
