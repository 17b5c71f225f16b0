//! Diagnostic rendering
//!
//! Turns a `PyriteError` into a colored report. With the source text at hand
//! the report quotes the offending line with a caret under the column.
//! Semantic errors carry no location, so their line is recovered by searching
//! the source for the first call of the identifier they name.

use colored::Colorize;
use regex::Regex;

use super::{PyriteError, SourceLocation};
use crate::lexer::TAB_WIDTH;

/// An error prepared for display
pub struct Diagnostic {
    error: PyriteError,
    source: Option<String>,
}

impl Diagnostic {
    pub fn new(error: PyriteError) -> Self {
        Self {
            error,
            source: None,
        }
    }

    /// Create a diagnostic that quotes the source it was raised on
    pub fn with_source(error: PyriteError, source: &str) -> Self {
        Self {
            error,
            source: Some(source.to_string()),
        }
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{}: {}\n",
            self.error.kind().red().bold(),
            self.error.message()
        );

        let location = match &self.error {
            PyriteError::SemanticError { identifier, .. } => {
                output.push_str(&format!(
                    "  {} `{}`\n",
                    "identifier:".blue().bold(),
                    identifier
                ));
                self.source
                    .as_deref()
                    .and_then(|source| locate_call(source, identifier))
            }
            _ => self.error.location().cloned(),
        };

        if let Some(location) = location {
            output.push_str(&format!("  {} {}\n", "-->".blue().bold(), location));
            if let Some(source) = &self.source {
                output.push_str(&source_context(source, &location));
            }
        }

        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Quote the line at `location` between its neighbours. A location past the
/// last line (end of input) points just after the last non-blank line.
fn source_context(source: &str, location: &SourceLocation) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let Some(last) = lines.iter().rposition(|line| !line.trim().is_empty()) else {
        return String::new();
    };
    if location.line == 0 {
        return String::new();
    }

    let (index, column) = if location.line > last + 1 {
        (last, lines[last].chars().count() + 1)
    } else {
        (location.line - 1, location.column)
    };

    let width = (index + 2).to_string().len();
    let mut output = String::new();

    if index > 0 {
        output.push_str(&gutter_line(index, width, lines[index - 1], false));
    }
    output.push_str(&gutter_line(index + 1, width, lines[index], true));

    let padding = " ".repeat(width + 3 + display_width(lines[index], column));
    output.push_str(&format!("{}{}\n", padding, "^".red().bold()));

    if let Some(next) = lines.get(index + 1) {
        output.push_str(&gutter_line(index + 2, width, next, false));
    }

    output
}

fn gutter_line(number: usize, width: usize, text: &str, current: bool) -> String {
    let number = format!("{:width$}", number, width = width);
    let number = if current {
        number.blue().bold()
    } else {
        number.blue()
    };
    format!("  {} {}\n", number, expand_tabs(text))
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Printed width of the text before `column`. The lexer counts a tab as one
/// column; it prints as `TAB_WIDTH` spaces.
fn display_width(text: &str, column: usize) -> usize {
    text.chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// First line calling `identifier`, skipping `def` headers
fn locate_call(source: &str, identifier: &str) -> Option<SourceLocation> {
    let pattern = Regex::new(&format!(r"\b{}\s*\(", regex::escape(identifier))).ok()?;

    source.lines().enumerate().find_map(|(i, line)| {
        if line.trim_start().starts_with("def ") {
            return None;
        }
        pattern.find(line).map(|m| {
            SourceLocation::at(i + 1, line[..m.start()].chars().count() + 1)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn caret_padding(formatted: &str) -> usize {
        let caret = formatted
            .lines()
            .find(|line| line.contains('^'))
            .expect("caret line");
        caret.len() - caret.trim_start().len()
    }

    #[test]
    fn test_diagnostic_without_source() {
        let err = PyriteError::lexical_error("no rule matches '@'", SourceLocation::at(1, 1));
        let formatted = Diagnostic::new(err).format();

        assert!(formatted.contains("Lexical Error"));
        assert!(formatted.contains("no rule matches '@'"));
        assert!(!formatted.contains('^'));
    }

    #[test]
    fn test_caret_under_column() {
        let source = "x = 1\ny = @\nz = 3";
        let err = PyriteError::lexical_error("no rule matches '@'", SourceLocation::at(2, 5));
        let formatted = Diagnostic::with_source(err, source).format();

        assert!(formatted.contains("x = 1"));
        assert!(formatted.contains("y = @"));
        assert!(formatted.contains("z = 3"));
        // "  2 " gutter, then four characters before '@'
        assert_eq!(caret_padding(&formatted), 8);
    }

    #[test]
    fn test_caret_on_tab_indented_line() {
        let source = "if x:\n\ty = @\n";
        let err = PyriteError::lexical_error("no rule matches '@'", SourceLocation::at(2, 6));
        let formatted = Diagnostic::with_source(err, source).format();

        assert!(formatted.contains("    y = @"));
        assert!(!formatted.contains('\t'));
        assert_eq!(caret_padding(&formatted), 12);
    }

    #[test]
    fn test_end_of_input_points_after_last_line() {
        let source = "x = 1\ny\n\n";
        let err = PyriteError::syntactic_error("unexpected end of input", SourceLocation::at(4, 1));
        let formatted = Diagnostic::with_source(err, source).format();

        assert!(formatted.contains("y"));
        assert_eq!(caret_padding(&formatted), 5);
    }

    #[test]
    fn test_semantic_diagnostic_locates_call() {
        let source = "def f(a):\n    return a\nx = 1\nf(1, 2)\n";
        let err = PyriteError::semantic_error("Invalid number of arguments for function f", "f");
        let formatted = Diagnostic::with_source(err, source).format();

        assert!(formatted.contains("Semantic Error"));
        assert!(formatted.contains("`f`"));
        assert!(formatted.contains("4:1"));
        assert!(formatted.contains("f(1, 2)"));
        assert_eq!(caret_padding(&formatted), 4);
    }

    #[test]
    fn test_locate_method_call() {
        assert_eq!(
            locate_call("t = T()\nt.m(1)\n", "m"),
            Some(SourceLocation::at(2, 3))
        );
        assert_eq!(locate_call("def g():\n    pass\n", "g"), None);
    }

    #[test]
    fn test_semantic_diagnostic_without_match() {
        let err = PyriteError::semantic_error("Undefined function: area", "area");
        let formatted = Diagnostic::with_source(err, "x = 1").format();

        assert!(formatted.contains("`area`"));
        assert!(!formatted.contains("-->"));
    }
}
