//! Lexer/Scanner implementation for the Pyrite language
//!
//! Tokenization is line-oriented. Each physical line first has its
//! indentation measured against the indentation stack (emitting `Indent` and
//! `Dedent` tokens), then the rest of the line is consumed by an ordered table
//! of lexical rules where the first matching rule wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::token::{Keyword, Token, TokenType};
use crate::error::{PyriteError, PyriteResult, SourceLocation};

/// Width of one indentation level
pub const INDENT_WIDTH: usize = 4;

/// Width a tab contributes to the indentation of a line
pub const TAB_WIDTH: usize = 4;

/// One entry of the ordered rule table. A rule without a token type matches
/// text that is consumed silently.
struct LexRule {
    pattern: Regex,
    token_type: Option<TokenType>,
}

impl LexRule {
    fn new(pattern: &str, token_type: Option<TokenType>) -> Self {
        Self {
            pattern: Regex::new(&format!("^(?:{})", pattern)).expect("lexical rule is a valid regex"),
            token_type,
        }
    }
}

/// Keywords come before identifiers, capitalized identifiers before plain
/// ones, and multi-character operators before their single-character prefixes.
static RULES: LazyLock<Vec<LexRule>> = LazyLock::new(|| {
    let mut rules: Vec<LexRule> = Keyword::ALL
        .iter()
        .map(|kw| {
            LexRule::new(
                &format!(r"\b{}\b", kw.as_str()),
                Some(TokenType::Keyword(*kw)),
            )
        })
        .collect();

    let symbols: [(&str, Option<TokenType>); 27] = [
        (r"\b[A-Z][A-Za-z0-9_]*\b", Some(TokenType::ClassIdentifier)),
        (r"\b[a-z_][a-z0-9_]*\b", Some(TokenType::Identifier)),
        (r":=", Some(TokenType::Walrus)),
        (r"==", Some(TokenType::Equals)),
        (r"=", Some(TokenType::Assign)),
        (r"!=", Some(TokenType::NotEquals)),
        (r">=", Some(TokenType::GreaterEqual)),
        (r">", Some(TokenType::Greater)),
        (r"<=", Some(TokenType::LessEqual)),
        (r"<", Some(TokenType::Less)),
        (r"[0-9]+", Some(TokenType::Number)),
        (r#"".*?""#, Some(TokenType::String)),
        (r"\+", Some(TokenType::Add)),
        (r"-", Some(TokenType::Subtract)),
        (r"\*", Some(TokenType::Multiply)),
        (r"/", Some(TokenType::Divide)),
        (r"\(", Some(TokenType::LeftParen)),
        (r"\)", Some(TokenType::RightParen)),
        (r"\[", Some(TokenType::LeftBracket)),
        (r"\]", Some(TokenType::RightBracket)),
        (r"\{", Some(TokenType::LeftBrace)),
        (r"\}", Some(TokenType::RightBrace)),
        (r"\.", Some(TokenType::Dot)),
        (r",", Some(TokenType::Comma)),
        (r":", Some(TokenType::Colon)),
        (r"\\", Some(TokenType::Backslash)),
        (r"\s+", None),
    ];

    rules.extend(
        symbols
            .into_iter()
            .map(|(pattern, token_type)| LexRule::new(pattern, token_type)),
    );
    rules
});

/// Lexer for Pyrite source code. Single use: one lexer tokenizes one source text.
pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    line: usize,
    indent_stack: Vec<usize>,
    filename: Option<String>,
    /// Line and column just past the last emitted token
    end: (usize, usize),
}

impl Lexer {
    /// Create a new lexer
    pub fn new(source: &str, filename: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            tokens: Vec::new(),
            line: 1,
            indent_stack: vec![0],
            filename: filename.map(|s| s.to_string()),
            end: (1, 1),
        }
    }

    /// Tokenize the source code
    ///
    /// Open blocks are closed at end of input, so a well-formed program always
    /// produces balanced `Indent`/`Dedent` pairs followed by `Eof`. Those
    /// closing tokens sit right after the last real token, so errors at end of
    /// input point into the source.
    pub fn tokenize(&mut self) -> PyriteResult<Vec<Token>> {
        let source = std::mem::take(&mut self.source);

        for text in source.lines() {
            self.process_line(text)?;
            self.line += 1;
        }
        let lines = self.line - 1;

        let (line, column) = self.end;
        self.line = line;
        self.dedent_to(0, column)?;
        self.tokens.push(Token::new(
            TokenType::Eof,
            String::new(),
            self.location(column),
        ));

        debug!(tokens = self.tokens.len(), lines, "tokenized source");
        Ok(std::mem::take(&mut self.tokens))
    }

    fn process_line(&mut self, text: &str) -> PyriteResult<()> {
        if is_blank(text) || is_comment(text) {
            trace!(line = self.line, "skipping blank or comment line");
            return Ok(());
        }

        let (width, prefix_chars) = indentation_width(text);
        self.handle_indentation(width, text)?;

        let mut column = prefix_chars + 1;
        let mut rest = text.trim_start();

        while !rest.is_empty() {
            let Some((rule, len)) = RULES.iter().find_map(|rule| {
                rule.pattern
                    .find(rest)
                    .filter(|m| m.end() > 0)
                    .map(|m| (rule, m.end()))
            }) else {
                return Err(PyriteError::lexical_error(
                    format!("Invalid syntax in line {}: {}", self.line, rest),
                    self.location(column),
                ));
            };

            let lexeme = &rest[..len];
            if let Some(token_type) = rule.token_type {
                trace!(line = self.line, column, kind = %token_type, lexeme, "token");
                self.tokens.push(Token::new(
                    token_type,
                    lexeme.to_string(),
                    self.location(column),
                ));
            }

            column += lexeme.chars().count();
            if rule.token_type.is_some() {
                self.end = (self.line, column);
            }
            rest = &rest[len..];
        }

        Ok(())
    }

    fn handle_indentation(&mut self, width: usize, text: &str) -> PyriteResult<()> {
        if width % INDENT_WIDTH != 0 {
            return Err(PyriteError::lexical_error(
                format!("Invalid indentation in line {}: {}", self.line, text.trim()),
                self.location(1),
            ));
        }

        let level = width / INDENT_WIDTH;
        let current = self.current_level();

        if level > current {
            self.indent_stack.push(level);
            self.tokens.push(Token::new(
                TokenType::Indent,
                level.to_string(),
                self.location(1),
            ));
        } else if level < current {
            self.dedent_to(level, 1)?;
        }

        Ok(())
    }

    /// Pop the indentation stack down to `level`, emitting one `Dedent` per
    /// popped level. The level has to be one that an enclosing block opened.
    fn dedent_to(&mut self, level: usize, column: usize) -> PyriteResult<()> {
        while self.current_level() > level {
            let closed = self.current_level();
            self.tokens.push(Token::new(
                TokenType::Dedent,
                closed.to_string(),
                self.location(column),
            ));
            self.indent_stack.pop();
        }

        if self.current_level() != level {
            return Err(PyriteError::lexical_error(
                format!(
                    "Inconsistent dedent in line {}: level {} does not match any enclosing block",
                    self.line, level
                ),
                self.location(column),
            ));
        }

        Ok(())
    }

    fn current_level(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    fn location(&self, column: usize) -> SourceLocation {
        SourceLocation::new(self.line, column, self.filename.clone())
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn is_comment(text: &str) -> bool {
    text.trim_start().starts_with('#')
}

/// Indentation width of a line, plus the number of whitespace characters that
/// make it up. Spaces count one, tabs count `TAB_WIDTH`.
fn indentation_width(text: &str) -> (usize, usize) {
    let mut width = 0;
    let mut chars = 0;

    for c in text.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH,
            _ => break,
        }
        chars += 1;
    }

    (width, chars)
}
