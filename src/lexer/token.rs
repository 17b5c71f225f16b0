//! Token definitions for the Pyrite language
//!
//! This module defines all token types produced by lexical analysis.

use crate::error::SourceLocation;
use std::fmt;

/// A token in the Pyrite language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// The exact matched text. `Indent` and `Dedent` carry the indentation
    /// level instead.
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: String, location: SourceLocation) -> Self {
        Self {
            token_type,
            lexeme,
            location,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

/// Token types in the Pyrite language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Keyword(Keyword),

    // Identifiers
    ClassIdentifier,
    Identifier,

    // Literals
    Number,
    String,

    // Assignment
    Walrus, // :=
    Assign, // =

    // Comparison
    Equals,       // ==
    NotEquals,    // !=
    GreaterEqual, // >=
    Greater,      // >
    LessEqual,    // <=
    Less,         // <

    // Arithmetic
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    Dot,          // .
    Comma,        // ,
    Colon,        // :
    Backslash,    // \

    // Block structure
    Indent,
    Dedent,

    Eof,
}

impl TokenType {
    /// Interchange name of the token kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyword(kw) => kw.name(),
            Self::ClassIdentifier => "CLASS_IDENTIFIER",
            Self::Identifier => "IDENTIFIER",
            Self::Number => "NUMBER",
            Self::String => "STRING",
            Self::Walrus => "WALRUS",
            Self::Assign => "ASSIGN",
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::GreaterEqual => "GREATER_THAN_EQUAL",
            Self::Greater => "GREATER_THAN",
            Self::LessEqual => "LESS_THAN_EQUAL",
            Self::Less => "LESS_THAN",
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::LeftParen => "LEFT_PAREN",
            Self::RightParen => "RIGHT_PAREN",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::Dot => "DOT",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::Backslash => "SLASH",
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::Eof => "EOF",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equals
                | Self::NotEquals
                | Self::GreaterEqual
                | Self::Greater
                | Self::LessEqual
                | Self::Less
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::Keyword(Keyword::And) | Self::Keyword(Keyword::Or))
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keywords in the Pyrite language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Control flow
    If,
    Elif,
    Else,
    For,
    In,
    While,

    // Definitions
    Class,
    Def,
    Return,
    Pass,

    // Modules
    Import,
    As,

    // Constants
    True,
    False,
    None,

    // Logical operators
    And,
    Or,
    Not,
}

impl Keyword {
    /// Every keyword, in lexical rule order
    pub const ALL: [Keyword; 18] = [
        Self::If,
        Self::Elif,
        Self::Else,
        Self::For,
        Self::In,
        Self::While,
        Self::Class,
        Self::Def,
        Self::Return,
        Self::Import,
        Self::As,
        Self::True,
        Self::False,
        Self::None,
        Self::Pass,
        Self::And,
        Self::Or,
        Self::Not,
    ];

    /// Get keyword from string
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kw| kw.as_str() == s)
    }

    /// Get source spelling of keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::For => "for",
            Self::In => "in",
            Self::While => "while",
            Self::Class => "class",
            Self::Def => "def",
            Self::Return => "return",
            Self::Pass => "pass",
            Self::Import => "import",
            Self::As => "as",
            Self::True => "True",
            Self::False => "False",
            Self::None => "None",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }

    /// Interchange name of the keyword token kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::If => "IF",
            Self::Elif => "ELIF",
            Self::Else => "ELSE",
            Self::For => "FOR",
            Self::In => "IN",
            Self::While => "WHILE",
            Self::Class => "CLASS",
            Self::Def => "DEF",
            Self::Return => "RETURN",
            Self::Pass => "PASS",
            Self::Import => "IMPORT",
            Self::As => "AS",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::None => "NONE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
