//! Lexical analysis module
//!
//! This module handles tokenization of Pyrite source code.

pub mod scanner;
pub mod token;

pub use scanner::{Lexer, INDENT_WIDTH, TAB_WIDTH};
pub use token::{Keyword, Token, TokenType};
