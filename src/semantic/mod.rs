//! Semantic analysis module
//!
//! This module handles semantic validation of the AST.

pub mod analyzer;
pub mod symbols;

pub use analyzer::{Analysis, SemanticAnalyzer};
pub use symbols::{Symbol, SymbolTable, BUILTINS};
