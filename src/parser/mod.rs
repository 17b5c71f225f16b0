//! Parser module
//!
//! This module handles parsing tokens into an Abstract Syntax Tree (AST).

pub mod ast;
pub mod context;
pub mod parser;

pub use ast::{Call, Expr, Program, Stmt};
pub use parser::Parser;
