//! Code generation module
//!
//! This module turns an analyzed AST into output source text.

pub mod generator;

pub use generator::CodeGenerator;
