//! Symbol table
//!
//! Flat mapping from a declared name to its most recent definition. Entries
//! are overwritten on re-definition and never removed.

use std::collections::HashMap;

use tracing::trace;

use crate::parser::ast::{Expr, Stmt};

/// Call targets accepted without a definition or an arity check
pub const BUILTINS: &[&str] = &["print"];

/// Definition recorded for a name
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// Current bound value of a variable
    Variable(Expr),
    /// Variable bound to a class instantiation
    Instance {
        class_name: String,
        arguments: Vec<Expr>,
    },
    Function {
        params: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Class {
        parent: Option<String>,
        body: Vec<Stmt>,
    },
}

impl Symbol {
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Variable(_) => "variable",
            Symbol::Instance { .. } => "instance",
            Symbol::Function { .. } => "function",
            Symbol::Class { .. } => "class",
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Symbol::Function { .. })
    }

    /// Whether the receiver `self` is among the parameters
    pub fn takes_receiver(&self) -> bool {
        matches!(self, Symbol::Function { params, .. } if params.iter().any(Expr::is_receiver))
    }

    /// Number of arguments a call has to pass. A receiver parameter is
    /// supplied implicitly, so it does not count.
    pub fn expected_arguments(&self) -> Option<usize> {
        match self {
            Symbol::Function { params, .. } if self.takes_receiver() => Some(params.len() - 1),
            Symbol::Function { params, .. } => Some(params.len()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the definition of `name`
    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        let name = name.into();
        trace!(name = %name, kind = symbol.kind(), "define symbol");
        self.symbols.insert(name, symbol);
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entries sorted by name
    pub fn entries(&self) -> Vec<(&String, &Symbol)> {
        let mut entries: Vec<_> = self.symbols.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
