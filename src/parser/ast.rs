//! Abstract Syntax Tree definitions
//!
//! This module defines the AST node types for the Pyrite language. Trees are
//! strictly owned top-down: no sharing, no back-references.

use std::fmt;

use crate::lexer::{Keyword, TokenType};

/// Name of the implicit method receiver
pub const RECEIVER: &str = "self";

/// Root AST node representing a complete program
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// import numpy as np
    Import { module: Expr },

    /// Plain or bound assignment: x = 1, self.x = y + 1
    Assign { target: Expr, value: Expr },

    /// Class instantiation: t = Test(10)
    ClassAssign {
        target: Expr,
        class_name: String,
        arguments: Vec<Expr>,
    },

    /// Attribute chain used as a statement: t.run(1)
    AttributeAccess { receiver: Expr, chain: Vec<Expr> },

    /// Call statement: print(x)
    Call(Call),

    If { condition: Expr, body: Vec<Stmt> },

    Elif { condition: Expr, body: Vec<Stmt> },

    Else { body: Vec<Stmt> },

    For {
        variable: Expr,
        iterable: Expr,
        body: Vec<Stmt>,
    },

    While { condition: Expr, body: Vec<Stmt> },

    /// Class declaration with at most one parent
    ClassDecl {
        name: String,
        parent: Option<String>,
        body: Vec<Stmt>,
    },

    FunctionDef {
        name: String,
        params: Vec<Expr>,
        body: Vec<Stmt>,
    },

    Return { value: Expr },

    Pass,
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(String),

    /// String literal, quotes included
    Str(String),

    Constant(Constant),

    Identifier(String),

    /// Member of the method receiver: `self.<member>`
    BoundIdentifier(String),

    /// The bare method receiver `self`
    Receiver,

    ClassIdentifier(String),

    /// Arithmetic operation. The right operand is always a single factor.
    Binary {
        operator: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Comparison {
        operator: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// One level of logical chaining; the left side is always a comparison
    Logical {
        operator: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// receiver.a.b(...)
    AttributeAccess {
        receiver: Box<Expr>,
        chain: Vec<Expr>,
    },

    Call(Call),

    /// target as alias
    Alias {
        target: Box<Expr>,
        alias: Box<Expr>,
    },
}

impl Expr {
    /// Symbol-table name of a terminal, if it has one
    pub fn name(&self) -> Option<String> {
        match self {
            Expr::Identifier(name) | Expr::ClassIdentifier(name) => Some(name.clone()),
            Expr::BoundIdentifier(member) => Some(format!("{}.{}", RECEIVER, member)),
            Expr::Receiver => Some(RECEIVER.to_string()),
            _ => None,
        }
    }

    pub fn is_receiver(&self) -> bool {
        matches!(self, Expr::Receiver)
    }
}

/// Function or method invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

impl Call {
    pub fn new(callee: Expr, arguments: Vec<Expr>) -> Self {
        Self {
            callee: Box::new(callee),
            arguments,
        }
    }

    /// Name the call is written with, e.g. `print` or `self.update`. The
    /// parser only builds calls on named callees.
    pub fn name(&self) -> String {
        self.callee.name().unwrap_or_default()
    }

    /// Name the call resolves against. A receiver-bound call resolves to the
    /// method it names.
    pub fn target(&self) -> String {
        match self.callee.as_ref() {
            Expr::BoundIdentifier(member) => member.clone(),
            _ => self.name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    None,
    True,
    False,
}

impl Constant {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::None => Some(Self::None),
            Keyword::True => Some(Self::True),
            Keyword::False => Some(Self::False),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::True => "True",
            Self::False => "False",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn from_token(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Add => Some(Self::Add),
            TokenType::Subtract => Some(Self::Subtract),
            TokenType::Multiply => Some(Self::Multiply),
            TokenType::Divide => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl ComparisonOp {
    pub fn from_token(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Equals => Some(Self::Equal),
            TokenType::NotEquals => Some(Self::NotEqual),
            TokenType::Greater => Some(Self::Greater),
            TokenType::GreaterEqual => Some(Self::GreaterEqual),
            TokenType::Less => Some(Self::Less),
            TokenType::LessEqual => Some(Self::LessEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn from_token(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Keyword(Keyword::And) => Some(Self::And),
            TokenType::Keyword(Keyword::Or) => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Constant, ArithmeticOp, ComparisonOp, LogicalOp);
