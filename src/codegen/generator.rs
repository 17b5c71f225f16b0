//! Code generator
//!
//! Renders an analyzed program back to source text, one template per node
//! kind. Block structure is carried by the header lines and blank-line
//! separators only.

use tracing::debug;

use crate::parser::ast::{Call, Expr, Program, Stmt};

pub struct CodeGenerator {
    /// Set when the last rendered call already emitted its trailing blank
    /// line, so the enclosing statement must not add another.
    last_was_call: bool,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            last_was_call: false,
        }
    }

    pub fn generate(&mut self, program: &Program) -> String {
        let output = self.generate_block(&program.statements);
        debug!(bytes = output.len(), "generated output");
        output
    }

    fn generate_block(&mut self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.generate_stmt(stmt))
            .collect()
    }

    fn generate_stmt(&mut self, stmt: &Stmt) -> String {
        self.last_was_call = false;

        match stmt {
            Stmt::Import { module } => format!("import {}\n\n", self.generate_expr(module, false)),

            Stmt::Assign { target, value } => {
                let target = self.generate_expr(target, false);
                let value = self.generate_expr(value, true);
                self.terminate(format!("{} = {}", target, value))
            }

            Stmt::ClassAssign {
                target,
                class_name,
                arguments,
            } => format!(
                "{} = {}({})\n\n",
                self.generate_expr(target, false),
                class_name,
                self.generate_list(arguments)
            ),

            Stmt::AttributeAccess { receiver, chain } => {
                let access = self.generate_access(receiver, chain, true);
                self.terminate(access)
            }

            Stmt::Call(call) => self.generate_call(call, true),

            Stmt::If { condition, body } => {
                let condition = self.generate_expr(condition, false);
                format!("if {}:\n\n{}", condition, self.generate_block(body))
            }

            Stmt::Elif { condition, body } => {
                let condition = self.generate_expr(condition, false);
                format!("elif {}:\n\n{}", condition, self.generate_block(body))
            }

            Stmt::Else { body } => format!("else:\n\n{}", self.generate_block(body)),

            Stmt::For {
                variable,
                iterable,
                body,
            } => {
                let variable = self.generate_expr(variable, false);
                let iterable = self.generate_expr(iterable, false);
                format!(
                    "for {} in {}:\n\n{}",
                    variable,
                    iterable,
                    self.generate_block(body)
                )
            }

            Stmt::While { condition, body } => {
                let condition = self.generate_expr(condition, false);
                format!("while {}:\n\n{}", condition, self.generate_block(body))
            }

            Stmt::ClassDecl { name, parent, body } => {
                let body = self.generate_block(body);
                match parent {
                    Some(parent) => format!("class {}({}):\n\n{}", name, parent, body),
                    None => format!("class {}:\n\n{}", name, body),
                }
            }

            Stmt::FunctionDef { name, params, body } => {
                let params = self.generate_list(params);
                format!("def {}({}):\n\n{}", name, params, self.generate_block(body))
            }

            Stmt::Return { value } => format!("return {}\n\n", self.generate_expr(value, false)),

            Stmt::Pass => "pass\n\n".to_string(),
        }
    }

    /// Close a simple statement with a blank line unless a trailing call
    /// already did. Reading the flag clears it.
    fn terminate(&mut self, text: String) -> String {
        if std::mem::take(&mut self.last_was_call) {
            text
        } else {
            text + "\n\n"
        }
    }

    /// `tail` marks the expression that ends a statement; only a call in that
    /// position carries the statement's blank line.
    fn generate_expr(&mut self, expr: &Expr, tail: bool) -> String {
        match expr {
            Expr::Number(text)
            | Expr::Str(text)
            | Expr::Identifier(text)
            | Expr::ClassIdentifier(text) => text.clone(),
            Expr::BoundIdentifier(_) | Expr::Receiver => expr.name().unwrap_or_default(),
            Expr::Constant(constant) => constant.to_string(),

            Expr::Binary {
                operator,
                left,
                right,
            } => self.generate_operation(left, operator.as_str(), right),
            Expr::Comparison {
                operator,
                left,
                right,
            } => self.generate_operation(left, operator.as_str(), right),
            Expr::Logical {
                operator,
                left,
                right,
            } => self.generate_operation(left, operator.as_str(), right),

            Expr::AttributeAccess { receiver, chain } => {
                self.generate_access(receiver, chain, tail)
            }

            Expr::Call(call) => self.generate_call(call, tail),

            Expr::Alias { target, alias } => format!(
                "{} as {}",
                self.generate_expr(target, false),
                self.generate_expr(alias, false)
            ),
        }
    }

    fn generate_operation(&mut self, left: &Expr, operator: &str, right: &Expr) -> String {
        let left = self.generate_expr(left, false);
        let right = self.generate_expr(right, false);
        format!("{} {} {}", left, operator, right)
    }

    fn generate_access(&mut self, receiver: &Expr, chain: &[Expr], tail: bool) -> String {
        let mut parts = vec![self.generate_expr(receiver, false)];
        for (i, member) in chain.iter().enumerate() {
            parts.push(self.generate_expr(member, tail && i + 1 == chain.len()));
        }
        parts.join(".")
    }

    fn generate_call(&mut self, call: &Call, tail: bool) -> String {
        let text = format!(
            "{}({})",
            self.generate_expr(&call.callee, false),
            self.generate_list(&call.arguments)
        );

        if tail {
            self.last_was_call = true;
            text + "\n\n"
        } else {
            text
        }
    }

    fn generate_list(&mut self, items: &[Expr]) -> String {
        items
            .iter()
            .map(|item| self.generate_expr(item, false))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
