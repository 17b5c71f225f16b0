//! Semantic analyzer
//!
//! A single forward pass over the program. Every node is re-emitted with its
//! children analyzed while definitions are recorded in the symbol table, so a
//! call can only refer to something defined textually before it.

use tracing::{debug, trace};

use super::symbols::{Symbol, SymbolTable, BUILTINS};
use crate::error::{PyriteError, PyriteResult};
use crate::parser::ast::{Call, Expr, Program, Stmt};

/// Analyzed program plus the definitions collected while analyzing it
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub program: Program,
    pub symbols: SymbolTable,
}

pub struct SemanticAnalyzer;

impl SemanticAnalyzer {
    /// Analyze a program against a fresh symbol table
    pub fn analyze(program: Program) -> PyriteResult<Analysis> {
        let mut symbols = SymbolTable::new();
        let program = Self::analyze_with(program, &mut symbols)?;
        Ok(Analysis { program, symbols })
    }

    /// Analyze a program against an existing symbol table
    pub fn analyze_with(program: Program, symbols: &mut SymbolTable) -> PyriteResult<Program> {
        let statements = visit_block(program.statements, symbols)?;
        debug!(
            statements = statements.len(),
            symbols = symbols.len(),
            "analyzed program"
        );
        Ok(Program { statements })
    }
}

fn visit_block(statements: Vec<Stmt>, symbols: &mut SymbolTable) -> PyriteResult<Vec<Stmt>> {
    statements
        .into_iter()
        .map(|stmt| visit_stmt(stmt, symbols))
        .collect()
}

fn visit_exprs(exprs: Vec<Expr>, symbols: &mut SymbolTable) -> PyriteResult<Vec<Expr>> {
    exprs
        .into_iter()
        .map(|expr| visit_expr(expr, symbols))
        .collect()
}

fn visit_stmt(stmt: Stmt, symbols: &mut SymbolTable) -> PyriteResult<Stmt> {
    match stmt {
        Stmt::Import { module } => Ok(Stmt::Import {
            module: visit_expr(module, symbols)?,
        }),

        Stmt::Assign { target, value } => {
            let value = visit_expr(value, symbols)?;
            if let Some(name) = target.name() {
                symbols.define(name, Symbol::Variable(value.clone()));
            }
            Ok(Stmt::Assign { target, value })
        }

        Stmt::ClassAssign {
            target,
            class_name,
            arguments,
        } => {
            let arguments = visit_exprs(arguments, symbols)?;
            if let Some(name) = target.name() {
                symbols.define(
                    name,
                    Symbol::Instance {
                        class_name: class_name.clone(),
                        arguments: arguments.clone(),
                    },
                );
            }
            Ok(Stmt::ClassAssign {
                target,
                class_name,
                arguments,
            })
        }

        Stmt::AttributeAccess { receiver, chain } => Ok(Stmt::AttributeAccess {
            receiver: visit_expr(receiver, symbols)?,
            chain: visit_exprs(chain, symbols)?,
        }),

        Stmt::Call(call) => Ok(Stmt::Call(visit_call(call, symbols)?)),

        Stmt::If { condition, body } => Ok(Stmt::If {
            condition: visit_expr(condition, symbols)?,
            body: visit_block(body, symbols)?,
        }),

        Stmt::Elif { condition, body } => Ok(Stmt::Elif {
            condition: visit_expr(condition, symbols)?,
            body: visit_block(body, symbols)?,
        }),

        Stmt::Else { body } => Ok(Stmt::Else {
            body: visit_block(body, symbols)?,
        }),

        Stmt::For {
            variable,
            iterable,
            body,
        } => Ok(Stmt::For {
            variable,
            iterable: visit_expr(iterable, symbols)?,
            body: visit_block(body, symbols)?,
        }),

        Stmt::While { condition, body } => Ok(Stmt::While {
            condition: visit_expr(condition, symbols)?,
            body: visit_block(body, symbols)?,
        }),

        Stmt::ClassDecl { name, parent, body } => {
            let body = visit_block(body, symbols)?;
            symbols.define(
                name.clone(),
                Symbol::Class {
                    parent: parent.clone(),
                    body: body.clone(),
                },
            );
            Ok(Stmt::ClassDecl { name, parent, body })
        }

        Stmt::FunctionDef { name, params, body } => {
            // Recorded only after the body resolves, so a function cannot
            // call itself.
            let body = visit_block(body, symbols)?;
            symbols.define(
                name.clone(),
                Symbol::Function {
                    params: params.clone(),
                    body: body.clone(),
                },
            );
            Ok(Stmt::FunctionDef { name, params, body })
        }

        Stmt::Return { value } => Ok(Stmt::Return {
            value: visit_expr(value, symbols)?,
        }),

        Stmt::Pass => Ok(Stmt::Pass),
    }
}

fn visit_expr(expr: Expr, symbols: &mut SymbolTable) -> PyriteResult<Expr> {
    match expr {
        Expr::Number(_)
        | Expr::Str(_)
        | Expr::Constant(_)
        | Expr::Identifier(_)
        | Expr::BoundIdentifier(_)
        | Expr::Receiver
        | Expr::ClassIdentifier(_) => Ok(expr),

        Expr::Binary {
            operator,
            left,
            right,
        } => Ok(Expr::Binary {
            operator,
            left: Box::new(visit_expr(*left, symbols)?),
            right: Box::new(visit_expr(*right, symbols)?),
        }),

        Expr::Comparison {
            operator,
            left,
            right,
        } => Ok(Expr::Comparison {
            operator,
            left: Box::new(visit_expr(*left, symbols)?),
            right: Box::new(visit_expr(*right, symbols)?),
        }),

        Expr::Logical {
            operator,
            left,
            right,
        } => Ok(Expr::Logical {
            operator,
            left: Box::new(visit_expr(*left, symbols)?),
            right: Box::new(visit_expr(*right, symbols)?),
        }),

        Expr::AttributeAccess { receiver, chain } => Ok(Expr::AttributeAccess {
            receiver: Box::new(visit_expr(*receiver, symbols)?),
            chain: visit_exprs(chain, symbols)?,
        }),

        Expr::Call(call) => Ok(Expr::Call(visit_call(call, symbols)?)),

        Expr::Alias { target, alias } => Ok(Expr::Alias {
            target: Box::new(visit_expr(*target, symbols)?),
            alias,
        }),
    }
}

/// Validate a call against the definitions seen so far. The call itself is
/// re-emitted unchanged.
fn visit_call(call: Call, symbols: &mut SymbolTable) -> PyriteResult<Call> {
    let Call { callee, arguments } = call;
    let call = Call {
        callee,
        arguments: visit_exprs(arguments, symbols)?,
    };

    let target = call.target();
    if BUILTINS.contains(&target.as_str()) {
        trace!(target = %target, "builtin call");
        return Ok(call);
    }

    match symbols.get(&target) {
        Some(symbol) if symbol.is_function() => {
            let expected = symbol.expected_arguments().unwrap_or_default();
            let given = call.arguments.len();
            if given != expected {
                let what = if symbol.takes_receiver() {
                    "class function"
                } else {
                    "function"
                };
                return Err(PyriteError::semantic_error(
                    format!(
                        "Invalid number of arguments for {} {}: expected {}, got {}",
                        what,
                        call.name(),
                        expected,
                        given
                    ),
                    call.name(),
                ));
            }
            Ok(call)
        }
        Some(Symbol::Class { .. }) => Ok(call),
        _ => Err(PyriteError::semantic_error(
            format!("Undefined function: {}", call.name()),
            call.name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        let tokens = Lexer::new(source, None).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn analyze_source(source: &str) -> PyriteResult<Analysis> {
        SemanticAnalyzer::analyze(parse(source))
    }

    fn semantic_error(source: &str) -> (String, String) {
        match analyze_source(source) {
            Err(PyriteError::SemanticError {
                message,
                identifier,
            }) => (message, identifier),
            other => panic!("expected semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_analysis_preserves_shape() {
        let source = "x = 1\nif x == 1:\n    y = x + 2\nelse:\n    y = 0\nprint(y)\n";
        let program = parse(source);
        let analysis = SemanticAnalyzer::analyze(program.clone()).unwrap();
        assert_eq!(analysis.program, program);
    }

    #[test]
    fn test_assignment_records_value() {
        let analysis = analyze_source("x = 1\nx = y - 1\n").unwrap();
        assert_eq!(analysis.symbols.len(), 1);
        assert!(matches!(
            analysis.symbols.get("x"),
            Some(Symbol::Variable(Expr::Binary { .. }))
        ));
    }

    #[test]
    fn test_definitions_are_recorded() {
        let source = "class A(B):\n    def m(self):\n        return 1\nt = A()\n";
        let analysis = analyze_source(source).unwrap();

        assert_eq!(
            analysis.symbols.get("A").map(Symbol::kind),
            Some("class")
        );
        assert_eq!(
            analysis.symbols.get("m").and_then(Symbol::expected_arguments),
            Some(0)
        );
        assert_eq!(
            analysis.symbols.get("t"),
            Some(&Symbol::Instance {
                class_name: "A".to_string(),
                arguments: vec![],
            })
        );
    }

    #[test]
    fn test_bound_assignment_records_qualified_name() {
        let source = "class A():\n    def set(self, v):\n        self.v = v\n";
        let analysis = analyze_source(source).unwrap();
        assert!(analysis.symbols.contains("self.v"));
    }

    #[test]
    fn test_call_with_matching_arity() {
        assert!(analyze_source("def f(a, b):\n    return a\nf(1, 2)\n").is_ok());
    }

    #[test]
    fn test_call_with_too_few_or_too_many_arguments() {
        let (message, identifier) = semantic_error("def f(a, b):\n    return a\nf(1)\n");
        assert!(message.contains("Invalid number of arguments"));
        assert_eq!(identifier, "f");

        let (message, _) = semantic_error("def f(a, b):\n    return a\nf(1, 2, 3)\n");
        assert!(message.contains("expected 2, got 3"));
    }

    #[test]
    fn test_method_arity_excludes_receiver() {
        let source = "class T():\n    def m(self, y):\n        return y\nt = T()\na = t.m(12)\n";
        assert!(analyze_source(source).is_ok());

        let source = "class T():\n    def m(self, y):\n        return y\nt = T()\na = t.m(1, 2)\n";
        let (message, identifier) = semantic_error(source);
        assert!(message.contains("class function"));
        assert_eq!(identifier, "m");
    }

    #[test]
    fn test_bound_call_resolves_method() {
        let source = "class T():\n    def a(self):\n        return 1\n    def b(self):\n        self.a()\n";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_undefined_function() {
        let (message, identifier) = semantic_error("area(1)\n");
        assert_eq!(message, "Undefined function: area");
        assert_eq!(identifier, "area");
    }

    #[test]
    fn test_definition_after_use_is_undefined() {
        let (message, _) = semantic_error("f(1)\ndef f(x):\n    return x\n");
        assert!(message.contains("Undefined function: f"));
    }

    #[test]
    fn test_print_accepts_any_argument_count() {
        assert!(analyze_source("print()\nprint(1)\nprint(1, \"a\", x)\n").is_ok());
    }

    #[test]
    fn test_calls_inside_expressions_are_checked() {
        let (_, identifier) = semantic_error("if x == g(1):\n    pass\n");
        assert_eq!(identifier, "g");

        let (_, identifier) = semantic_error("x = t.missing()\n");
        assert_eq!(identifier, "missing");
    }

    #[test]
    fn test_variable_is_not_callable() {
        let (message, _) = semantic_error("x = 1\nx()\n");
        assert!(message.contains("Undefined function: x"));
    }

    #[test]
    fn test_class_call_is_accepted() {
        assert!(analyze_source("class P():\n    pass\nx = a.P(1)\n").is_ok());
    }

    #[test]
    fn test_recursive_call_is_undefined() {
        let source = "def fact(n):\n    if n == 0:\n        return 1\n    return fact(n)\n";
        assert_eq!(
            semantic_error(source),
            ("Undefined function: fact".to_string(), "fact".to_string())
        );
    }

    #[test]
    fn test_function_body_is_recorded() {
        let source = "def fact(n):\n    if n == 0:\n        return 1\n    return n\n";
        let analysis = analyze_source(source).unwrap();
        match analysis.symbols.get("fact") {
            Some(Symbol::Function { body, .. }) => assert_eq!(body.len(), 2),
            other => panic!("expected function symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_with_existing_table() {
        let mut symbols = SymbolTable::new();
        SemanticAnalyzer::analyze_with(parse("def f():\n    pass\n"), &mut symbols).unwrap();
        assert!(SemanticAnalyzer::analyze_with(parse("f()\n"), &mut symbols).is_ok());
    }
}
