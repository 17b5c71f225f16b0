//! Parser implementation
//!
//! Recursive descent over the token stream with one token of lookahead
//! (two for telling a class instantiation apart from a class expression).

use tracing::debug;

use super::ast::*;
use super::context::{ContextStack, FrameKind};
use crate::error::{PyriteError, PyriteResult, SourceLocation};
use crate::lexer::{Keyword, Token, TokenType};

/// Parser for Pyrite source code
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    context: ContextStack,
}

impl Parser {
    /// Create a new parser from tokens
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.token_type == TokenType::Eof) {
            let location = tokens
                .last()
                .map(|t| t.location.clone())
                .unwrap_or_else(|| SourceLocation::at(1, 1));
            tokens.push(Token::new(TokenType::Eof, String::new(), location));
        }

        Self {
            tokens,
            current: 0,
            context: ContextStack::new(),
        }
    }

    /// Parse tokens into a program. The token stream has to be consumed exactly.
    pub fn parse(&mut self) -> PyriteResult<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.block_statement()?);
        }

        self.consume(TokenType::Eof)?;
        debug!(statements = statements.len(), "parsed program");

        Ok(Program { statements })
    }

    // ===== Statements =====

    /// Parse one statement of the current block and track whether it keeps an
    /// `if` chain open for a following `elif`/`else`.
    fn block_statement(&mut self) -> PyriteResult<Stmt> {
        let stmt = self.statement()?;
        self.context
            .set_if_chain(matches!(stmt, Stmt::If { .. } | Stmt::Elif { .. }));
        Ok(stmt)
    }

    fn statement(&mut self) -> PyriteResult<Stmt> {
        let token_type = self.peek().token_type;
        match token_type {
            TokenType::Identifier => self.identifier_statement(),
            TokenType::Keyword(Keyword::Import) => self.import_statement(),
            TokenType::Keyword(Keyword::If) => self.if_statement(),
            TokenType::Keyword(Keyword::Elif) if self.context.in_if_chain() => {
                self.elif_statement()
            }
            TokenType::Keyword(Keyword::Else) if self.context.in_if_chain() => {
                self.else_statement()
            }
            TokenType::Keyword(Keyword::For) => self.for_statement(),
            TokenType::Keyword(Keyword::While) => self.while_statement(),
            TokenType::Keyword(Keyword::Class) => self.class_declaration(),
            TokenType::Keyword(Keyword::Def) => self.function_definition(),
            TokenType::Keyword(Keyword::Return) if self.context.in_function_body() => {
                self.return_statement()
            }
            TokenType::Keyword(Keyword::Pass) => {
                self.advance();
                Ok(Stmt::Pass)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn identifier_statement(&mut self) -> PyriteResult<Stmt> {
        let target = self.factor()?;

        let next = self.peek().token_type;
        match next {
            TokenType::Assign => {
                self.advance();

                if self.check(TokenType::ClassIdentifier)
                    && self.check_next(TokenType::LeftParen)
                {
                    let class_name = self.advance().lexeme.clone();
                    let arguments = self.arguments()?;
                    Ok(Stmt::ClassAssign {
                        target,
                        class_name,
                        arguments,
                    })
                } else {
                    let value = self.expression()?;
                    Ok(Stmt::Assign { target, value })
                }
            }
            TokenType::Dot => {
                let chain = self.dotted_chain()?;
                Ok(Stmt::AttributeAccess {
                    receiver: target,
                    chain,
                })
            }
            TokenType::LeftParen => {
                let arguments = self.arguments()?;
                Ok(Stmt::Call(Call::new(target, arguments)))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn import_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::Import))?;
        let module = self.expression()?;
        Ok(Stmt::Import { module })
    }

    fn if_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::If))?;
        let condition = self.expression()?;
        self.consume(TokenType::Colon)?;
        let body = self.block(FrameKind::Block)?;
        Ok(Stmt::If { condition, body })
    }

    fn elif_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::Elif))?;
        let condition = self.expression()?;
        self.consume(TokenType::Colon)?;
        let body = self.block(FrameKind::Block)?;
        Ok(Stmt::Elif { condition, body })
    }

    fn else_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::Else))?;
        self.consume(TokenType::Colon)?;
        let body = self.block(FrameKind::Block)?;
        Ok(Stmt::Else { body })
    }

    fn for_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::For))?;
        let variable = self.factor()?;
        self.consume(TokenType::Keyword(Keyword::In))?;
        let iterable = self.expression()?;
        self.consume(TokenType::Colon)?;
        let body = self.block(FrameKind::Block)?;
        Ok(Stmt::For {
            variable,
            iterable,
            body,
        })
    }

    fn while_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::While))?;
        let condition = self.expression()?;
        self.consume(TokenType::Colon)?;
        let body = self.block(FrameKind::Block)?;
        Ok(Stmt::While { condition, body })
    }

    fn class_declaration(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::Class))?;
        let name = self.consume_name()?;

        let mut parent = None;
        if self.match_token(TokenType::LeftParen) {
            if !self.check(TokenType::RightParen) {
                parent = Some(self.consume_name()?);
            }
            self.consume(TokenType::RightParen)?;
        }

        self.consume(TokenType::Colon)?;
        let body = self.block(FrameKind::Class)?;

        Ok(Stmt::ClassDecl { name, parent, body })
    }

    fn function_definition(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::Def))?;
        let name = self.consume_name()?;
        let params = self.parameters()?;
        let body = self.block(FrameKind::Function)?;

        Ok(Stmt::FunctionDef { name, params, body })
    }

    fn return_statement(&mut self) -> PyriteResult<Stmt> {
        self.consume(TokenType::Keyword(Keyword::Return))?;
        let value = self.expression()?;
        Ok(Stmt::Return { value })
    }

    /// `INDENT statement* DEDENT`, parsed inside a fresh context frame
    fn block(&mut self, kind: FrameKind) -> PyriteResult<Vec<Stmt>> {
        self.consume(TokenType::Indent)?;
        self.context.push(kind);

        let mut statements = Vec::new();
        while !self.check(TokenType::Dedent) && !self.is_at_end() {
            statements.push(self.block_statement()?);
        }

        self.context.pop();
        self.consume(TokenType::Dedent)?;
        Ok(statements)
    }

    // ===== Expressions =====

    /// A factor followed by at most one extension: an arithmetic operator,
    /// a comparison (with one optional logical chain), an attribute chain,
    /// an argument list, or an alias.
    fn expression(&mut self) -> PyriteResult<Expr> {
        let node = self.factor()?;
        let next = self.peek().token_type;

        if let Some(operator) = ArithmeticOp::from_token(next) {
            self.advance();
            let right = self.factor()?;
            return Ok(Expr::Binary {
                operator,
                left: Box::new(node),
                right: Box::new(right),
            });
        }

        if let Some(operator) = ComparisonOp::from_token(next) {
            self.advance();
            let right = self.expression()?;
            let comparison = Expr::Comparison {
                operator,
                left: Box::new(node),
                right: Box::new(right),
            };

            return match LogicalOp::from_token(self.peek().token_type) {
                Some(operator) => {
                    self.advance();
                    let right = self.expression()?;
                    Ok(Expr::Logical {
                        operator,
                        left: Box::new(comparison),
                        right: Box::new(right),
                    })
                }
                None => Ok(comparison),
            };
        }

        match next {
            TokenType::Dot => {
                let chain = self.dotted_chain()?;
                Ok(Expr::AttributeAccess {
                    receiver: Box::new(node),
                    chain,
                })
            }
            // Only names are callable; `1(2)` leaves the `(` unconsumed.
            TokenType::LeftParen if node.name().is_some() => {
                let arguments = self.arguments()?;
                Ok(Expr::Call(Call::new(node, arguments)))
            }
            TokenType::Keyword(Keyword::As) => {
                self.advance();
                let alias = self.factor()?;
                Ok(Expr::Alias {
                    target: Box::new(node),
                    alias: Box::new(alias),
                })
            }
            _ => Ok(node),
        }
    }

    fn dotted_chain(&mut self) -> PyriteResult<Vec<Expr>> {
        let mut chain = Vec::new();
        while self.match_token(TokenType::Dot) {
            chain.push(self.expression()?);
        }
        Ok(chain)
    }

    fn factor(&mut self) -> PyriteResult<Expr> {
        let token = self.peek().clone();

        let expr = match token.token_type {
            TokenType::Number => Expr::Number(token.lexeme),
            TokenType::String => Expr::Str(token.lexeme),
            TokenType::ClassIdentifier => Expr::ClassIdentifier(token.lexeme),
            TokenType::Keyword(keyword) => match Constant::from_keyword(keyword) {
                Some(constant) => Expr::Constant(constant),
                None => return Err(self.unexpected()),
            },
            TokenType::Identifier if token.lexeme == RECEIVER => {
                self.advance();
                if self.match_token(TokenType::Dot) {
                    return Ok(Expr::BoundIdentifier(self.consume_name()?));
                }
                return Ok(Expr::Receiver);
            }
            TokenType::Identifier => Expr::Identifier(token.lexeme),
            _ => return Err(self.unexpected()),
        };

        self.advance();
        Ok(expr)
    }

    fn arguments(&mut self) -> PyriteResult<Vec<Expr>> {
        self.consume(TokenType::LeftParen)?;

        let mut arguments = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                arguments.push(self.factor()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightParen)?;
        Ok(arguments)
    }

    /// Parameter lists are argument lists followed by the header colon
    fn parameters(&mut self) -> PyriteResult<Vec<Expr>> {
        let params = self.arguments()?;
        self.consume(TokenType::Colon)?;
        Ok(params)
    }

    // ===== Helper Methods =====

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn check_next(&self, token_type: TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|token| token.token_type == token_type)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Advance past a token of the required kind or fail naming the expected
    /// and actual token.
    fn consume(&mut self, token_type: TokenType) -> PyriteResult<&Token> {
        if self.check(token_type) {
            if token_type == TokenType::Eof {
                return Ok(self.peek());
            }
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(PyriteError::syntactic_error(
                format!(
                    "Invalid syntax in line {}: expected {} got {}",
                    token.line(),
                    token_type,
                    describe(token)
                ),
                token.location.clone(),
            ))
        }
    }

    /// Class, parent, and member names accept either identifier form
    fn consume_name(&mut self) -> PyriteResult<String> {
        if self.check(TokenType::ClassIdentifier) {
            return Ok(self.advance().lexeme.clone());
        }
        Ok(self.consume(TokenType::Identifier)?.lexeme.clone())
    }

    fn unexpected(&self) -> PyriteError {
        let token = self.peek();
        let message = match token.token_type {
            TokenType::Keyword(Keyword::Elif) | TokenType::Keyword(Keyword::Else) => format!(
                "Invalid syntax in line {}: '{}' without a preceding 'if'",
                token.line(),
                token.lexeme
            ),
            TokenType::Keyword(Keyword::Return) => format!(
                "Invalid syntax in line {}: 'return' outside of a function body",
                token.line()
            ),
            TokenType::Eof => format!(
                "Invalid syntax in line {}: unexpected end of input",
                token.line()
            ),
            _ => format!(
                "Invalid syntax in line {}: {} {}",
                token.line(),
                token.token_type,
                describe(token)
            ),
        };
        PyriteError::syntactic_error(message, token.location.clone())
    }
}

fn describe(token: &Token) -> String {
    match token.token_type {
        TokenType::Eof => "end of input".to_string(),
        TokenType::Indent | TokenType::Dedent => token.token_type.to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse_source(source: &str) -> PyriteResult<Program> {
        let tokens = Lexer::new(source, None).tokenize()?;
        Parser::new(tokens).parse()
    }

    fn parse_ok(source: &str) -> Vec<Stmt> {
        parse_source(source).unwrap().statements
    }

    fn ident(name: &str) -> Expr {
        Expr::Identifier(name.to_string())
    }

    fn number(value: &str) -> Expr {
        Expr::Number(value.to_string())
    }

    fn syntax_error_line(source: &str) -> usize {
        match parse_source(source) {
            Err(PyriteError::SyntacticError { location, .. }) => location.line,
            other => panic!("expected syntactic error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse_ok(""), vec![]);
    }

    #[test]
    fn test_plain_assignment() {
        assert_eq!(
            parse_ok("x = 1\n"),
            vec![Stmt::Assign {
                target: ident("x"),
                value: number("1"),
            }]
        );
    }

    #[test]
    fn test_class_instantiation() {
        assert_eq!(
            parse_ok("t1 = Test(10, y)\n"),
            vec![Stmt::ClassAssign {
                target: ident("t1"),
                class_name: "Test".to_string(),
                arguments: vec![number("10"), ident("y")],
            }]
        );
    }

    #[test]
    fn test_class_identifier_without_arguments_is_expression() {
        assert_eq!(
            parse_ok("x = Test\n"),
            vec![Stmt::Assign {
                target: ident("x"),
                value: Expr::ClassIdentifier("Test".to_string()),
            }]
        );
    }

    #[test]
    fn test_bound_assignment() {
        assert_eq!(
            parse_ok("def f(self):\n    self.x = z * 2\n")[0],
            Stmt::FunctionDef {
                name: "f".to_string(),
                params: vec![Expr::Receiver],
                body: vec![Stmt::Assign {
                    target: Expr::BoundIdentifier("x".to_string()),
                    value: Expr::Binary {
                        operator: ArithmeticOp::Multiply,
                        left: Box::new(ident("z")),
                        right: Box::new(number("2")),
                    },
                }],
            }
        );
    }

    #[test]
    fn test_method_call_through_attribute_chain() {
        assert_eq!(
            parse_ok("a = t1.prueba(12)\n"),
            vec![Stmt::Assign {
                target: ident("a"),
                value: Expr::AttributeAccess {
                    receiver: Box::new(ident("t1")),
                    chain: vec![Expr::Call(Call::new(ident("prueba"), vec![number("12")]))],
                },
            }]
        );
    }

    #[test]
    fn test_attribute_statement_and_call_statement() {
        let statements = parse_ok("t.run(1)\nprint(\"hi\")\nself.update(x)\n");
        assert!(matches!(statements[0], Stmt::AttributeAccess { .. }));
        assert_eq!(
            statements[1],
            Stmt::Call(Call::new(ident("print"), vec![Expr::Str("\"hi\"".to_string())]))
        );
        assert_eq!(
            statements[2],
            Stmt::Call(Call::new(
                Expr::BoundIdentifier("update".to_string()),
                vec![ident("x")]
            ))
        );
    }

    #[test]
    fn test_import_with_alias() {
        assert_eq!(
            parse_ok("import numpy as np\n"),
            vec![Stmt::Import {
                module: Expr::Alias {
                    target: Box::new(ident("numpy")),
                    alias: Box::new(ident("np")),
                },
            }]
        );
    }

    #[test]
    fn test_comparison_with_one_logical_chain() {
        let statements = parse_ok("if x < y and y != 0:\n    pass\n");
        assert_eq!(
            statements[0],
            Stmt::If {
                condition: Expr::Logical {
                    operator: LogicalOp::And,
                    left: Box::new(Expr::Comparison {
                        operator: ComparisonOp::Less,
                        left: Box::new(ident("x")),
                        right: Box::new(ident("y")),
                    }),
                    right: Box::new(Expr::Comparison {
                        operator: ComparisonOp::NotEqual,
                        left: Box::new(ident("y")),
                        right: Box::new(number("0")),
                    }),
                },
                body: vec![Stmt::Pass],
            }
        );
    }

    #[test]
    fn test_arithmetic_right_operand_is_a_single_factor() {
        let line = syntax_error_line("x = 1 + 2 + 3\n");
        assert_eq!(line, 1);
    }

    #[test]
    fn test_if_elif_else_chain() {
        let statements = parse_ok(
            "if z == 1:\n    print(z)\nelif z == 2:\n    print(z)\nelse:\n    print(z)\n",
        );
        assert!(matches!(statements[0], Stmt::If { .. }));
        assert!(matches!(statements[1], Stmt::Elif { .. }));
        assert!(matches!(statements[2], Stmt::Else { .. }));
    }

    #[test]
    fn test_elif_without_if() {
        assert_eq!(syntax_error_line("x = 1\nelif x == 1:\n    pass\n"), 2);
    }

    #[test]
    fn test_else_after_closed_chain() {
        let source = "if x == 1:\n    pass\nelse:\n    pass\nelse:\n    pass\n";
        assert_eq!(syntax_error_line(source), 5);
    }

    #[test]
    fn test_chain_broken_by_other_statement() {
        let source = "if x == 1:\n    pass\ny = 2\nelse:\n    pass\n";
        assert_eq!(syntax_error_line(source), 4);
    }

    #[test]
    fn test_if_chain_inside_nested_block() {
        let source = "def f(z):\n    if z == 1:\n        return 1\n    else:\n        return 2\n";
        let statements = parse_ok(source);
        match &statements[0] {
            Stmt::FunctionDef { body, .. } => {
                assert!(matches!(body[0], Stmt::If { .. }));
                assert!(matches!(body[1], Stmt::Else { .. }));
            }
            other => panic!("expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_return_outside_function() {
        assert_eq!(syntax_error_line("return 1\n"), 1);
        assert_eq!(syntax_error_line("class A():\n    return 1\n"), 2);
    }

    #[test]
    fn test_return_after_nested_definition() {
        let source = "def outer(x):\n    def inner(y):\n        return y\n    return x\n";
        let statements = parse_ok(source);
        match &statements[0] {
            Stmt::FunctionDef { body, .. } => {
                assert_eq!(body.len(), 2);
                assert_eq!(body[1], Stmt::Return { value: ident("x") });
            }
            other => panic!("expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_class_declaration_forms() {
        let statements = parse_ok("class A(B):\n    pass\nclass C():\n    pass\nclass D:\n    pass\n");
        assert_eq!(
            statements,
            vec![
                Stmt::ClassDecl {
                    name: "A".to_string(),
                    parent: Some("B".to_string()),
                    body: vec![Stmt::Pass],
                },
                Stmt::ClassDecl {
                    name: "C".to_string(),
                    parent: None,
                    body: vec![Stmt::Pass],
                },
                Stmt::ClassDecl {
                    name: "D".to_string(),
                    parent: None,
                    body: vec![Stmt::Pass],
                },
            ]
        );
    }

    #[test]
    fn test_class_with_two_parents_is_rejected() {
        assert_eq!(syntax_error_line("class A(B, C):\n    pass\n"), 1);
    }

    #[test]
    fn test_for_and_while_loops() {
        let statements = parse_ok("for i in items:\n    print(i)\nwhile y != 0:\n    y = y - 1\n");
        assert_eq!(
            statements[0],
            Stmt::For {
                variable: ident("i"),
                iterable: ident("items"),
                body: vec![Stmt::Call(Call::new(ident("print"), vec![ident("i")]))],
            }
        );
        assert!(matches!(statements[1], Stmt::While { .. }));
    }

    #[test]
    fn test_while_requires_colon() {
        assert_eq!(syntax_error_line("while x\n    pass\n"), 2);
    }

    #[test]
    fn test_missing_block() {
        let err = parse_source("if x == 1:\ny = 2\n").unwrap_err();
        assert!(err.message().contains("expected INDENT"));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_unused_tokens_are_syntax_errors() {
        assert_eq!(syntax_error_line("x := 1\n"), 1);
        assert_eq!(syntax_error_line("x = [1]\n"), 1);
    }

    #[test]
    fn test_statement_cannot_start_with_literal() {
        let err = parse_source("x = 1\n42\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.message().contains("NUMBER"));
    }

    #[test]
    fn test_bare_identifier_statement_is_rejected() {
        assert_eq!(syntax_error_line("x\n"), 1);
        assert_eq!(syntax_error_line("x = 1\ny\n"), 2);
    }

    #[test]
    fn test_end_of_input_errors_name_last_line() {
        let err = parse_source("x\n").unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid syntax in line 1: unexpected end of input"
        );

        let err = parse_source("if x == 1:\n\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert_eq!(
            err.message(),
            "Invalid syntax in line 1: expected INDENT got end of input"
        );
    }

    #[test]
    fn test_function_with_capitalized_name() {
        let statements = parse_ok("def Setup():\n    pass\n");
        assert_eq!(
            statements,
            vec![Stmt::FunctionDef {
                name: "Setup".to_string(),
                params: vec![],
                body: vec![Stmt::Pass],
            }]
        );
    }

    #[test]
    fn test_literal_is_not_callable() {
        let err = parse_source("x = 1(2)\n").unwrap_err();
        assert_eq!(err.kind(), "Syntactic Error");
        assert_eq!(err.line(), Some(1));
        assert!(err.message().contains("'('"));
        assert_eq!(syntax_error_line("y = \"s\"(1)\n"), 1);
    }

    #[test]
    fn test_parser_without_eof_sentinel() {
        let tokens = Lexer::new("x = 1", None).tokenize().unwrap();
        let without_eof = tokens[..tokens.len() - 1].to_vec();
        assert_eq!(Parser::new(without_eof).parse().unwrap().statements.len(), 1);
        assert_eq!(Parser::new(Vec::new()).parse().unwrap().statements, vec![]);
    }
}
