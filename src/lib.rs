//! # Pyrite
//!
//! A source-to-source compiler for a small indentation-sensitive,
//! Python-like language.
//!
//! ## Architecture
//!
//! The pipeline runs four stages in order, each consuming the whole output
//! of the previous one:
//! - `lexer`: Tokenization, including INDENT/DEDENT synthesis
//! - `parser`: Recursive-descent parsing into an AST
//! - `semantic`: Symbol recording and call validation
//! - `codegen`: Rendering the analyzed AST back to source text
//! - `error`: Error handling and diagnostics

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;

use colored::Colorize;
use tracing::{debug, info};

// Re-export commonly used types
pub use codegen::CodeGenerator;
pub use error::{Diagnostic, PyriteError, PyriteResult, SourceLocation};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{Parser, Program};
pub use semantic::{SemanticAnalyzer, SymbolTable};

/// Version of the Pyrite compiler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options shared by every stage of a compilation
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Record the numbered stage dumps in the `Compilation`
    pub verbose: bool,
    /// Reported in error locations
    pub filename: Option<String>,
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Every intermediate product of a successful compilation
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    /// AST as produced by the parser
    pub parsed: Program,
    /// AST after semantic analysis
    pub program: Program,
    pub symbols: SymbolTable,
    pub output: String,
    trace: Option<String>,
}

impl Compilation {
    /// Numbered dump of each stage's result, recorded when compiling verbosely
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    fn render_trace(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("{}\n", "1. -> Lexer".cyan().bold()));
        for token in &self.tokens {
            out.push_str(&format!(
                "  {:>4}:{:<3} {:20} {:?}\n",
                token.location.line, token.location.column, token.token_type, token.lexeme
            ));
        }

        out.push_str(&format!("\n{}\n", "2. --> Parser".cyan().bold()));
        out.push_str(&format!("{:#?}\n", self.parsed));

        out.push_str(&format!("\n{}\n", "3. ---> Semantic Analyzer".cyan().bold()));
        out.push_str(&format!("{:#?}\n", self.program));
        for (name, symbol) in self.symbols.entries() {
            out.push_str(&format!("  {:<16} {}\n", name, symbol.kind()));
        }

        out.push_str(&format!("\n{}\n", "4. ----> Code Generator".cyan().bold()));
        out.push_str(&self.output);

        out
    }
}

/// Runs the four stages over a source text
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Tokenize only
    pub fn tokenize(&self, source: &str) -> PyriteResult<Vec<Token>> {
        Lexer::new(source, self.options.filename.as_deref()).tokenize()
    }

    /// Compile a source text, stopping at the first stage that fails.
    pub fn compile(&self, source: &str) -> PyriteResult<Compilation> {
        info!(
            file = self.options.filename.as_deref().unwrap_or("<input>"),
            "compiling"
        );

        // Phase 1: Lexical Analysis
        let tokens = self.tokenize(source)?;

        // Phase 2: Parsing
        let parsed = Parser::new(tokens.clone()).parse()?;

        // Phase 3: Semantic Analysis
        let analysis = SemanticAnalyzer::analyze(parsed.clone())?;
        debug!(symbols = analysis.symbols.len(), "analysis complete");

        // Phase 4: Code Generation
        let output = CodeGenerator::new().generate(&analysis.program);

        let mut compilation = Compilation {
            tokens,
            parsed,
            program: analysis.program,
            symbols: analysis.symbols,
            output,
            trace: None,
        };
        if self.options.verbose {
            compilation.trace = Some(compilation.render_trace());
        }

        Ok(compilation)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

/// Compile source text to output text with default options
pub fn compile(source: &str) -> PyriteResult<String> {
    Compiler::default()
        .compile(source)
        .map(|compilation| compilation.output)
}
