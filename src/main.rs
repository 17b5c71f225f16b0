//! Pyrite CLI
//!
//! Command-line interface for the Pyrite compiler.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use tracing::debug;

use pyrite::{Compiler, CompilerOptions, Diagnostic, PyriteResult, Token, VERSION};

#[derive(ClapParser, Debug)]
#[command(name = "pyrite", version = VERSION)]
#[command(about = "Compile an indentation-sensitive Python-like language")]
struct Cli {
    /// Source file to compile (reads stdin when omitted or "-")
    file: Option<PathBuf>,

    /// Write generated text to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Show tokenization output (lexer only)
    #[arg(short, long)]
    tokens: bool,

    /// Show the analyzed AST instead of generated text
    #[arg(short, long)]
    ast: bool,

    /// Print every stage's intermediate result
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let (source, filename) = match read_source(cli.file.as_ref()) {
        Ok(read) => read,
        Err(e) => {
            eprintln!("{}", Diagnostic::new(e));
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &source, filename) {
        eprintln!("{}", Diagnostic::with_source(e, &source));
        process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("PYRITE_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pyrite=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_source(file: Option<&PathBuf>) -> PyriteResult<(String, Option<String>)> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            let source = fs::read_to_string(path).map_err(|e| {
                pyrite::PyriteError::io_error(format!(
                    "Failed to read file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Ok((source, Some(path.display().to_string())))
        }
        _ => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok((source, None))
        }
    }
}

fn run(cli: &Cli, source: &str, filename: Option<String>) -> PyriteResult<()> {
    let mut options = CompilerOptions::new().verbose(cli.verbose);
    if let Some(filename) = filename {
        options = options.filename(filename);
    }
    let compiler = Compiler::new(options);

    if cli.tokens {
        let tokens = compiler.tokenize(source)?;
        show_tokens(&tokens);
        return Ok(());
    }

    let compilation = compiler.compile(source)?;

    if let Some(trace) = compilation.trace() {
        eprintln!("{}", trace);
    }

    let rendered = if cli.ast {
        format!("{:#?}\n", compilation.program)
    } else {
        compilation.output
    };

    match &cli.output {
        Some(path) => {
            debug!(path = %path.display(), "writing output");
            fs::write(path, rendered)?;
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Print the token table
fn show_tokens(tokens: &[Token]) {
    println!("{}", "=".repeat(60));

    for (i, token) in tokens.iter().enumerate() {
        println!(
            "{:4}: {:20} | {:?}",
            i,
            token.token_type.to_string(),
            token.lexeme
        );
    }

    println!("{}", "=".repeat(60));
    println!("Total tokens: {}", tokens.len());
}
