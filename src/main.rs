// cfront: parser and semantic checker for a subset of C

mod diag;
mod parser;
mod sema;

use std::fs;
use std::io::Read;
use std::process::ExitCode;

use clap::Parser;

use diag::Diagnostics;
use parser::lexer::{Lexer, TokenKind};
use parser::printer::render_unit;

/// Parse and check a C source file, reporting every diagnostic.
#[derive(Parser)]
#[command(name = "cfront", version, about)]
struct Cli {
    /// C source file, or '-' to read standard input
    file: String,

    /// Dump the token stream and exit without parsing
    #[arg(long)]
    tokens: bool,

    /// Print the canonical rendering of the AST
    #[arg(long)]
    ast: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (name, source) = if cli.file == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        ("<stdin>".to_string(), source)
    } else {
        (cli.file.clone(), fs::read_to_string(&cli.file)?)
    };

    if cli.tokens {
        return Ok(dump_tokens(&name, &source));
    }

    let (unit, mut diags) = parser::parse(&name, &source);
    sema::check(&unit, &mut diags);

    if cli.ast {
        print!("{}", render_unit(&unit));
    }

    Ok(report(&diags))
}

fn dump_tokens(name: &str, source: &str) -> ExitCode {
    let mut diags = Diagnostics::new(name);
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token(&mut diags);
        println!("{}: {}", token.span, token.kind);
        if token.kind == TokenKind::Eof {
            break;
        }
    }
    report(&diags)
}

fn report(diags: &Diagnostics) -> ExitCode {
    for diagnostic in diags.iter() {
        eprintln!("{}", diagnostic);
    }
    if diags.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
