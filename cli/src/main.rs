//! `impc` - ahead-of-time compiler for the imp language.
//!
//! Parses arguments, configures logging, and hands off to the driver crate
//! for the actual lex/parse/analyze/codegen pipeline.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use impc_drv::{validate_input_exists, Config as DrvConfig, Session};

/// Compile a single `.imp` source file to textual LLVM IR.
#[derive(Parser, Debug)]
#[command(name = "impc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ahead-of-time compiler for the imp language", long_about = None)]
struct Cli {
    /// Source file to compile.
    input_file: PathBuf,

    /// Where to write the generated LLVM IR.
    output_file: PathBuf,

    /// Raise logging verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dump the token stream to stderr before parsing.
    #[arg(long)]
    emit_tokens: bool,

    /// Dump the parsed AST to stderr before analysis.
    #[arg(long)]
    emit_ast: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    validate_input_exists(&cli.input_file)?;

    let mut session = Session::new(DrvConfig {
        input_file: cli.input_file,
        output_file: cli.output_file.clone(),
        verbose: cli.verbose,
        emit_tokens: cli.emit_tokens,
        emit_ast: cli.emit_ast,
    });
    session.compile()?;

    println!("compiled successfully: {}", cli.output_file.display());
    Ok(())
}

/// `IMPC_LOG` env var controls the filter directly; `-v`/`-vv` raise the
/// default floor from `warn` to `info`/`debug` when it isn't set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("IMPC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_positional_arguments() {
        let cli = Cli::parse_from(["impc", "in.imp", "out.ll"]);
        assert_eq!(cli.input_file, PathBuf::from("in.imp"));
        assert_eq!(cli.output_file, PathBuf::from("out.ll"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn repeated_verbose_flag_accumulates() {
        let cli = Cli::parse_from(["impc", "in.imp", "out.ll", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn emit_flags_parse() {
        let cli = Cli::parse_from(["impc", "in.imp", "out.ll", "--emit-tokens", "--emit-ast"]);
        assert!(cli.emit_tokens);
        assert!(cli.emit_ast);
    }
}
