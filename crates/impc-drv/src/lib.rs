//! Compilation driver: orchestrates the four pipeline stages for one
//! invocation and owns the `Config`/`Session` types the CLI binary talks to.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use impc_lex::Lexer;
use impc_par::ast::Program;
use impc_util::Handler;

/// Everything a single compilation needs, parsed by the CLI binary's
/// `clap` layer and handed to [`Session::new`].
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub verbose: u8,
    pub emit_tokens: bool,
    pub emit_ast: bool,
}

/// State for one compilation: the parsed configuration and the diagnostic
/// handler every stage reports into.
pub struct Session {
    config: Config,
    handler: Handler,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: Handler::new(),
        }
    }

    /// Runs lexing, parsing, semantic analysis, and code generation in
    /// order, writing the resulting LLVM IR to the configured output file.
    /// Stops at the first stage that reports an error.
    pub fn compile(&mut self) -> Result<()> {
        let source = fs::read_to_string(&self.config.input_file)
            .with_context(|| format!("cannot read input file {}", self.config.input_file.display()))?;
        let source = source.replace('\r', "");

        info!(file = %self.config.input_file.display(), "compiling");

        let tokens = {
            let _span = tracing::debug_span!("lex").entered();
            Lexer::new(&source)
                .tokenize(&self.handler)
                .map_err(|_| self.diagnostic_error())?
        };
        debug!(count = tokens.len(), "lexed");
        if self.config.emit_tokens {
            eprintln!("{tokens:#?}");
        }

        let program: Program = {
            let _span = tracing::debug_span!("parse").entered();
            impc_par::parse(tokens, &self.handler).map_err(|_| self.diagnostic_error())?
        };
        debug!(
            structs = program.structs.len(),
            functions = program.functions.len(),
            "parsed"
        );
        if self.config.emit_ast {
            eprintln!("{program:#?}");
        }

        let model = {
            let _span = tracing::debug_span!("analyze").entered();
            impc_sem::analyze(&program, &self.handler).map_err(|_| self.diagnostic_error())?
        };
        debug!("analyzed");

        let module_name = self
            .config
            .input_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string());

        let ir = {
            let _span = tracing::debug_span!("codegen").entered();
            impc_gen::generate(&program, &model, &module_name)
                .with_context(|| "code generation failed")?
        };

        fs::write(&self.config.output_file, ir)
            .with_context(|| format!("cannot write output file {}", self.config.output_file.display()))?;

        info!(file = %self.config.output_file.display(), "wrote output");
        Ok(())
    }

    /// Renders the first diagnostic the handler collected into an
    /// `anyhow::Error`. Carries the message and line/column pointer but not
    /// the diagnostic's own `error:` prefix, since the CLI adds that single
    /// marker itself when it prints the top-level error.
    fn diagnostic_error(&self) -> anyhow::Error {
        match self.handler.first() {
            Some(diag) => anyhow::anyhow!(
                "{}\n  --> line {}, column {}",
                diag.message,
                diag.span.line,
                diag.span.column
            ),
            None => anyhow::anyhow!("compilation failed with no recorded diagnostic"),
        }
    }
}

/// Rejects an input path that doesn't exist up front so the CLI reports a
/// clean "missing input file" message instead of an `fs::read_to_string` I/O
/// error wrapped in stage machinery.
pub fn validate_input_exists(path: &std::path::Path) -> Result<()> {
    if !path.is_file() {
        bail!("input file not found: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn compiles_a_minimal_program_to_ir() {
        let input = write_temp("return 0");
        let output = tempfile::NamedTempFile::new().unwrap();
        let mut session = Session::new(Config {
            input_file: input.path().to_path_buf(),
            output_file: output.path().to_path_buf(),
            verbose: 0,
            emit_tokens: false,
            emit_ast: false,
        });
        session.compile().expect("compiles cleanly");
        let ir = fs::read_to_string(output.path()).unwrap();
        assert!(ir.contains("define i32 @main"));
        assert!(ir.contains("printResult"));
    }

    #[test]
    fn reports_a_semantic_error_through_anyhow() {
        let input = write_temp("return x");
        let output = tempfile::NamedTempFile::new().unwrap();
        let mut session = Session::new(Config {
            input_file: input.path().to_path_buf(),
            output_file: output.path().to_path_buf(),
            verbose: 0,
            emit_tokens: false,
            emit_ast: false,
        });
        let err = session.compile().unwrap_err();
        assert!(err.to_string().contains("error"));
    }

    #[test]
    fn missing_input_file_is_rejected_up_front() {
        let path = std::path::Path::new("/nonexistent/does-not-exist.imp");
        let err = validate_input_exists(path).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
