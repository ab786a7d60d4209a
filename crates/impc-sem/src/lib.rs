//! Name resolution and type checking: the third stage of the pipeline.
//!
//! Two passes over the program. The first registers every struct and
//! function signature so later references — including a field whose type
//! is a struct declared further down the file — already resolve by the
//! time bodies are checked. The second walks every function body and the
//! top-level body, threading a [`scope::ScopeStack`] through statements and
//! annotating each [`impc_par::ast::Expr::Binary`] with its result type.

pub mod error;
mod expr;
mod items;
mod scope;
mod stmt;
mod tables;

pub use error::SemanticError;
pub use tables::{FieldInfo, FnSig, FunctionTable, StructInfo, StructTable};

use impc_par::ast::Program;
use impc_util::{Handler, Span, Symbol};

use scope::ScopeStack;

/// Everything later stages need about a checked program: its struct layouts
/// and function signatures, keyed the same way the analyzer built them.
#[derive(Debug)]
pub struct SemanticModel {
    pub structs: StructTable,
    pub functions: FunctionTable,
}

/// Checks `program` and returns the tables the code generator consults for
/// struct layout and call signatures. Checking stops at the first error,
/// matching the pipeline's no-recovery design.
pub fn analyze(program: &Program, handler: &Handler) -> Result<SemanticModel, SemanticError> {
    let mut analyzer = Analyzer::new(handler);
    analyzer.register_structs(program)?;
    analyzer.register_functions(program)?;
    analyzer.check_functions(program)?;
    analyzer.check_top_level(program)?;
    Ok(SemanticModel {
        structs: analyzer.structs,
        functions: analyzer.functions,
    })
}

struct Analyzer<'a> {
    structs: StructTable,
    functions: FunctionTable,
    scopes: ScopeStack,
    handler: &'a Handler,
}

impl<'a> Analyzer<'a> {
    fn new(handler: &'a Handler) -> Self {
        Self {
            structs: StructTable::new(),
            functions: FunctionTable::new(),
            scopes: ScopeStack::new(),
            handler,
        }
    }

    /// Records `err` with the diagnostic handler and hands it back so call
    /// sites can write `return Err(self.emit(...))`.
    fn emit(&self, err: SemanticError) -> SemanticError {
        let line = err.line().unwrap_or(0);
        self.handler
            .build_error(err.to_string(), Span::point(line, 0))
            .emit();
        err
    }
}

/// Plain-English rendering of a type for error messages.
fn describe_type(ty: impc_par::ast::Type) -> String {
    match ty {
        impc_par::ast::Type::I32 => "i32".to_string(),
        impc_par::ast::Type::I64 => "i64".to_string(),
        impc_par::ast::Type::Bool => "bool".to_string(),
        impc_par::ast::Type::Named(name) => name.as_str().to_string(),
    }
}

fn number_literal_type(value: i64) -> impc_par::ast::Type {
    if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
        impc_par::ast::Type::I32
    } else {
        impc_par::ast::Type::I64
    }
}

/// `target <- found` is legal if the types match exactly or `found` is an
/// `i32` widening into an `i64` target.
fn is_assignable(target: impc_par::ast::Type, found: impc_par::ast::Type) -> bool {
    use impc_par::ast::Type;
    target == found || (target == Type::I64 && found == Type::I32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use impc_lex::Lexer;

    fn analyze_source(source: &str) -> Result<SemanticModel, SemanticError> {
        let handler = Handler::new();
        let tokens = Lexer::new(source).tokenize(&handler).expect("lex ok");
        let program = impc_par::parse(tokens, &handler).expect("parse ok");
        analyze(&program, &handler)
    }

    #[test]
    fn accepts_a_minimal_valid_program() {
        assert!(analyze_source("i32 x { 1 }\nreturn x\n").is_ok());
    }

    #[test]
    fn rejects_missing_return_in_function_body() {
        let err = analyze_source("fn f = () -> i32 {\ni32 x { 1 }\n}\nreturn f()\n").unwrap_err();
        assert!(matches!(err, SemanticError::MissingReturn { .. }));
    }

    #[test]
    fn rejects_use_while_initializing() {
        let err = analyze_source("i32 x { x + 1 }\nreturn x\n").unwrap_err();
        assert!(matches!(err, SemanticError::UseWhileInitializing { .. }));
    }

    #[test]
    fn rejects_self_assignment() {
        let err = analyze_source("i32 mut x { 1 }\nx = x\nreturn x\n").unwrap_err();
        assert!(matches!(err, SemanticError::SelfAssignment { .. }));
    }

    #[test]
    fn widens_i32_into_i64_on_assignment() {
        assert!(analyze_source("i64 x { 1 }\nreturn x\n").is_ok());
    }

    #[test]
    fn rejects_narrowing_i64_into_i32() {
        let err = analyze_source("i64 big { 5000000000 }\ni32 x { big }\nreturn x\n").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn struct_fields_check_in_declaration_order() {
        let ok = analyze_source("struct Point {\ni32 x\ni32 y\n}\nPoint p { 1, 2 }\nreturn p.x\n");
        assert!(ok.is_ok());
    }

    #[test]
    fn rejects_assignment_through_immutable_field() {
        let err = analyze_source(
            "struct Point {\ni32 x\ni32 y\n}\nPoint mut p { 1, 2 }\np.x = 3\nreturn p.x\n",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ImmutableField { .. }));
    }

    #[test]
    fn forward_referencing_struct_field_type_is_allowed() {
        let ok = analyze_source(
            "struct Wrapper {\nInner value\n}\nstruct Inner {\ni32 n\n}\nInner i { 1 }\nreturn i.n\n",
        );
        assert!(ok.is_ok());
    }
}
