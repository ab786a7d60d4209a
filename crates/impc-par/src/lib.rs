//! Token stream to abstract syntax tree: the second stage of the pipeline.
//!
//! A recursive-descent parser with a single token of lookahead. Each
//! non-terminal in the grammar gets its own `parse_*` method; there is no
//! backtracking except for the one `else`-binding ambiguity documented on
//! [`Parser::parse_if_stmt`].

pub mod ast;
mod error;
mod expr;
mod items;
mod stmt;

pub use error::ParseError;

use std::collections::HashSet;

use impc_lex::{Token, TokenKind};
use impc_util::{Handler, Span, Symbol};

use ast::{Block, Program, Stmt};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'a Handler,
    /// Struct names declared so far, needed to tell a `var_decl` whose type
    /// is a struct apart from an `assignment` statement: both start with a
    /// bare `IDENT`.
    struct_names: HashSet<Symbol>,
}

/// Parses a complete token stream (as produced by [`impc_lex::Lexer`]) into a
/// [`Program`]. Parsing stops at the first syntax error, matching the
/// pipeline's no-recovery error-handling design.
pub fn parse(tokens: Vec<Token>, handler: &Handler) -> Result<Program, ParseError> {
    Parser::new(tokens, handler).parse_program()
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, handler: &'a Handler) -> Self {
        Self {
            tokens,
            pos: 0,
            handler,
            struct_names: HashSet::new(),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.skip_blank_lines();
        let mut structs = Vec::new();
        let mut functions = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Struct => structs.push(self.parse_struct_decl()?),
                TokenKind::Fn => functions.push(self.parse_function_decl(None)?),
                _ => break,
            }
            self.skip_blank_lines();
        }
        let body = self.parse_stmt_block(false)?;
        let program = Program {
            structs,
            functions,
            body,
        };
        Ok(program)
    }

    /// `"{" { stmt } [return_stmt] "}"`.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_blank_lines();
        let block = self.parse_stmt_block(true)?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block {
            span: start.to(self.previous_span()),
            ..block
        })
    }

    /// Shared body between a braced block and the top-level program: a run
    /// of statements optionally closed by a `return`. `braced` selects
    /// whether the run stops at `}` or at end of input.
    fn parse_stmt_block(&mut self, braced: bool) -> Result<Block, ParseError> {
        let start = self.current_span();
        let mut statements = Vec::new();
        let mut tail_return = None;
        loop {
            if braced && self.check(TokenKind::RBrace) {
                break;
            }
            if !braced && self.at_eof() {
                break;
            }
            if self.check(TokenKind::Return) {
                let return_line = self.current_span().line;
                self.advance();
                let value = self.parse_expr()?;
                tail_return = Some(value);
                self.end_statement(return_line)?;
                self.skip_blank_lines();
                let closes = if braced {
                    self.check(TokenKind::RBrace)
                } else {
                    self.at_eof()
                };
                if !closes {
                    return Err(ParseError::CodeAfterReturn { line: return_line });
                }
                break;
            }
            let stmt_line = self.current_span().line;
            statements.push(self.parse_stmt()?);
            self.end_statement(stmt_line)?;
            self.skip_blank_lines();
        }
        Ok(Block {
            statements,
            tail_return,
            span: start.to(self.previous_span()),
        })
    }

    /// `"{" [ expr { "," expr } ] "}"`, shared by the `var_decl` initializer
    /// and the inline struct-literal expression, which are syntactically
    /// identical and only distinguished by what the caller does with the
    /// list afterwards.
    fn parse_brace_expr_list(&mut self) -> Result<Vec<ast::Expr>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut items = Vec::new();
        if !self.check(TokenKind::RBrace) {
            items.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                items.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(items)
    }

    fn parse_type(&mut self) -> Result<ast::Type, ParseError> {
        let kind = self.current_kind();
        let ty = match kind {
            TokenKind::I32Type => ast::Type::I32,
            TokenKind::I64Type => ast::Type::I64,
            TokenKind::BoolType => ast::Type::Bool,
            TokenKind::Ident => ast::Type::Named(self.current().lexeme),
            _ => return Err(self.expected_error("a type")),
        };
        self.advance();
        Ok(ty)
    }

    // -- token-stream cursor -------------------------------------------

    fn current(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_span(&self) -> Span {
        let tok = self.current();
        Span::point(tok.line, tok.column)
    }

    fn previous_span(&self) -> Span {
        let idx = self.pos.saturating_sub(1).min(self.tokens.len() - 1);
        let tok = self.tokens[idx];
        Span::point(tok.line, tok.column)
    }

    fn at_eof(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if it matches, reporting an error
    /// otherwise.
    fn expect(&mut self, kind: TokenKind, what: &'static str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected_error(what))
        }
    }

    /// Consumes the current token if it matches, returning whether it did.
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_blank_lines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Every statement must be terminated by a `NEWLINE`, end of input, or
    /// the `}` that closes its enclosing block — the last statement in a
    /// block needs no trailing newline of its own. Any run of blank lines
    /// after the terminator is swallowed too. Anything else (most notably
    /// another statement-starting token) means two statements were stacked
    /// on one line, which is rejected.
    fn end_statement(&mut self, line: u32) -> Result<(), ParseError> {
        if self.check(TokenKind::Newline) {
            self.skip_blank_lines();
            Ok(())
        } else if self.at_eof() || self.check(TokenKind::RBrace) {
            Ok(())
        } else {
            Err(ParseError::UnterminatedStatement { line })
        }
    }

    fn save_pos(&self) -> usize {
        self.pos
    }

    fn restore_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn expected_error(&self, what: &'static str) -> ParseError {
        let tok = self.current();
        let err = ParseError::Expected {
            expected: what,
            found: token_description(tok.kind),
            line: tok.line,
        };
        self.handler
            .build_error(err.to_string(), Span::point(tok.line, tok.column))
            .emit();
        err
    }
}

fn token_description(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Eof => "end of input",
        TokenKind::Newline => "newline",
        TokenKind::Ident => "an identifier",
        TokenKind::Number => "a number",
        _ => "a token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::*;
    use impc_lex::Lexer;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        let handler = Handler::new();
        let tokens = Lexer::new(source).tokenize(&handler).expect("lex ok");
        parse(tokens, &handler)
    }

    #[test]
    fn parses_minimal_program() {
        let program = parse_source("i32 x { 1 }\nreturn x\n").unwrap();
        assert!(program.structs.is_empty());
        assert!(program.functions.is_empty());
        assert_eq!(program.body.statements.len(), 1);
        assert!(program.body.tail_return.is_some());
    }

    #[test]
    fn rejects_code_after_top_level_return() {
        let err = parse_source("return 1\ni32 x { 2 }\n").unwrap_err();
        assert!(matches!(err, ParseError::CodeAfterReturn { .. }));
    }

    #[test]
    fn rejects_missing_newline_between_statements() {
        let err = parse_source("i32 x { 1 } i32 y { 2 }\nreturn y\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedStatement { .. }));
    }

    #[test]
    fn parses_struct_with_method() {
        let program = parse_source(
            "struct Point {\ni32 x\ni32 y\nfn sum = () -> i32 {\nreturn x + y\n}\n}\nreturn 0\n",
        )
        .unwrap();
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].fields.len(), 2);
        assert_eq!(program.structs[0].methods.len(), 1);
        assert_eq!(program.structs[0].methods[0].receiver, Some(program.structs[0].name));
    }
}
