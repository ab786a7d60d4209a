//! Statement parsing: variable declarations, assignments, and `if`.

use impc_lex::TokenKind;

use crate::ast::{Assign, If, Stmt, VarDecl};
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::I32Type | TokenKind::I64Type | TokenKind::BoolType => {
                self.parse_var_decl().map(Stmt::VarDecl)
            }
            TokenKind::Ident if self.struct_names.contains(&self.current().lexeme) => {
                self.parse_var_decl().map(Stmt::VarDecl)
            }
            TokenKind::Ident => self.parse_assign().map(Stmt::Assign),
            TokenKind::If => self.parse_if_stmt().map(Stmt::If),
            _ => Err(self.expected_error("a statement")),
        }
    }

    /// `type ["mut"] IDENT "{" expr { "," expr } "}"`
    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let mutable = self.matches(TokenKind::Mut);
        let name = self.expect(TokenKind::Ident, "a variable name")?.lexeme;
        let init = self.parse_brace_expr_list()?;
        let span = start.to(self.previous_span());
        Ok(VarDecl {
            ty,
            mutable,
            name,
            init,
            span,
        })
    }

    /// `IDENT { "." IDENT } "=" expr`
    fn parse_assign(&mut self) -> Result<Assign, ParseError> {
        let start = self.current_span();
        let mut path = vec![self.expect(TokenKind::Ident, "a variable name")?.lexeme];
        while self.check(TokenKind::Dot) {
            self.advance();
            path.push(self.expect(TokenKind::Ident, "a field name")?.lexeme);
        }
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expr()?;
        let span = start.to(self.previous_span());
        Ok(Assign { path, value, span })
    }

    /// `"if" expr block [ "else" ( if_stmt | block ) ]`
    ///
    /// Whether a trailing `else` belongs to *this* `if` is only knowable
    /// after skipping the blank lines between the closing `}` of the `then`
    /// block and whatever comes next — but skipping them unconditionally
    /// would also swallow the statement-terminating newline when there is
    /// no `else` at all. So the newline run is skipped tentatively: if an
    /// `else` turns up, the skip is kept; otherwise the cursor is rewound
    /// and `end_statement` sees the newlines itself.
    pub(crate) fn parse_if_stmt(&mut self) -> Result<If, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::If, "'if'")?;
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;

        let checkpoint = self.save_pos();
        self.skip_blank_lines();
        let else_block = if self.matches(TokenKind::Else) {
            if self.check(TokenKind::If) {
                let nested_span = self.current_span();
                let nested = self.parse_if_stmt()?;
                Some(crate::ast::Block {
                    statements: vec![Stmt::If(nested)],
                    tail_return: None,
                    span: nested_span.to(self.previous_span()),
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            self.restore_pos(checkpoint);
            None
        };

        let span = start.to(self.previous_span());
        Ok(If {
            condition,
            then_block,
            else_block,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use impc_util::Handler;

    use super::*;
    use crate::ast::Program;
    use impc_lex::Lexer;

    fn parse_source(source: &str) -> Program {
        let handler = Handler::new();
        let tokens = Lexer::new(source).tokenize(&handler).unwrap();
        crate::parse(tokens, &handler).unwrap()
    }

    #[test]
    fn else_binds_to_nearest_if_across_blank_lines() {
        let program = parse_source("if true {\ni32 x { 1 }\n}\n\nelse {\ni32 y { 2 }\n}\nreturn 0\n");
        let Stmt::If(if_stmt) = &program.body.statements[0] else {
            panic!("expected if statement");
        };
        assert!(if_stmt.else_block.is_some());
    }

    #[test]
    fn if_without_else_leaves_following_statement_intact() {
        let program = parse_source("if true {\ni32 x { 1 }\n}\ni32 y { 2 }\nreturn y\n");
        assert_eq!(program.body.statements.len(), 2);
        assert!(matches!(program.body.statements[1], Stmt::VarDecl(_)));
    }

    #[test]
    fn else_if_chains() {
        let program =
            parse_source("if true {\nreturn 1\n} else if false {\nreturn 2\n} else {\nreturn 3\n}\n");
        let Stmt::If(outer) = &program.body.statements[0] else {
            panic!("expected if statement");
        };
        let else_block = outer.else_block.as_ref().unwrap();
        assert!(matches!(else_block.statements[0], Stmt::If(_)));
    }
}
