//! Expression parsing.
//!
//! The grammar gives every binary operator (`+ - * == !=`) the same
//! precedence, left-associative — a deliberate simplification relative to
//! most languages' layered precedence tables. `factor` only ever wraps a
//! `primary` in zero or more `!`; there is no unary minus, since a leading
//! `-` on a numeric literal is folded into the `NUMBER` token itself by the
//! lexer.

use std::cell::Cell;

use impc_lex::TokenKind;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// `factor { ("+" | "-" | "*" | "==" | "!=") factor }`
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::Neq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
                ty: Cell::new(None),
            };
        }
        Ok(lhs)
    }

    /// `"!" factor | primary`
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Not) {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_factor()?;
            let span = start.to(operand.span());
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_primary()
    }

    /// `NUMBER | "true" | "false" | IDENT [ call_args | struct_init | ("." IDENT)* [call_args] ]`
    ///
    /// The four shapes a bare identifier can take are resolved with one
    /// token of lookahead after consuming the dotted chain: a trailing `(`
    /// makes it a call (a plain function call if the chain was a single
    /// segment, a method call on the preceding segments otherwise), a
    /// trailing `{` right after the identifier makes it an inline struct
    /// literal, and anything else leaves it as a variable or field read.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.current();
        let span = self.current_span();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let value = tok.lexeme.as_str().parse::<i64>().map_err(|_| {
                    let err = ParseError::Expected {
                        expected: "a valid number literal",
                        found: "a malformed one",
                        line: tok.line,
                    };
                    self.handler.build_error(err.to_string(), span).emit();
                    err
                })?;
                Ok(Expr::Number { value, span })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Boolean { value: true, span })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Boolean { value: false, span })
            }
            TokenKind::Ident => self.parse_ident_expr(),
            _ => Err(self.expected_error("an expression")),
        }
    }

    fn parse_ident_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let name = self.advance().lexeme;

        if self.check(TokenKind::LParen) {
            let args = self.parse_call_args()?;
            let span = start.to(self.previous_span());
            return Ok(Expr::FunctionCall { name, args, span });
        }

        if self.check(TokenKind::LBrace) {
            let fields = self.parse_brace_expr_list()?;
            let span = start.to(self.previous_span());
            return Ok(Expr::StructInit {
                name,
                fields,
                span,
            });
        }

        let mut path = vec![name];
        while self.check(TokenKind::Dot) {
            self.advance();
            let segment = self.expect(TokenKind::Ident, "a field or method name")?;
            path.push(segment.lexeme);
        }

        if path.len() == 1 {
            return Ok(Expr::Identifier {
                name: path[0],
                span: start,
            });
        }

        if self.check(TokenKind::LParen) {
            let method = path.pop().expect("path has at least two segments");
            let args = self.parse_call_args()?;
            let span = start.to(self.previous_span());
            return Ok(Expr::MethodCall {
                receiver_path: path,
                method,
                args,
                span,
            });
        }

        let span = start.to(self.previous_span());
        Ok(Expr::FieldAccess { path, span })
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use impc_util::Handler;

    use super::*;
    use impc_lex::Lexer;

    fn parse_expr_str(source: &str) -> Expr {
        let handler = Handler::new();
        let tokens = Lexer::new(source).tokenize(&handler).unwrap();
        let mut parser = Parser::new(tokens, &handler);
        parser.parse_expr().unwrap()
    }

    #[test]
    fn operators_are_uniformly_left_associative() {
        // `a - b - c` must parse as `(a - b) - c`, matching the uniform
        // precedence, not a +/- vs */== split.
        let expr = parse_expr_str("a - b - c");
        match expr {
            Expr::Binary { op: BinaryOp::Sub, lhs, .. } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("expected outer subtraction, got {other:?}"),
        }
    }

    #[test]
    fn plus_and_star_share_one_precedence_level() {
        // `a + b * c` parses left-to-right as `(a + b) * c`, NOT as
        // `a + (b * c)` the way a conventional precedence table would.
        let expr = parse_expr_str("a + b * c");
        match expr {
            Expr::Binary { op: BinaryOp::Mul, lhs, .. } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("expected outer multiplication, got {other:?}"),
        }
    }

    #[test]
    fn disambiguates_call_struct_init_and_field_chain() {
        assert!(matches!(parse_expr_str("foo(1, 2)"), Expr::FunctionCall { .. }));
        assert!(matches!(parse_expr_str("Point{1, 2}"), Expr::StructInit { .. }));
        assert!(matches!(parse_expr_str("p.x"), Expr::FieldAccess { .. }));
        assert!(matches!(parse_expr_str("p.chain.method(1)"), Expr::MethodCall { .. }));
        assert!(matches!(parse_expr_str("x"), Expr::Identifier { .. }));
    }
}
