//! Top-level item parsing: struct and function declarations.

use impc_lex::TokenKind;
use impc_util::Symbol;

use crate::ast::{FieldDecl, FunctionDecl, Param, StructDecl};
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// `"struct" IDENT "{" { field_decl | function_decl } "}"`
    ///
    /// A member function is distinguished from a field by the leading `fn`
    /// keyword; fields otherwise share the ordinary statement terminator
    /// rule, methods close on their own `}` and don't need one.
    pub(crate) fn parse_struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::Struct, "'struct'")?;
        let name = self.expect(TokenKind::Ident, "a struct name")?.lexeme;
        self.struct_names.insert(name);
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_blank_lines();

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Fn) {
                methods.push(self.parse_function_decl(Some(name))?);
            } else {
                let field = self.parse_field_decl()?;
                self.end_statement(field.span.line)?;
                fields.push(field);
            }
            self.skip_blank_lines();
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        let span = start.to(self.previous_span());
        Ok(StructDecl {
            name,
            fields,
            methods,
            span,
        })
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl, ParseError> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let mutable = self.matches(TokenKind::Mut);
        let name = self.expect(TokenKind::Ident, "a field name")?.lexeme;
        let span = start.to(self.previous_span());
        Ok(FieldDecl {
            ty,
            mutable,
            name,
            span,
        })
    }

    /// `"fn" IDENT "(" [ param { "," param } ] ")" "->" type block`
    ///
    /// `receiver` is `Some(struct_name)` when this function was found inside
    /// a `struct` body; the generator uses it to add the implicit receiver
    /// parameter and to mangle the emitted symbol name.
    pub(crate) fn parse_function_decl(
        &mut self,
        receiver: Option<Symbol>,
    ) -> Result<FunctionDecl, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::Fn, "'fn'")?;
        let name = self.expect(TokenKind::Ident, "a function name")?.lexeme;
        self.expect(TokenKind::Assign, "'='")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.parse_param()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                params.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Arrow, "'->'")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;
        let span = start.to(self.previous_span());
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            span,
            receiver,
        })
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let name = self.expect(TokenKind::Ident, "a parameter name")?.lexeme;
        let span = start.to(self.previous_span());
        Ok(Param { ty, name, span })
    }
}

#[cfg(test)]
mod tests {
    use impc_util::Handler;

    use super::*;
    use impc_lex::Lexer;

    fn parse_source(source: &str) -> crate::ast::Program {
        let handler = Handler::new();
        let tokens = Lexer::new(source).tokenize(&handler).unwrap();
        crate::parse(tokens, &handler).unwrap()
    }

    #[test]
    fn parses_free_function() {
        let program = parse_source("fn add = (i32 a, i32 b) -> i32 {\nreturn a + b\n}\nreturn 0\n");
        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.params.len(), 2);
        assert!(f.receiver.is_none());
    }

    #[test]
    fn struct_fields_and_methods_interleave_freely() {
        let program = parse_source(
            "struct Counter {\ni32 mut count\nfn increment = () -> i32 {\nreturn count + 1\n}\nbool active\n}\nreturn 0\n",
        );
        let s = &program.structs[0];
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.methods.len(), 1);
    }
}
