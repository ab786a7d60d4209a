//! Character stream to token stream.
//!
//! A single-pass scanner over the states `{INITIAL, IDENTIFIER, NUMBER,
//! COMMENT}`, direct-coded as one function per token shape rather than as
//! an explicit transition table.

use impc_util::{Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{keyword_from_ident, Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    token_start: usize,
    token_start_line: u32,
    token_start_column: u32,
    /// Kind of the last token actually emitted (NEWLINE included), used to
    /// decide whether a `-` folds into the next number literal.
    previous_kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            previous_kind: None,
        }
    }

    /// Scans the entire source to completion, reporting the first error (if
    /// any) to `handler`. Per the error-handling design there is no
    /// recovery: scanning stops at the first malformed token.
    pub fn tokenize(mut self, handler: &Handler) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token() {
                Ok(token) => {
                    let at_eof = token.kind == TokenKind::Eof;
                    self.previous_kind = Some(token.kind);
                    tokens.push(token);
                    if at_eof {
                        return Ok(tokens);
                    }
                }
                Err(err) => {
                    let span = Span::point(self.token_start_line, self.token_start_column);
                    handler.build_error(err.to_string(), span).emit();
                    return Err(err);
                }
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.make(TokenKind::Eof, ""));
        }

        let c = self.cursor.current_char();
        match c {
            '\n' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Newline, "\n"))
            }
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),
            '+' => self.single(TokenKind::Plus),
            '*' => self.single(TokenKind::Star),
            '=' => self.lex_equals(),
            '!' => self.lex_bang(),
            '-' => self.lex_minus(),
            c if c.is_ascii_alphabetic() => Ok(self.lex_identifier()),
            c if c.is_ascii_digit() => self.lex_number(false),
            c => Err(LexError::UnexpectedChar {
                character: c,
                line: self.token_start_line,
            }),
        }
    }

    fn single(&mut self, kind: TokenKind) -> Result<Token, LexError> {
        let text = self.cursor.current_char().to_string();
        self.cursor.advance();
        Ok(self.make(kind, &text))
    }

    /// `==` takes priority over `=`.
    fn lex_equals(&mut self) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Ok(self.make(TokenKind::EqEq, "=="))
        } else {
            Ok(self.make(TokenKind::Assign, "="))
        }
    }

    /// `!=` takes priority over `!`.
    fn lex_bang(&mut self) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Ok(self.make(TokenKind::Neq, "!="))
        } else {
            Ok(self.make(TokenKind::Not, "!"))
        }
    }

    /// `->` takes priority over both subtraction and the `-`-folds-into-
    /// number rule; otherwise `-` is folded into the following number when
    /// the previous emitted token cannot terminate an operand, or else is
    /// subtraction.
    fn lex_minus(&mut self) -> Result<Token, LexError> {
        if self.cursor.peek_char(1) == '>' {
            self.cursor.advance();
            self.cursor.advance();
            return Ok(self.make(TokenKind::Arrow, "->"));
        }

        let previous_allows_operand = self
            .previous_kind
            .map(TokenKind::starts_operand_position)
            .unwrap_or(true);

        if previous_allows_operand && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            return self.lex_number(true);
        }

        self.cursor.advance();
        Ok(self.make(TokenKind::Minus, "-"))
    }

    fn lex_identifier(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_alphanumeric() || self.cursor.current_char() == '_' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(self.token_start);
        let kind = keyword_from_ident(text).unwrap_or(TokenKind::Ident);
        self.make(kind, text)
    }

    /// `has_sign` is true when the caller already consumed a leading `-`.
    fn lex_number(&mut self, has_sign: bool) -> Result<Token, LexError> {
        let digits_start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.position() == digits_start {
            return Err(LexError::MalformedNumber {
                line: self.token_start_line,
            });
        }
        let _ = has_sign;
        let text = self.cursor.slice_from(self.token_start);
        Ok(self.make(TokenKind::Number, text))
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.cursor.skip_inline_whitespace();
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
                continue;
            }
            break;
        }
    }

    fn make(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(
            kind,
            Symbol::intern(lexeme),
            self.token_start_line,
            self.token_start_column,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let handler = Handler::new();
        Lexer::new(source)
            .tokenize(&handler)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn skips_inline_whitespace_and_comments() {
        assert_eq!(
            kinds("i32  a // comment\n"),
            vec![
                TokenKind::I32Type,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keywords_are_promoted() {
        assert_eq!(
            kinds("struct fn return if else mut true false bool i64"),
            vec![
                TokenKind::Struct,
                TokenKind::Fn,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Mut,
                TokenKind::True,
                TokenKind::False,
                TokenKind::BoolType,
                TokenKind::I64Type,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        assert_eq!(kinds("=="), vec![TokenKind::EqEq, TokenKind::Eof]);
        assert_eq!(kinds("!="), vec![TokenKind::Neq, TokenKind::Eof]);
        assert_eq!(kinds("="), vec![TokenKind::Assign, TokenKind::Eof]);
        assert_eq!(kinds("!"), vec![TokenKind::Not, TokenKind::Eof]);
    }

    #[test]
    fn minus_after_operand_is_subtraction() {
        let handler = Handler::new();
        let tokens = Lexer::new("a - 5").tokenize(&handler).unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Ident,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[2].lexeme.as_str(), "5");
    }

    #[test]
    fn minus_after_assign_folds_into_number() {
        let handler = Handler::new();
        let tokens = Lexer::new("a = -5").tokenize(&handler).unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[2].lexeme.as_str(), "-5");
    }

    #[test]
    fn arrow_wins_over_minus_folding() {
        assert_eq!(kinds("->"), vec![TokenKind::Arrow, TokenKind::Eof]);
        assert_eq!(
            kinds("fn f = () -> i32 { }"),
            vec![
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::I32Type,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn minus_at_start_of_input_folds_into_number() {
        let handler = Handler::new();
        let tokens = Lexer::new("-7").tokenize(&handler).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme.as_str(), "-7");
    }

    #[test]
    fn unexpected_character_is_reported() {
        let handler = Handler::new();
        let result = Lexer::new("i32 a # b").tokenize(&handler);
        assert!(result.is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn newline_is_a_significant_token() {
        assert_eq!(
            kinds("i32 a\ni32 b"),
            vec![
                TokenKind::I32Type,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::I32Type,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }
}
