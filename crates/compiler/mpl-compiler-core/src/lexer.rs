//! Lexer (tokenizer) for MPL source text.

use crate::ast::Span;
use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `@name`; the payload is the text after `@`.
    BlockKeyword(String),
    Ident(String),
    Number(f64),

    LBrace,    // {
    RBrace,    // }
    Colon,     // :
    Semicolon, // ;
    Comma,     // ,

    Eof,
}

impl TokenKind {
    /// Short description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::BlockKeyword(k) => format!("'@{k}'"),
            TokenKind::Ident(name) => format!("'{name}'"),
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Lexer state.
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize all input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn span_from(&self, start: usize, line: usize, column: usize) -> Span {
        Span::new(start, self.pos, line, column)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.input[self.pos..].chars();
        it.next();
        it.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.pos = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and `//` / `#` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.peek_second() == Some('/') => self.skip_line(),
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.next_char();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.next_char();
        }
        &self.input[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_trivia();

        let start = self.pos;
        let line = self.line;
        let column = self.column;

        let Some(c) = self.peek_char() else {
            return Ok(Token::new(
                TokenKind::Eof,
                Span::new(self.pos, self.pos, line, column),
            ));
        };

        let kind = match c {
            '{' | '}' | ':' | ';' | ',' => {
                self.next_char();
                match c {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    _ => TokenKind::Comma,
                }
            }
            '@' => {
                self.next_char();
                let word = self.take_while(is_ident_continue);
                if word.is_empty() {
                    return Err(CompileError::syntax(
                        self.span_from(start, line, column),
                        "expected block keyword after '@'",
                    ));
                }
                TokenKind::BlockKeyword(word.to_string())
            }
            c if c.is_ascii_digit() => self.number(start, line, column)?,
            c if is_ident_start(c) => TokenKind::Ident(self.take_while(is_ident_continue).to_string()),
            other => {
                self.next_char();
                return Err(CompileError::syntax(
                    self.span_from(start, line, column),
                    format!("unexpected character '{other}'"),
                ));
            }
        };

        Ok(Token::new(kind, self.span_from(start, line, column)))
    }

    /// `digits ('.' digits)?`
    fn number(&mut self, start: usize, line: usize, column: usize) -> Result<TokenKind, CompileError> {
        self.take_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.next_char();
            if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(CompileError::syntax(
                    self.span_from(start, line, column),
                    "expected digits after decimal point",
                ));
            }
        }
        let text = &self.input[start..self.pos];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TokenKind::Number(n)),
            _ => Err(CompileError::syntax(
                self.span_from(start, line, column),
                format!("number '{text}' is out of range"),
            )),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
