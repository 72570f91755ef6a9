//! The scanner: source text to tokens, maximal munch, with `//` line and
//! `/* */` block comments skipped. Numeric literals keep their raw text;
//! the parser splits value and suffix.

use ace_ast::{keyword_token, TokenKind};
use ace_error::{Diagnosed, Diagnostic, DiagnosticBag, DiagnosticCode};
use ace_span::{BufferId, SrcLocation};
use unicode_xid::UnicodeXID;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SrcLocation,
    pub text: String,
}

struct Lexer<'a> {
    buffer: BufferId,
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tokens: Vec<Token>,
    bag: DiagnosticBag,
}

impl<'a> Lexer<'a> {
    fn new(buffer: BufferId, text: &'a str) -> Self {
        Self {
            buffer,
            text,
            chars: text.char_indices().collect(),
            pos: 0,
            tokens: Vec::new(),
            bag: DiagnosticBag::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.text.len())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn location_from(&self, start: usize) -> SrcLocation {
        SrcLocation::new(self.buffer, start, self.byte_offset())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let location = self.location_from(start);
        let text = self.text[location.start..location.end].to_string();
        self.tokens.push(Token {
            kind,
            location,
            text,
        });
    }

    fn error(&mut self, start: usize, message: &str) {
        let location = self.location_from(start);
        self.bag.add(
            Diagnostic::error(location, message).with_code(DiagnosticCode::InvalidSyntax),
        );
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.byte_offset();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        self.error(start, "unterminated block comment");
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_ident(&mut self) {
        let start = self.byte_offset();
        while let Some(c) = self.peek() {
            if c.is_xid_continue() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let end = self.byte_offset();
        let text = &self.text[start..end];
        let kind = keyword_token(text).unwrap_or(TokenKind::Ident);
        self.push(kind, start);
    }

    fn lex_number(&mut self) {
        let start = self.byte_offset();
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).map(|c| c.is_ascii_digit()) == Some(true) {
            is_float = true;
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        // `1_i32`, `1i32`, `2.5f32`: an optional suffix, with or without a
        // separating underscore.
        let mut lookahead = self.pos;
        if self.peek() == Some('_') {
            lookahead += 1;
        }
        let suffix_start = lookahead;
        while let Some((_, c)) = self.chars.get(lookahead) {
            if c.is_ascii_alphanumeric() {
                lookahead += 1;
            } else {
                break;
            }
        }
        if lookahead > suffix_start {
            self.pos = lookahead;
        }
        self.push(
            if is_float {
                TokenKind::FloatLit
            } else {
                TokenKind::IntLit
            },
            start,
        );
    }

    fn lex_string(&mut self) {
        let start = self.byte_offset();
        self.bump();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    self.bump();
                }
                Some(_) => {}
                None => {
                    self.error(start, "unterminated string literal");
                    break;
                }
            }
        }
        self.push(TokenKind::StringLit, start);
    }

    fn lex_punct(&mut self) {
        let start = self.byte_offset();
        let first = self.bump().expect("punct lexing needs a char");
        let second = self.peek();
        let third = self.peek_at(1);

        macro_rules! two {
            ($kind:expr) => {{
                self.bump();
                self.push($kind, start);
                return;
            }};
        }

        match (first, second, third) {
            ('<', Some('<'), Some('=')) => {
                self.bump();
                self.bump();
                self.push(TokenKind::LessThanLessThanEquals, start);
                return;
            }
            ('>', Some('>'), Some('=')) => {
                self.bump();
                self.bump();
                self.push(TokenKind::GreaterThanGreaterThanEquals, start);
                return;
            }
            _ => {}
        }

        match (first, second) {
            (':', Some(':')) => two!(TokenKind::ColonColon),
            ('-', Some('>')) => two!(TokenKind::Arrow),
            ('=', Some('=')) => two!(TokenKind::EqualsEquals),
            ('!', Some('=')) => two!(TokenKind::ExclamationEquals),
            ('+', Some('=')) => two!(TokenKind::PlusEquals),
            ('-', Some('=')) => two!(TokenKind::MinusEquals),
            ('*', Some('=')) => two!(TokenKind::AsteriskEquals),
            ('/', Some('=')) => two!(TokenKind::SlashEquals),
            ('%', Some('=')) => two!(TokenKind::PercentEquals),
            ('<', Some('=')) => two!(TokenKind::LessThanEquals),
            ('>', Some('=')) => two!(TokenKind::GreaterThanEquals),
            ('<', Some('<')) => two!(TokenKind::LessThanLessThan),
            ('>', Some('>')) => two!(TokenKind::GreaterThanGreaterThan),
            ('^', Some('=')) => two!(TokenKind::CaretEquals),
            ('&', Some('=')) => two!(TokenKind::AmpersandEquals),
            ('&', Some('&')) => two!(TokenKind::AmpersandAmpersand),
            ('|', Some('=')) => two!(TokenKind::VerticalBarEquals),
            ('|', Some('|')) => two!(TokenKind::VerticalBarVerticalBar),
            _ => {}
        }

        let kind = match first {
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '!' => TokenKind::Exclamation,
            '~' => TokenKind::Tilde,
            '.' => TokenKind::Dot,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '=' => TokenKind::Equals,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '^' => TokenKind::Caret,
            '&' => TokenKind::Ampersand,
            '|' => TokenKind::VerticalBar,
            other => {
                self.error(start, &format!("unexpected character `{}`", other));
                return;
            }
        };
        self.push(kind, start);
    }

    fn run(mut self) -> Diagnosed<Vec<Token>> {
        loop {
            self.skip_trivia();
            let Some(c) = self.peek() else {
                break;
            };
            if c.is_xid_start() || c == '_' {
                self.lex_ident();
            } else if c.is_ascii_digit() {
                self.lex_number();
            } else if c == '"' {
                self.lex_string();
            } else {
                self.lex_punct();
            }
        }
        let end = self.text.len();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            location: SrcLocation::new(self.buffer, end, end),
            text: String::new(),
        });
        Diagnosed::new(self.tokens, self.bag)
    }
}

/// Scan `text` into tokens; always returns a token list ending in `Eof`,
/// plus whatever diagnostics the scan raised.
pub fn lex(buffer: BufferId, text: &str) -> Diagnosed<Vec<Token>> {
    Lexer::new(buffer, text).run()
}
