//! Byte (well, UTF-8 rune) stream to token stream conversion.
//!
//! The tokenizer keeps exactly one rune of unread lookahead in `ch`. Every
//! `scan` call consumes whitespace, snapshots the current position as the
//! start of the next token, and dispatches on the lookahead rune without
//! ever discarding an already-loaded, unclassified character.

use std::fmt;
use std::str::Chars;

use crate::reference::{Position, Span};
use crate::token::{lookup_keyword, Token};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{pos}: {message}")]
pub struct LexError {
    pub pos: Position,
    pub message: String,
}

impl LexError {
    fn new(pos: Position, message: impl Into<String>) -> Self {
        LexError {
            pos,
            message: message.into(),
        }
    }
}

/// A single scanned token: its span, kind and literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub span: Span,
    pub token: Token,
    pub literal: String,
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.token, self.literal)
    }
}

pub struct Tokenizer<'a> {
    chars: Chars<'a>,
    ch: Option<char>,
    pos: Position,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let ch = chars.next();
        Tokenizer {
            chars,
            ch,
            pos: Position::start(),
        }
    }

    /// Scans and returns the next lexeme. Returns `Token::Eof` once (and
    /// every time after) the input is exhausted; callers stop once they see
    /// it.
    pub fn scan(&mut self) -> Result<Lexeme, LexError> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.ch else {
            return Ok(Lexeme {
                span: Span::at(start),
                token: Token::Eof,
                literal: String::new(),
            });
        };

        if is_letter(c) {
            let literal = self.scan_identifier();
            let token = lookup_keyword(&literal);
            return Ok(Lexeme {
                span: Span::from_positions(start, self.pos),
                token,
                literal,
            });
        }

        if is_decimal(c) || (c == '.' && self.peek().is_some_and(is_decimal)) {
            let (token, literal) = self.scan_number();
            return Ok(Lexeme {
                span: Span::from_positions(start, self.pos),
                token,
                literal,
            });
        }

        let (token, literal) = match c {
            '"' => {
                let literal = self.scan_string(start)?;
                (Token::String, literal)
            }
            '/' if matches!(self.peek(), Some('/') | Some('*')) => {
                let literal = self.scan_comment(start)?;
                (Token::Comment, literal)
            }
            _ => {
                self.bump();
                match c {
                    '=' => (Token::Assign, "=".to_string()),
                    '?' => (Token::Nullable, "?".to_string()),
                    '(' => (Token::Lparen, "(".to_string()),
                    ')' => (Token::Rparen, ")".to_string()),
                    '[' => (Token::Lbrack, "[".to_string()),
                    ']' => (Token::Rbrack, "]".to_string()),
                    '{' => (Token::Lbrace, "{".to_string()),
                    '}' => (Token::Rbrace, "}".to_string()),
                    ':' => (Token::Colon, ":".to_string()),
                    ',' => (Token::Comma, ",".to_string()),
                    '.' => (Token::Period, ".".to_string()),
                    '@' => (Token::At, "@".to_string()),
                    other => (Token::Illegal, other.to_string()),
                }
            }
        };

        Ok(Lexeme {
            span: Span::from_positions(start, self.pos),
            token,
            literal,
        })
    }

    fn bump(&mut self) -> Option<char> {
        let prev = self.ch;
        if let Some(c) = prev {
            if c == '\n' {
                self.pos.line += 1;
                self.pos.offset = 0;
            } else {
                self.pos.offset += 1;
            }
        }
        self.ch = self.chars.next();
        prev
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(' ') | Some('\t') | Some('\r') | Some('\n')) {
            self.bump();
        }
    }

    fn scan_identifier(&mut self) -> String {
        let mut buf = String::new();
        while let Some(c) = self.ch {
            if is_letter(c) || is_digit(c) {
                buf.push(c);
                self.bump();
            } else {
                break;
            }
        }
        buf
    }

    fn scan_number(&mut self) -> (Token, String) {
        let mut buf = String::new();
        let mut token = Token::Int;
        if self.ch == Some('.') {
            token = Token::Float;
        }

        while let Some(c) = self.ch {
            if is_decimal(c) {
                buf.push(c);
                self.bump();
            } else if c == '.' && token != Token::Float {
                token = Token::Float;
                buf.push('.');
                self.bump();
            } else {
                break;
            }
        }

        (token, buf)
    }

    /// Must be called with `self.ch == Some('"')`.
    fn scan_string(&mut self, start: Position) -> Result<String, LexError> {
        self.bump(); // consume opening quote
        let mut buf = String::new();
        loop {
            match self.ch {
                None | Some('\n') => {
                    return Err(LexError::new(
                        start,
                        "string literal expects to be closed with the \" character",
                    ))
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') if self.peek() == Some('"') => {
                    buf.push('"');
                    self.bump();
                    self.bump();
                }
                Some(c) => {
                    buf.push(c);
                    self.bump();
                }
            }
        }
        Ok(buf)
    }

    /// Must be called with `self.ch == Some('/')` and the next rune being
    /// `/` or `*`.
    fn scan_comment(&mut self, start: Position) -> Result<String, LexError> {
        self.bump(); // consume first '/'
        match self.ch {
            Some('/') => {
                self.bump();
                let mut buf = String::new();
                while let Some(c) = self.ch {
                    if c == '\n' {
                        break;
                    }
                    buf.push(c);
                    self.bump();
                }
                Ok(buf.trim().to_string())
            }
            Some('*') => {
                self.bump();
                let mut buf = String::new();
                loop {
                    match self.ch {
                        None => return Err(LexError::new(start, "comment not terminated")),
                        Some('*') if self.peek() == Some('/') => {
                            self.bump();
                            self.bump();
                            break;
                        }
                        Some(c) => {
                            buf.push(c);
                            self.bump();
                        }
                    }
                }
                Ok(buf.trim().to_string())
            }
            _ => unreachable!("scan_comment called without a comment lookahead"),
        }
    }
}

/// UTF-8 letter or underscore.
fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// ASCII 0-9.
fn is_decimal(c: char) -> bool {
    c.is_ascii_digit()
}

/// ASCII or unicode digit, used for identifier continuation characters.
fn is_digit(c: char) -> bool {
    is_decimal(c) || c.is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(src: &str) -> Vec<(Token, String)> {
        let mut t = Tokenizer::new(src);
        let mut out = Vec::new();
        loop {
            let lex = t.scan().expect("no lex errors in these fixtures");
            let done = lex.token == Token::Eof;
            out.push((lex.token, lex.literal));
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_struct_header() {
        let toks = scan_all("struct Foo {");
        assert_eq!(
            toks,
            vec![
                (Token::Struct, "struct".into()),
                (Token::Ident, "Foo".into()),
                (Token::Lbrace, "{".into()),
                (Token::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn scans_adjacent_punctuation_without_losing_characters() {
        let toks = scan_all("list(string,bool)");
        assert_eq!(
            toks,
            vec![
                (Token::Ident, "list".into()),
                (Token::Lparen, "(".into()),
                (Token::Ident, "string".into()),
                (Token::Comma, ",".into()),
                (Token::Ident, "bool".into()),
                (Token::Rparen, ")".into()),
                (Token::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn scans_float_with_leading_dot() {
        let toks = scan_all(".8");
        assert_eq!(toks[0], (Token::Float, ".8".into()));
    }

    #[test]
    fn multiple_dots_are_not_merged() {
        let toks = scan_all("1.2.3");
        assert_eq!(
            toks,
            vec![
                (Token::Float, "1.2".into()),
                (Token::Period, ".".into()),
                (Token::Int, "3".into()),
                (Token::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn scans_string_with_escaped_quote() {
        let toks = scan_all(r#""hello \"world\"""#);
        assert_eq!(toks[0], (Token::String, "hello \"world\"".into()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut t = Tokenizer::new("\"abc");
        assert!(t.scan().is_err());
    }

    #[test]
    fn line_comment_trims_and_stops_before_newline() {
        let toks = scan_all("//  hi  \nstruct");
        assert_eq!(toks[0], (Token::Comment, "hi".into()));
        assert_eq!(toks[1], (Token::Struct, "struct".into()));
    }

    #[test]
    fn block_comment_spans_lines() {
        let toks = scan_all("/* a\nb */ enum");
        assert_eq!(toks[0], (Token::Comment, "a\nb".into()));
        assert_eq!(toks[1], (Token::Enum, "enum".into()));
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let mut t = Tokenizer::new("/* never closed");
        assert!(t.scan().is_err());
    }

    #[test]
    fn tracks_line_and_offset_across_newlines() {
        let mut t = Tokenizer::new("a\nb");
        let first = t.scan().unwrap();
        assert_eq!(first.span.line_start, 1);
        let second = t.scan().unwrap();
        assert_eq!(second.span.line_start, 2);
        assert_eq!(second.span.start, 0);
    }

    #[test]
    fn unicode_identifier() {
        let toks = scan_all("café string");
        assert_eq!(toks[0], (Token::Ident, "café".into()));
    }
}
