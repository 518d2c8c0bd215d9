//! Record block lexer.
//!
//! Tokenizes the text of one `records { ... }` chunk into words, quoted
//! strings and structural punctuation. Line structure is not significant:
//! `key: value` pairs and `key {` openers may share a line or be spread
//! over several.
//!
//! `,` and `;` are accepted as optional field separators and `#` starts a
//! comment running to end of line, as in protobuf text format dumps.

// Allow truncation casts - chunk offsets are stored as u32
#![allow(clippy::cast_possible_truncation)]

mod token;

pub use token::{Span, Token, TokenKind};

use alloc::string::String;
use alloc::vec::Vec;

/// Byte offset into chunk text.
pub type ByteOffset = u32;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The input is malformed at this point.
    Error,
    /// Informational; parsing continues.
    Warning,
}

/// A diagnostic message from the lexer or parser.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Location in chunk text.
    pub span: Span,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    #[must_use]
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    #[must_use]
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }
}

/// Record block lexer.
///
/// The lexer never fails: bytes it cannot place become
/// [`TokenKind::Error`] tokens with a diagnostic attached.
pub struct Lexer<'src> {
    /// Chunk text being tokenized.
    source: &'src [u8],
    /// Current byte position.
    pos: usize,
    /// Collected diagnostics.
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given chunk text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire chunk. The last token is always `Eof`.
    #[must_use]
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;
        let Some(b) = self.peek() else {
            return self.token(TokenKind::Eof, start);
        };

        match b {
            b'{' => {
                self.advance();
                self.token(TokenKind::LBrace, start)
            }
            b'}' => {
                self.advance();
                self.token(TokenKind::RBrace, start)
            }
            b':' => {
                self.advance();
                self.token(TokenKind::Colon, start)
            }
            b'"' | b'\'' => self.scan_quoted_string(b),
            _ if is_word_byte(b) => self.scan_word(),
            _ => {
                self.advance();
                let span = self.span_from(start);
                self.error(span, alloc::format!("unexpected byte 0x{b:02x}"));
                self.token(TokenKind::Error, start)
            }
        }
    }

    /// Peek at the current byte without advancing.
    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    /// Advance by one byte and return it.
    fn advance(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    /// Skip whitespace, separators and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | b',' | b';' => {
                    self.advance();
                }
                b'#' => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Add an error diagnostic.
    fn error(&mut self, span: Span, message: String) {
        self.diagnostics.push(Diagnostic::error(span, message));
    }

    /// Make a span from start to current position.
    fn span_from(&self, start: usize) -> Span {
        Span {
            start: start as ByteOffset,
            end: self.pos as ByteOffset,
        }
    }

    /// Make a token from start position to current position.
    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    /// Scan a bare word.
    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(is_word_byte) {
            self.advance();
        }
        self.token(TokenKind::Word, start)
    }

    /// Scan a quoted string literal delimited by `quote`.
    ///
    /// Backslash escapes the next byte. An unterminated literal runs to the
    /// end of the chunk.
    fn scan_quoted_string(&mut self, quote: u8) -> Token {
        let start = self.pos;
        self.advance(); // opening quote

        loop {
            match self.advance() {
                None => {
                    let span = self.span_from(start);
                    self.error(span, "unterminated string literal".into());
                    return self.token(TokenKind::QuotedString, start);
                }
                Some(b'\\') => {
                    self.advance();
                }
                Some(b) if b == quote => {
                    return self.token(TokenKind::QuotedString, start);
                }
                Some(_) => {}
            }
        }
    }
}

/// Bytes that may appear in a bare word.
///
/// Everything that is not whitespace, punctuation of the grammar, or a
/// quote. Non-ASCII bytes are accepted so UTF-8 labels stay intact.
fn is_word_byte(b: u8) -> bool {
    !matches!(
        b,
        b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'}' | b':' | b',' | b';' | b'#' | b'"' | b'\''
    ) && (b.is_ascii_graphic() || b >= 0x80)
}

/// Iterator implementation for convenient token iteration.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
