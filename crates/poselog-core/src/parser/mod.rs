//! Record block parser.
//!
//! Parses the text of one chunk into a [`RawBlock`] tree:
//!
//! ```text
//! block  := field*
//! field  := key ':' value
//!         | key ':'? '{' block '}'
//! key    := WORD | QUOTED
//! value  := WORD | QUOTED
//! ```
//!
//! The parser is lenient. Stray tokens are skipped with a warning, an
//! unmatched `}` at the top level ends the chunk, and running out of input
//! inside a nested block closes every open block with the fields read so
//! far. Nothing here fails; problems surface as diagnostics.
//!
//! Nesting is tracked on an explicit stack, so depth is bounded only by
//! memory.

// Allow truncation casts - chunk offsets are stored as u32
#![allow(clippy::cast_possible_truncation)]

use crate::ast::{Field, Ident, ParsedChunk, RawBlock, Scalar, Value};
use crate::lexer::{ByteOffset, Diagnostic, Lexer, Span, Token, TokenKind};
use alloc::format;
use alloc::vec::Vec;

/// Record block parser.
pub struct Parser<'src> {
    /// Chunk text (for extracting token content).
    source: &'src str,
    /// Tokens from lexer.
    tokens: Vec<Token>,
    /// Current position in token stream.
    pos: usize,
    /// Collected diagnostics (lexer + parser).
    diagnostics: Vec<Diagnostic>,
}

/// A block whose closing brace has not been seen yet.
struct OpenBlock {
    /// Field name, `None` for a brace that had no key in front of it.
    key: Option<Ident>,
    /// The enclosing block, restored when this one closes.
    parent: RawBlock,
}

impl<'src> Parser<'src> {
    /// Create a new parser for the given chunk text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let lexer = Lexer::new(source);
        let (tokens, lexer_diagnostics) = lexer.tokenize();
        Self {
            source,
            tokens,
            pos: 0,
            diagnostics: lexer_diagnostics,
        }
    }

    /// Parse the whole chunk.
    #[must_use]
    pub fn parse_chunk(mut self) -> ParsedChunk {
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut current = RawBlock::new(Span::new(0, self.source.len() as ByteOffset));

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::RBrace => {
                    self.advance();
                    match stack.pop() {
                        Some(open) => close_block(&mut current, open, token.span.end),
                        None => {
                            self.diagnostics.push(Diagnostic::warning(
                                token.span,
                                "unmatched `}` ends the record",
                            ));
                            break;
                        }
                    }
                }
                TokenKind::LBrace => {
                    self.advance();
                    self.diagnostics.push(Diagnostic::warning(
                        token.span,
                        "block without a field name is ignored",
                    ));
                    stack.push(open_block(&mut current, None, token.span.start));
                }
                TokenKind::Word | TokenKind::QuotedString => {
                    self.advance();
                    let key = self.ident(token);
                    if let Some(brace) = self.block_opener() {
                        stack.push(open_block(&mut current, Some(key), brace.span.start));
                    } else if self.check(TokenKind::Colon) {
                        let colon = self.advance();
                        if self.peek().kind.is_value() {
                            let value = self.advance();
                            current.push(Field::new(key, Value::Scalar(self.scalar(value))));
                        } else {
                            let message = format!("missing value for `{}`", key.name);
                            self.diagnostics
                                .push(Diagnostic::warning(colon.span, message));
                        }
                    } else {
                        let message = format!("ignoring stray `{}`", key.name);
                        self.diagnostics
                            .push(Diagnostic::warning(key.span, message));
                    }
                }
                TokenKind::Colon => {
                    self.advance();
                    self.diagnostics
                        .push(Diagnostic::warning(token.span, "ignoring stray `:`"));
                }
                TokenKind::Error => {
                    // Already reported by the lexer.
                    self.advance();
                }
            }
        }

        if !stack.is_empty() {
            let end = self.source.len() as ByteOffset;
            while let Some(open) = stack.pop() {
                let name = open.key.as_ref().map_or("", |k| k.name.as_str());
                let message = format!("input ended inside `{name}` block");
                self.diagnostics
                    .push(Diagnostic::warning(Span::new(current.span.start, end), message));
                close_block(&mut current, open, end);
            }
        }

        ParsedChunk {
            root: current,
            diagnostics: self.diagnostics,
        }
    }

    // === Token access methods ===

    /// Get the EOF token for this source.
    fn eof_token(&self) -> Token {
        let end = self.source.len() as ByteOffset;
        Token::new(TokenKind::Eof, Span::new(end, end))
    }

    /// Peek at current token.
    fn peek(&self) -> Token {
        self.tokens
            .get(self.pos)
            .copied()
            .unwrap_or_else(|| self.eof_token())
    }

    /// Peek at token n positions ahead.
    fn peek_nth(&self, n: usize) -> Token {
        self.tokens
            .get(self.pos + n)
            .copied()
            .unwrap_or_else(|| self.eof_token())
    }

    /// Advance and return current token.
    fn advance(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Check if current token is of given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume `{` or `: {` after a key, returning the brace token.
    fn block_opener(&mut self) -> Option<Token> {
        if self.check(TokenKind::LBrace) {
            return Some(self.advance());
        }
        if self.check(TokenKind::Colon) && self.peek_nth(1).kind == TokenKind::LBrace {
            self.advance();
            return Some(self.advance());
        }
        None
    }

    /// Build a field name from a word or quoted token.
    fn ident(&self, token: Token) -> Ident {
        let name = match token.kind {
            TokenKind::QuotedString => Scalar::quoted(token.span.text(self.source), token.span).text,
            _ => token.span.text(self.source).into(),
        };
        Ident::new(name, token.span)
    }

    /// Build a scalar from a word or quoted token.
    fn scalar(&self, token: Token) -> Scalar {
        let text = token.span.text(self.source);
        match token.kind {
            TokenKind::QuotedString => Scalar::quoted(text, token.span),
            _ => Scalar::bare(text, token.span),
        }
    }
}

/// Start a nested block: the current block becomes its parent.
fn open_block(current: &mut RawBlock, key: Option<Ident>, start: ByteOffset) -> OpenBlock {
    let parent = core::mem::replace(current, RawBlock::new(Span::new(start, start)));
    OpenBlock { key, parent }
}

/// Finish the current block and attach it to its parent.
fn close_block(current: &mut RawBlock, open: OpenBlock, end: ByteOffset) {
    let mut child = core::mem::replace(current, open.parent);
    child.span.end = end;
    if let Some(key) = open.key {
        current.push(Field::new(key, Value::Block(child)));
    }
}

/// Parse one chunk of record text.
#[must_use]
pub fn parse_chunk(source: &str) -> ParsedChunk {
    Parser::new(source).parse_chunk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Severity;

    fn text<'a>(block: &'a RawBlock, key: &str) -> Option<&'a str> {
        block.scalar(key).map(Scalar::as_str)
    }

    #[test]
    fn test_parse_empty_chunk() {
        let chunk = parse_chunk("");
        assert!(chunk.root.is_empty());
        assert!(chunk.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_scalars() {
        let chunk = parse_chunk(
            "
            recordTimeStamp: 1024
            deviceType: DEVICE_TYPE_HMD
            ",
        );
        assert_eq!(text(&chunk.root, "recordTimeStamp"), Some("1024"));
        assert_eq!(text(&chunk.root, "deviceType"), Some("DEVICE_TYPE_HMD"));
        assert!(chunk.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_multiline_nested() {
        let chunk = parse_chunk(
            "
            deviceType: DEVICE_TYPE_HMD
            pose {
              position {
                x: 0.1
                y: 1.6
                z: -0.2
              }
              orientation {
                w: 1
                x: 0
                y: 0
                z: 0
              }
            }
            ",
        );
        let pose = chunk.root.block("pose").unwrap();
        let position = pose.block("position").unwrap();
        assert_eq!(text(position, "y"), Some("1.6"));
        assert_eq!(text(position, "z"), Some("-0.2"));
        assert_eq!(text(pose.block("orientation").unwrap(), "w"), Some("1"));
        assert_eq!(chunk.root.depth(), 3);
        assert!(chunk.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_single_line_nested() {
        let chunk = parse_chunk(
            "deviceType: DEVICE_TYPE_HMD pose { position { x: 1.0 y: 2.0 z: 3.0 } orientation { w: 1.0 x: 0.0 y: 0.0 z: 0.0 } }",
        );
        let pose = chunk.root.block("pose").unwrap();
        assert_eq!(text(pose.block("position").unwrap(), "z"), Some("3.0"));
        assert_eq!(text(pose.block("orientation").unwrap(), "w"), Some("1.0"));
        assert!(chunk.diagnostics.is_empty());
    }

    #[test]
    fn test_colon_before_brace_opens_block() {
        let chunk = parse_chunk("pose: { position: { x: 4 } }");
        let position = chunk.root.block("pose").unwrap().block("position").unwrap();
        assert_eq!(text(position, "x"), Some("4"));
    }

    #[test]
    fn test_block_spans() {
        let source = "pose { x: 1 }";
        let chunk = parse_chunk(source);
        let pose = chunk.root.block("pose").unwrap();
        assert_eq!(pose.span.text(source), "{ x: 1 }");
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100_000;
        let mut source = alloc::string::String::new();
        for _ in 0..depth {
            source.push_str("joints { ");
        }
        source.push_str("key: 7 ");
        for _ in 0..depth {
            source.push_str("} ");
        }

        let chunk = parse_chunk(&source);
        assert_eq!(chunk.root.depth(), depth + 1);
        assert!(chunk.diagnostics.is_empty());
        assert!(chunk == parse_chunk(&source));
    }

    #[test]
    fn test_unclosed_blocks_keep_fields() {
        let chunk = parse_chunk(
            "deviceType: DEVICE_TYPE_HAND_TRACKING
             handPose {
               hand: HAND_RIGHT
               key: 1
               position {
                 x: 0.5",
        );
        let hand_pose = chunk.root.block("handPose").unwrap();
        assert_eq!(text(hand_pose, "hand"), Some("HAND_RIGHT"));
        assert_eq!(text(hand_pose.block("position").unwrap(), "x"), Some("0.5"));

        assert_eq!(chunk.diagnostics.len(), 2);
        assert!(
            chunk
                .diagnostics
                .iter()
                .all(|d| d.severity == Severity::Warning)
        );
        assert!(chunk.diagnostics[0].message.contains("position"));
        assert!(chunk.diagnostics[1].message.contains("handPose"));
    }

    #[test]
    fn test_unmatched_close_ends_record() {
        let chunk = parse_chunk("deviceType: A } deviceType: B");
        assert_eq!(text(&chunk.root, "deviceType"), Some("A"));
        assert_eq!(chunk.diagnostics.len(), 1);
        assert!(chunk.diagnostics[0].message.contains("unmatched"));
    }

    #[test]
    fn test_stray_tokens_are_skipped() {
        let chunk = parse_chunk("garbage x: 1 : y:");
        assert_eq!(text(&chunk.root, "x"), Some("1"));
        assert!(!chunk.root.contains_key("garbage"));
        assert!(!chunk.root.contains_key("y"));
        assert!(!chunk.has_errors());
        assert_eq!(chunk.diagnostics.len(), 3);
    }

    #[test]
    fn test_anonymous_block_is_dropped() {
        let chunk = parse_chunk("{ x: 1 } y: 2");
        assert!(!chunk.root.contains_key("x"));
        assert_eq!(text(&chunk.root, "y"), Some("2"));
    }

    #[test]
    fn test_quoted_values_and_keys() {
        let chunk = parse_chunk(r#"label: "left palm" "odd key": 3"#);
        assert_eq!(text(&chunk.root, "label"), Some("left palm"));
        assert_eq!(text(&chunk.root, "odd key"), Some("3"));
        assert!(chunk.root.scalar("label").unwrap().quoted);
    }

    #[test]
    fn test_repeated_keys_preserved_in_order() {
        let chunk = parse_chunk("joints { key: 2 } joints { key: 3 }");
        assert_eq!(chunk.root.len(), 2);
        let last = chunk.root.block("joints").unwrap();
        assert_eq!(text(last, "key"), Some("3"));
    }

    #[test]
    fn test_lexer_errors_are_collected() {
        let chunk = parse_chunk("x: 1 \u{1} y: 2");
        assert!(chunk.has_errors());
        assert_eq!(text(&chunk.root, "y"), Some("2"));
    }
}
