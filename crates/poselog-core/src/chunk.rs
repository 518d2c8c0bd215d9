//! Record chunk splitting.
//!
//! A log is a flat sequence of `records { ... }` blocks. This module yields
//! the body of each block, without the `records {` opener and the closing
//! brace, as a slice of the original text.
//!
//! In [`ChunkMode::Legacy`] the boundaries come from plain substring
//! operations, exactly like the exporter this format was first read by:
//! split on the literal `records {`, then drop everything from the last `}`
//! of each piece. Braces are never counted, so text between records that
//! contains a `}` ends up inside the preceding chunk. [`ChunkMode::Balanced`]
//! counts braces instead.

use crate::options::ChunkMode;
use core::iter::Skip;
use core::str::Split;

/// Literal that opens every record in legacy mode.
pub const RECORD_DELIMITER: &str = "records {";

/// Keyword that opens a record in balanced mode.
const RECORD_KEYWORD: &str = "records";

/// Lazy iterator over record chunks.
pub struct Chunks<'src> {
    inner: ChunksInner<'src>,
}

enum ChunksInner<'src> {
    Legacy(Skip<Split<'src, &'static str>>),
    Balanced { source: &'src str, pos: usize },
}

/// Split `text` into record chunks.
///
/// Text without any record opener yields no chunks.
#[must_use]
pub fn chunks(text: &str, mode: ChunkMode) -> Chunks<'_> {
    let inner = match mode {
        ChunkMode::Legacy => ChunksInner::Legacy(text.split(RECORD_DELIMITER).skip(1)),
        ChunkMode::Balanced => ChunksInner::Balanced {
            source: text,
            pos: 0,
        },
    };
    Chunks { inner }
}

impl<'src> Iterator for Chunks<'src> {
    type Item = &'src str;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            ChunksInner::Legacy(pieces) => pieces.next().map(cut_at_last_brace),
            ChunksInner::Balanced { source, pos } => {
                let (chunk, next) = next_balanced(source, *pos)?;
                *pos = next;
                Some(chunk)
            }
        }
    }
}

impl core::iter::FusedIterator for Chunks<'_> {}

/// Drop the last `}` of a piece and everything after it.
///
/// A piece with no `}` at all is returned whole.
fn cut_at_last_brace(piece: &str) -> &str {
    piece.rsplit_once('}').map_or(piece, |(head, _)| head)
}

/// Find the next balanced record at or after `from`.
///
/// Returns the chunk body and the position to resume scanning from. An
/// unclosed record runs to the end of the text. Openers inside quoted
/// strings and `#` comments between records are skipped.
fn next_balanced(source: &str, from: usize) -> Option<(&str, usize)> {
    let bytes = source.as_bytes();
    let keyword = RECORD_KEYWORD.as_bytes();
    let mut pos = from;

    while let Some(&b) = bytes.get(pos) {
        match b {
            b'"' | b'\'' => pos = skip_quoted(bytes, pos),
            b'#' => pos = skip_comment(bytes, pos),
            _ if bytes[pos..].starts_with(keyword) => {
                let after_keyword = pos + keyword.len();
                let starts_word = pos == 0 || !is_ident_byte(bytes[pos - 1]);
                let ends_word = bytes.get(after_keyword).is_none_or(|&b| !is_ident_byte(b));
                let brace = skip_whitespace(bytes, after_keyword);

                if starts_word && ends_word && bytes.get(brace) == Some(&b'{') {
                    let body_start = brace + 1;
                    return Some(match find_matching_brace(bytes, body_start) {
                        Some(close) => (&source[body_start..close], close + 1),
                        None => (&source[body_start..], source.len()),
                    });
                }
                pos = after_keyword - 1;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Position of the first non-whitespace byte at or after `pos`.
fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

/// Position of the `}` closing a block whose body starts at `start`.
///
/// Braces inside quoted strings and `#` comments do not count.
fn find_matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = start;

    while let Some(&b) = bytes.get(pos) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            b'"' | b'\'' => pos = skip_quoted(bytes, pos),
            b'#' => pos = skip_comment(bytes, pos),
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Position of the quote closing the literal opened at `open`, or the last
/// byte if it never closes.
fn skip_quoted(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut pos = open + 1;
    while let Some(&b) = bytes.get(pos) {
        if b == b'\\' {
            pos += 2;
            continue;
        }
        if b == quote {
            return pos;
        }
        pos += 1;
    }
    bytes.len().saturating_sub(1)
}

/// Position of the last byte of the comment opened at `open`, before its
/// newline.
fn skip_comment(bytes: &[u8], open: usize) -> usize {
    let mut pos = open;
    while bytes.get(pos + 1).is_some_and(|&b| b != b'\n') {
        pos += 1;
    }
    pos
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn legacy(text: &str) -> Vec<&str> {
        chunks(text, ChunkMode::Legacy).collect()
    }

    fn balanced(text: &str) -> Vec<&str> {
        chunks(text, ChunkMode::Balanced).collect()
    }

    #[test]
    fn test_no_records() {
        assert!(legacy("").is_empty());
        assert!(legacy("header only\n").is_empty());
        assert!(balanced("").is_empty());
        assert!(balanced("recordsX { }").is_empty());
    }

    #[test]
    fn test_legacy_flat_records() {
        let text = "records {\n  a: 1\n}\nrecords {\n  b: 2\n}\n";
        assert_eq!(legacy(text), vec!["\n  a: 1\n", "\n  b: 2\n"]);
    }

    #[test]
    fn test_legacy_cuts_at_last_brace_only() {
        let text = "records { pose { x: 1 } } trailing } junk";
        assert_eq!(legacy(text), vec![" pose { x: 1 } } trailing "]);
    }

    #[test]
    fn test_legacy_piece_without_brace_is_whole() {
        assert_eq!(legacy("records { a: 1"), vec![" a: 1"]);
    }

    #[test]
    fn test_legacy_requires_exact_delimiter() {
        // Two spaces or a newline before the brace is not the delimiter.
        assert!(legacy("records  { a: 1 }").is_empty());
        assert!(legacy("records\n{ a: 1 }").is_empty());
    }

    #[test]
    fn test_legacy_prefix_is_ignored() {
        let text = "session 7\nrecords { a: 1 }";
        assert_eq!(legacy(text), vec![" a: 1 "]);
    }

    #[test]
    fn test_balanced_nested() {
        let text = "records { pose { x: 1 } } trailing } junk records {b: 2}";
        assert_eq!(balanced(text), vec![" pose { x: 1 } ", "b: 2"]);
    }

    #[test]
    fn test_balanced_whitespace_before_brace() {
        assert_eq!(balanced("records\n{ a: 1 }"), vec![" a: 1 "]);
    }

    #[test]
    fn test_balanced_ignores_embedded_keyword() {
        let text = "myrecords { x: 1 } records { note: \"records {\" y: 2 }";
        assert_eq!(balanced(text), vec![" note: \"records {\" y: 2 "]);
    }

    #[test]
    fn test_balanced_braces_in_strings_and_comments() {
        let text = "records { a: \"}\" # }\n b: '{' }";
        assert_eq!(balanced(text), vec![" a: \"}\" # }\n b: '{' "]);
    }

    #[test]
    fn test_balanced_skips_openers_between_records() {
        let text = "# records { x\nrecords { a: 1 }\nnote: \"records { y\" records { b: 2 }";
        assert_eq!(balanced(text), vec![" a: 1 ", " b: 2 "]);
        assert!(balanced("# records { a: 1 }").is_empty());
    }

    #[test]
    fn test_balanced_unclosed_runs_to_end() {
        assert_eq!(balanced("records { a { b: 1 }"), vec![" a { b: 1 }"]);
    }

    #[test]
    fn test_modes_agree_on_clean_input() {
        let text = "records {\n  a { b: 1 }\n}\nrecords {\n  c: 2\n}\n";
        assert_eq!(legacy(text), balanced(text));
    }
}
