//! Content chunking and reassembly.
//!
//! The remote store caps how much text one code block may hold, so file
//! content is split into ordered pieces of at most `max_len` characters.
//! Every character of the input lands in exactly one piece and
//! [`reassemble`] is plain concatenation, so
//! `reassemble(&chunk(c, l)) == c` always holds. No line-ending
//! normalization happens in either direction.

/// Default lookback as a fraction of `max_len`. A quarter keeps chunks at
/// least 75% full while still breaking on line boundaries for ordinary
/// source files.
const NEWLINE_LOOKBACK_DIVISOR: usize = 4;

/// Split `content` into ordered pieces of at most `max_len` characters,
/// using the default lookback window of a quarter of `max_len`.
///
/// Prefers splitting just after a newline when one falls within the lookback
/// window below `max_len`; otherwise splits at exactly `max_len` characters,
/// always on a character boundary. Empty content yields no pieces.
#[must_use]
pub fn chunk(content: &str, max_len: usize) -> Vec<String> {
    chunk_with_lookback(content, max_len, max_len / NEWLINE_LOOKBACK_DIVISOR)
}

/// Split with an explicit lookback window of `lookback` characters.
///
/// A larger window trades chunk fullness for line-boundary splits; zero
/// still looks back one character, so a newline exactly at the ceiling is
/// honored.
#[must_use]
pub fn chunk_with_lookback(content: &str, max_len: usize, lookback: usize) -> Vec<String> {
    debug_assert!(max_len > 0, "chunk ceiling must be at least 1");
    let max_len = max_len.max(1);

    let mut pieces = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        // Byte offset just past the max_len-th character, or the whole rest.
        let Some(hard_end) = rest.char_indices().nth(max_len).map(|(i, _)| i) else {
            pieces.push(rest.to_string());
            break;
        };

        let split = preferred_split(&rest[..hard_end], max_len, lookback).unwrap_or(hard_end);
        pieces.push(rest[..split].to_string());
        rest = &rest[split..];
    }

    pieces
}

/// Byte offset of a split just after the last newline in `window`, if that
/// newline falls within the lookback region; `None` means hard-split.
fn preferred_split(window: &str, max_len: usize, lookback: usize) -> Option<usize> {
    let min_chars = max_len.saturating_sub(lookback.max(1));
    let min_bytes = window
        .char_indices()
        .nth(min_chars)
        .map_or(window.len(), |(i, _)| i);

    let newline = window.rfind('\n')?;
    let split = newline + 1;
    (split >= min_bytes).then_some(split)
}

/// Reassemble ordered chunk texts into the original content.
#[must_use]
pub fn reassemble(texts: &[String]) -> String {
    texts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(content: &str, max_len: usize) {
        let pieces = chunk(content, max_len);
        assert_eq!(reassemble(&pieces), content, "max_len={max_len}");
        for piece in &pieces {
            assert!(piece.chars().count() <= max_len, "piece over ceiling at max_len={max_len}");
            assert!(!piece.is_empty(), "empty piece at max_len={max_len}");
        }
    }

    #[test]
    fn test_short_content_is_one_piece() {
        let pieces = chunk("fn main() {}\n", 1500);
        assert_eq!(pieces, vec!["fn main() {}\n".to_string()]);
    }

    #[test]
    fn test_empty_content_yields_no_pieces() {
        assert!(chunk("", 1500).is_empty());
    }

    #[test]
    fn test_splits_after_newline_within_lookback() {
        // Lines of 10 chars; ceiling 25 ⇒ lookback 6, so the split lands
        // after the second line (20 chars), not mid-line at 25.
        let content = "aaaaaaaaa\nbbbbbbbbb\nccccccccc\n";
        let pieces = chunk(content, 25);
        assert_eq!(pieces[0], "aaaaaaaaa\nbbbbbbbbb\n");
        assert_eq!(reassemble(&pieces), content);
    }

    #[test]
    fn test_hard_split_when_no_newline() {
        let content = "x".repeat(3200);
        let pieces = chunk(&content, 1500);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].len(), 1500);
        assert_eq!(pieces[1].len(), 1500);
        assert_eq!(pieces[2].len(), 200);
        assert_eq!(reassemble(&pieces), content);
    }

    #[test]
    fn test_newline_outside_lookback_is_ignored() {
        // One newline early in the content; filling chunks matters more than
        // splitting on a line boundary that far back.
        let content = format!("ab\n{}", "c".repeat(100));
        let pieces = chunk(&content, 20);
        assert_eq!(pieces[0].chars().count(), 20);
        assert_eq!(reassemble(&pieces), content);
    }

    #[test]
    fn test_wider_lookback_reaches_earlier_newline() {
        // With the full ceiling as lookback, the early newline is in range
        // and wins over the hard split the default window produces.
        let content = format!("ab\n{}", "c".repeat(100));
        let pieces = chunk_with_lookback(&content, 20, 20);
        assert_eq!(pieces[0], "ab\n");
        assert_eq!(reassemble(&pieces), content);
    }

    #[test]
    fn test_zero_lookback_still_honors_newline_at_ceiling() {
        let content = "aaaaaaaaa\nbbbb";
        let pieces = chunk_with_lookback(content, 10, 0);
        assert_eq!(pieces[0], "aaaaaaaaa\n");
        assert_eq!(reassemble(&pieces), content);
    }

    #[test]
    fn test_multibyte_content_splits_on_char_boundaries() {
        let content = "héllø wörld 🎉\n".repeat(40);
        assert_round_trip(&content, 7);
        assert_round_trip(&content, 13);
        assert_round_trip(&content, 50);
    }

    #[test]
    fn test_round_trip_across_sizes() {
        let samples = [
            "",
            "\n",
            "no trailing newline",
            "a\nb\nc\n",
            "line one\n\n\nline four with gap\n",
            "mixed\r\nendings\r\nstay\r\nuntouched\r\n",
        ];
        for content in samples {
            for max_len in [1, 2, 3, 5, 16, 1500] {
                assert_round_trip(content, max_len);
            }
        }
    }

    #[test]
    fn test_crlf_not_normalized() {
        let content = "a\r\nb\r\n";
        let pieces = chunk(content, 4);
        assert_eq!(reassemble(&pieces), content);
    }
}
