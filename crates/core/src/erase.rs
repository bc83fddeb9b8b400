//! Span erasure.
//!
//! [`erase`] deletes a set of byte spans from a source in a single forward pass. Spans that are
//! empty, out of bounds, split a UTF-8 sequence, or start inside an already-removed span are
//! skipped, so the output never duplicates or reorders the bytes that remain.

use std::fmt;

/// A half-open `[start, end)` byte interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// The result of [`erase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erased {
    pub code: String,
    /// Total bytes removed.
    pub removed_chars: usize,
    /// The spans actually excised, ascending and non-overlapping.
    pub removed: Vec<Span>,
}

/// Remove `spans` from `source`.
///
/// Invariant: `code.len() + removed_chars == source.len()`.
pub fn erase(source: &str, spans: &[Span]) -> Erased {
    let mut spans: Vec<Span> = spans
        .iter()
        .copied()
        .filter(|s| {
            s.start < s.end
                && s.end <= source.len()
                && source.is_char_boundary(s.start)
                && source.is_char_boundary(s.end)
        })
        .collect();
    // Stable, so equal starts keep their caller order and the first one wins.
    spans.sort_by_key(|s| s.start);

    let mut code = String::with_capacity(source.len());
    let mut removed = Vec::with_capacity(spans.len());
    let mut removed_chars = 0usize;
    let mut cursor = 0usize;

    for span in spans {
        if span.start < cursor {
            continue;
        }
        code.push_str(&source[cursor..span.start]);
        cursor = span.end;
        removed_chars += span.len();
        removed.push(span);
    }
    code.push_str(&source[cursor..]);

    Erased {
        code,
        removed_chars,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ranges: &[(usize, usize)]) -> Vec<Span> {
        ranges.iter().map(|&(s, e)| Span::new(s, e)).collect()
    }

    #[test]
    fn removes_disjoint_spans() {
        let out = erase("a/*x*/b//y\nc", &spans(&[(1, 6), (7, 10)]));
        assert_eq!(out.code, "ab\nc");
        assert_eq!(out.removed_chars, 8);
        assert_eq!(out.removed, spans(&[(1, 6), (7, 10)]));
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let out = erase("0123456789", &spans(&[(6, 8), (1, 3)]));
        assert_eq!(out.code, "034589");
        assert_eq!(out.removed, spans(&[(1, 3), (6, 8)]));
    }

    /// A span starting inside an earlier one is dropped whole, not trimmed.
    #[test]
    fn overlapping_span_is_skipped() {
        let out = erase("0123456789", &spans(&[(2, 6), (4, 9)]));
        assert_eq!(out.code, "016789");
        assert_eq!(out.removed_chars, 4);
        assert_eq!(out.removed, spans(&[(2, 6)]));
    }

    #[test]
    fn nested_span_is_skipped() {
        let out = erase("0123456789", &spans(&[(1, 9), (3, 5)]));
        assert_eq!(out.code, "09");
        assert_eq!(out.removed, spans(&[(1, 9)]));
    }

    #[test]
    fn adjacent_spans_both_apply() {
        let out = erase("abcdef", &spans(&[(1, 3), (3, 5)]));
        assert_eq!(out.code, "af");
        assert_eq!(out.removed_chars, 4);
    }

    #[test]
    fn invalid_spans_are_ignored() {
        let src = "héllo";
        // (1, 2) splits 'é'; (3, 3) is empty; (4, 99) is out of bounds; (5, 4) is reversed.
        let out = erase(src, &spans(&[(1, 2), (3, 3), (4, 99), (5, 4)]));
        assert_eq!(out.code, src);
        assert_eq!(out.removed_chars, 0);
        assert!(out.removed.is_empty());
    }

    #[test]
    fn no_spans_returns_source() {
        let out = erase("unchanged", &[]);
        assert_eq!(out.code, "unchanged");
        assert_eq!(out.removed_chars, 0);
    }

    #[test]
    fn length_law_holds_for_overlapping_grid() {
        let src = "abcdefghijklmnop";
        for a in 0..src.len() {
            for b in a..=src.len() {
                let input = spans(&[(a, b), (b / 2, b), (0, a / 2)]);
                let out = erase(src, &input);
                assert_eq!(out.code.len() + out.removed_chars, src.len(), "{a}..{b}");
                let summed: usize = out.removed.iter().map(Span::len).sum();
                assert_eq!(summed, out.removed_chars);
                assert!(out.removed.windows(2).all(|w| w[0].end <= w[1].start));
            }
        }
    }
}
