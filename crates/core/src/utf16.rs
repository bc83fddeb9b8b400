//! Byte offset to UTF-16 conversions.
//!
//! The crate works in byte offsets (tree-sitter's model). JavaScript consumers count in UTF-16
//! code units: sourcemap columns use them, and so do string indices on the WASM side.
//!
//! Offsets that fall inside a multi-byte UTF-8 sequence clamp to the start of that character.

use std::cmp::Ordering;

/// Line starts of a string, for `(line, utf16_col)` lookups.
///
/// Lines end before `\n`; for CRLF input the `\r` does not count toward columns either.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    s: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(s: &'a str) -> Self {
        let mut line_starts = vec![0usize];
        line_starts.extend(
            s.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { s, line_starts }
    }

    /// Return the 0-based line containing `byte`. Offsets past the end land on the last line.
    pub fn line_for_byte(&self, byte: usize) -> usize {
        match self.line_starts.binary_search_by(|&probe| {
            if probe <= byte {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        }
    }

    /// Convert an absolute byte offset into a 0-based `(line, utf16_col)` pair.
    pub fn byte_to_line_utf16_col(&self, byte: usize) -> (usize, usize) {
        let line = self.line_for_byte(byte);
        let start = self.line_starts[line];

        let mut end = match self.line_starts.get(line + 1) {
            Some(&next) => next - 1,
            None => self.s.len(),
        };
        if end > start && self.s.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }

        let target = floor_char_boundary(self.s, byte.clamp(start, end));
        (line, utf16_len(&self.s[start..target]))
    }
}

/// Converts byte offsets to absolute UTF-16 offsets.
///
/// Queries in ascending order cost one scan over the string in total; a query behind the
/// previous one restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Utf16Offsets<'a> {
    s: &'a str,
    byte: usize,
    utf16: usize,
}

impl<'a> Utf16Offsets<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, byte: 0, utf16: 0 }
    }

    pub fn convert(&mut self, byte: usize) -> usize {
        let target = floor_char_boundary(self.s, byte.min(self.s.len()));
        if target < self.byte {
            self.byte = 0;
            self.utf16 = 0;
        }
        self.utf16 += utf16_len(&self.s[self.byte..target]);
        self.byte = target;
        self.utf16
    }
}

fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

fn floor_char_boundary(s: &str, mut byte: usize) -> usize {
    while !s.is_char_boundary(byte) {
        byte -= 1;
    }
    byte
}
