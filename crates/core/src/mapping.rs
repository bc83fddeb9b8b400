//! Sourcemaps for stripped output.
//!
//! Stripping only deletes bytes, so every output byte has exactly one origin in the input. The
//! map anchors the start of each kept segment and the start of every output line inside it;
//! columns are UTF-16 code units.

use tracing::trace;

use crate::{StripError, erase::Span, utf16::LineIndex};

/// Create a sourcemap (v3 JSON) mapping `output` back to `input`.
///
/// `removed` must be the ascending, non-overlapping spans that turned `input` into `output`,
/// as reported by [`erase`](crate::erase::erase).
pub fn create_sourcemap(
    input: &str,
    output: &str,
    source_filename: &str,
    removed: &[Span],
) -> Result<String, StripError> {
    let in_lines = LineIndex::new(input);
    let out_lines = LineIndex::new(output);

    let mut builder = sourcemap::SourceMapBuilder::new(None);
    let source_id = builder.add_source(source_filename);
    builder.set_source_contents(source_id, Some(input));

    let mut anchors = 0usize;
    let mut add_anchor = |out_byte: usize, in_byte: usize| {
        let (out_line, out_col) = out_lines.byte_to_line_utf16_col(out_byte);
        let (in_line, in_col) = in_lines.byte_to_line_utf16_col(in_byte);
        builder.add(
            out_line as u32,
            out_col as u32,
            in_line as u32,
            in_col as u32,
            Some(source_filename),
            None,
            false,
        );
        anchors += 1;
    };

    let mut out_pos = 0usize;
    for segment in kept_segments(input.len(), removed) {
        add_anchor(out_pos, segment.start);

        let kept = &input.as_bytes()[segment.start..segment.end];
        for (rel, _) in kept.iter().enumerate().filter(|&(_, &b)| b == b'\n') {
            let line_start = rel + 1;
            if line_start < kept.len() {
                add_anchor(out_pos + line_start, segment.start + line_start);
            }
        }

        out_pos += segment.len();
    }
    trace!(anchors, removed = removed.len(), "created sourcemap");

    let mut buf: Vec<u8> = Vec::new();
    builder.into_sourcemap().to_writer(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// The non-empty input spans left after removing `removed`, in order.
fn kept_segments(input_len: usize, removed: &[Span]) -> Vec<Span> {
    let mut segments = Vec::with_capacity(removed.len() + 1);
    let mut cursor = 0usize;
    for span in removed {
        if cursor < span.start {
            segments.push(Span::new(cursor, span.start));
        }
        cursor = cursor.max(span.end);
    }
    if cursor < input_len {
        segments.push(Span::new(cursor, input_len));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erase::erase;

    fn lookup(map: &sourcemap::SourceMap, line: u32, col: u32) -> (u32, u32) {
        let token = map.lookup_token(line, col).unwrap();
        (token.get_src_line(), token.get_src_col())
    }

    #[test]
    fn kept_segments_skip_empty_gaps() {
        let segments = kept_segments(10, &[Span::new(0, 2), Span::new(2, 4), Span::new(7, 10)]);
        assert_eq!(segments, [Span::new(4, 7)]);
    }

    #[test]
    fn maps_segments_after_removed_comments() {
        let input = "a /* x */b\n// y\nc;\n";
        let erased = erase(input, &[Span::new(2, 9), Span::new(11, 15)]);
        assert_eq!(erased.code, "a b\n\nc;\n");

        let json = create_sourcemap(input, &erased.code, "in.js", &erased.removed).unwrap();
        let map = sourcemap::SourceMap::from_slice(json.as_bytes()).unwrap();
        assert_eq!(map.get_source(0), Some("in.js"));
        assert_eq!(map.get_source_contents(0), Some(input));

        // `b` sits right after the block comment.
        assert_eq!(lookup(&map, 0, 2), (0, 9));
        // The emptied line comment line.
        assert_eq!(lookup(&map, 1, 0), (1, 4));
        assert_eq!(lookup(&map, 2, 0), (2, 0));
    }

    #[test]
    fn multi_line_block_comment_shifts_lines() {
        let input = "x; /*\n\n*/ y;\nz;";
        let erased = erase(input, &[Span::new(3, 9)]);
        assert_eq!(erased.code, "x;  y;\nz;");

        let json = create_sourcemap(input, &erased.code, "in.js", &erased.removed).unwrap();
        let map = sourcemap::SourceMap::from_slice(json.as_bytes()).unwrap();
        assert_eq!(lookup(&map, 0, 3), (2, 2));
        assert_eq!(lookup(&map, 1, 0), (3, 0));
    }

    #[test]
    fn columns_are_utf16() {
        let input = "'🙂'/* c */;";
        let erased = erase(input, &[Span::new(6, 13)]);
        assert_eq!(erased.code, "'🙂';");

        let json = create_sourcemap(input, &erased.code, "in.js", &erased.removed).unwrap();
        let map = sourcemap::SourceMap::from_slice(json.as_bytes()).unwrap();
        // `;` is at UTF-16 column 4 in the output and 11 in the input.
        assert_eq!(lookup(&map, 0, 4), (0, 11));
    }
}
