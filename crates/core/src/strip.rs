//! Comment stripping with optional sourcemap support.
//!
//! The source is handed to the dialect resolver; the comment spans of the winning parse are
//! erased in one pass and everything else is copied through byte for byte. Whitespace around a
//! removed comment is left alone, so a line holding only a comment becomes an empty (or
//! indentation-only) line.

use tracing::debug;

use crate::{
    StripError,
    dialect::Dialect,
    erase::{Span, erase},
    mapping::create_sourcemap,
    resolve::{ErrorReport, ParseOptions, resolve},
};

/// Name used in error messages and sourcemaps when the caller gives none.
const DEFAULT_FILENAME: &str = "input";

/// Configuration options for comment stripping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripOptions {
    /// Reported in error messages and recorded as the sourcemap source.
    pub filename: Option<String>,
    /// Parse with this dialect only, instead of searching the default list.
    pub dialect: Option<Dialect>,
    pub parse: ParseOptions,
    pub error_report: ErrorReport,
}

impl StripOptions {
    fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripResult {
    /// The source with every comment removed.
    pub code: String,
    /// Comments the parser found, including any the eraser skipped.
    pub comment_count: usize,
    /// Bytes removed. Always `source.len() - code.len()`.
    pub removed_chars: usize,
    /// Byte spans of the input that were removed, ascending.
    pub removed_ranges: Vec<Span>,
}

/// Output code and its corresponding sourcemap JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripOutput {
    pub result: StripResult,
    pub sourcemap: String,
}

/// Strip every comment from `source`.
pub fn strip_comments(source: &str, options: &StripOptions) -> Result<StripResult, StripError> {
    let resolved = resolve(source, options.dialect.as_ref(), &options.parse).map_err(|err| {
        StripError::DialectResolution {
            filename: options.filename().to_string(),
            message: err.message(options.error_report),
            source: err,
        }
    })?;

    if resolved.comments.is_empty() {
        return Ok(StripResult {
            code: source.to_string(),
            comment_count: 0,
            removed_chars: 0,
            removed_ranges: Vec::new(),
        });
    }

    let mut spans: Vec<Span> = resolved.comments.iter().map(|c| c.span).collect();
    spans.sort();
    let erased = erase(source, &spans);

    debug!(
        filename = options.filename(),
        dialect = %resolved.dialect,
        comments = spans.len(),
        removed_chars = erased.removed_chars,
        "stripped comments"
    );

    Ok(StripResult {
        code: erased.code,
        comment_count: spans.len(),
        removed_chars: erased.removed_chars,
        removed_ranges: erased.removed,
    })
}

/// Like [`strip_comments`], for input that has not been validated as text yet.
pub fn strip_comments_bytes(
    source: &[u8],
    options: &StripOptions,
) -> Result<StripResult, StripError> {
    let source = std::str::from_utf8(source)?;
    strip_comments(source, options)
}

/// Strip comments and create a sourcemap mapping the output back to `source`.
pub fn strip_comments_with_sourcemap(
    source: &str,
    options: &StripOptions,
) -> Result<StripOutput, StripError> {
    let result = strip_comments(source, options)?;
    let sourcemap = create_sourcemap(
        source,
        &result.code,
        options.filename(),
        &result.removed_ranges,
    )?;
    Ok(StripOutput { result, sourcemap })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Plugin;

    /// Strips comments using the default options.
    fn strip(src: &str) -> StripResult {
        strip_comments(src, &StripOptions::default()).unwrap()
    }

    #[test]
    fn removes_line_and_block_comments() {
        let src = "// header\nconst a = 1; /* inline */\n/**\n * doc\n */\nfunction f() {}\n";
        let out = strip(src);
        assert_eq!(out.code, "\nconst a = 1; \n\nfunction f() {}\n");
        assert_eq!(out.comment_count, 3);
        assert_eq!(out.removed_chars, src.len() - out.code.len());
        assert_eq!(
            out.removed_ranges,
            [Span::new(0, 9), Span::new(23, 35), Span::new(36, 50)]
        );
    }

    #[test]
    fn zero_comments_returns_source_unchanged() {
        let src = "const url = 'http://example.com';\n";
        let out = strip(src);
        assert_eq!(out.code, src);
        assert_eq!(out.comment_count, 0);
        assert_eq!(out.removed_chars, 0);
        assert!(out.removed_ranges.is_empty());
    }

    /// JSX text that looks like a comment stays; the expression-container comment goes.
    #[test]
    fn jsx_text_survives_markup_comment_is_removed() {
        let out = strip("<button>// text{/* comment */}</button>");
        assert_eq!(out.code, "<button>// text{}</button>");
        assert_eq!(out.comment_count, 1);
        assert_eq!(out.removed_chars, 13);
    }

    #[test]
    fn typescript_with_legacy_decorators() {
        let src = "export @Component({}) // c\nclass A {\n  /** b */\n  b: number = 1;\n}\n";
        let out = strip(src);
        assert_eq!(
            out.code,
            "export @Component({}) \nclass A {\n  \n  b: number = 1;\n}\n"
        );
        assert_eq!(out.comment_count, 2);
    }

    #[test]
    fn strings_and_regex_are_preserved() {
        let src = "const a = \"/* not */\", b = /\\/\\/not/g; // yes\n";
        let out = strip(src);
        assert_eq!(out.code, "const a = \"/* not */\", b = /\\/\\/not/g; \n");
    }

    #[test]
    fn stripping_is_idempotent() {
        let src = "/* a */ let x = 1; // b\nx /* c */ += 2;\n";
        let once = strip(src);
        let twice = strip(&once.code);
        assert_eq!(twice.comment_count, 0);
        assert_eq!(twice.code, once.code);
    }

    #[test]
    fn exhaustion_names_the_file() {
        let options = StripOptions {
            filename: Some("broken.js".to_string()),
            ..StripOptions::default()
        };
        let err = strip_comments("const = ;\n", &options).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse broken.js: "), "{err}");
        assert_eq!(err.attempts().len(), 9);
    }

    #[test]
    fn furthest_error_reports_a_later_failure() {
        // Valid TypeScript up to line 2, but JavaScript-only dialects fail on the annotation.
        let source = "let a: number = 1;\nlet b = ;\n";

        let last = strip_comments(source, &StripOptions::default()).unwrap_err();
        let furthest = strip_comments(
            source,
            &StripOptions {
                error_report: ErrorReport::Furthest,
                ..StripOptions::default()
            },
        )
        .unwrap_err();

        let StripError::DialectResolution { message: last, .. } = last else {
            panic!("expected a resolution error");
        };
        let StripError::DialectResolution {
            message: furthest,
            source: err,
            ..
        } = furthest
        else {
            panic!("expected a resolution error");
        };
        assert!(last.contains("(1:"), "{last}");
        assert!(furthest.contains("(2:"), "{furthest}");
        assert_ne!(
            err.reported(ErrorReport::Furthest).map(|a| a.dialect.name()),
            Some("base".to_string())
        );
    }

    #[test]
    fn default_filename_is_input() {
        let err = strip_comments("const = ;\n", &StripOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse input: "), "{err}");
    }

    #[test]
    fn forced_dialect_is_used_alone() {
        let options = StripOptions {
            dialect: Some(Dialect::new([Plugin::Jsx])),
            ..StripOptions::default()
        };
        let err = strip_comments("let a: number = 1; // c\n", &options).unwrap_err();
        assert_eq!(err.attempts().len(), 1);

        let out = strip_comments("let a = <b/>; // c\n", &options).unwrap();
        assert_eq!(out.code, "let a = <b/>; \n");
    }

    #[test]
    fn bytes_must_be_utf8() {
        let err = strip_comments_bytes(b"let a = '\xff';", &StripOptions::default()).unwrap_err();
        assert!(matches!(err, StripError::NotText(_)));

        let out = strip_comments_bytes(b"a; // b", &StripOptions::default()).unwrap();
        assert_eq!(out.code, "a; ");
    }

    #[test]
    fn emits_sourcemap() {
        let options = StripOptions {
            filename: Some("a.js".to_string()),
            ..StripOptions::default()
        };
        let out = strip_comments_with_sourcemap("/* a */x;\n", &options).unwrap();
        assert_eq!(out.result.code, "x;\n");
        assert!(out.sourcemap.contains("\"sources\":[\"a.js\"]"));
    }
}
