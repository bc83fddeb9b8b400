//! Comment stripping for JavaScript-family sources (with WASM bindings and a CLI on top).
//!
//! This crate removes comment tokens from JavaScript, JSX, TypeScript and Flow sources while
//! leaving every other byte untouched. Comments are located by parsing, not by scanning for
//! `//`, so string contents, regex literals, template strings and JSX text survive intact.
//!
//! Entry points:
//!
//! - [`strip`] contains the public stripping APIs ([`strip_comments`] and friends).
//!
//! Internals:
//!
//! - [`dialect`] describes grammar extensions (plugins) and the default search order.
//! - [`resolve`] tries dialects in order until one parses the source.
//! - [`erase`] removes byte spans from a source in one linear pass.
//! - [`parse`] holds the tree-sitter parsers, one per grammar.
//! - [`mapping`] creates sourcemaps for stripped output.
//! - [`utf16`] converts byte offsets to UTF-16 offsets and columns.
//! - [`alloc`] contains the tree-sitter allocator override for WASM targets.

pub mod alloc;
pub mod dialect;
pub mod erase;
pub mod mapping;
pub mod parse;
pub mod resolve;
pub mod strip;
pub mod utf16;

pub use dialect::{
    COMMON_PLUGINS, Dialect, Plugin, SUPPORTED_EXTENSIONS, UnknownPlugin, default_dialects,
    is_supported_path,
};
pub use erase::{Erased, Span, erase};
pub use resolve::{
    AttemptFailure, Comment, CommentKind, Diagnostic, ErrorReport, ParseOptions, ResolveError,
    Resolved, SourceKind, SourceType, resolve,
};
pub use strip::{
    StripOptions, StripOutput, StripResult, strip_comments, strip_comments_bytes,
    strip_comments_with_sourcemap,
};

/// Errors that can occur during stripping.
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    #[error("input is not text: {0}")]
    NotText(#[from] std::str::Utf8Error),

    #[error("Failed to parse {filename}: {message}")]
    DialectResolution {
        filename: String,
        message: String,
        #[source]
        source: ResolveError,
    },

    #[error("invalid sourcemap: {0}")]
    SourceMap(#[from] sourcemap::Error),
}

impl StripError {
    /// Returns the per-dialect failures when this is a resolution error.
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            StripError::DialectResolution { source, .. } => &source.attempts,
            _ => &[],
        }
    }
}
