//! Dialect resolution by trial parsing.
//!
//! The source is parsed under each candidate [`Dialect`] in order and the first dialect whose
//! parse is clean wins. "Clean" means two things:
//!
//! 1. The hosting tree-sitter grammar produced no `ERROR`/`MISSING` nodes.
//! 2. The tree passes the dialect's feature gates: syntax the grammar understands but the
//!    dialect does not enable (JSX without `jsx`, decorators without a decorator plugin,
//!    `?.` without `optionalChaining`, ...) fails the attempt, as do constructs the
//!    [`ParseOptions`] disallow.
//!
//! Each grammar parses the source at most once per call; dialects sharing a grammar only
//! re-run the gates.
//!
//! Diagnostics use 1-based lines and 0-based byte columns.

use std::{fmt, ops::ControlFlow};

use tracing::{debug, trace};
use tree_sitter::{Node, Tree};

use crate::{
    dialect::{Dialect, Plugin, default_dialects},
    erase::Span,
    parse::TreeCache,
};

/// How the source is interpreted with respect to module syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceType {
    Module,
    Script,
    /// Module if a top-level `import`/`export` statement exists, script otherwise.
    #[default]
    Unambiguous,
}

/// The source kind a successful parse settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Module,
    Script,
}

/// Parser configuration shared by every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub source_type: SourceType,
    pub allow_await_outside_function: bool,
    pub allow_return_outside_function: bool,
    pub allow_import_export_everywhere: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Unambiguous,
            allow_await_outside_function: true,
            allow_return_outside_function: true,
            allow_import_export_everywhere: true,
        }
    }
}

/// Which attempt's failure a [`ResolveError`] reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorReport {
    /// The last attempted dialect.
    #[default]
    Last,
    /// The attempt whose failure is located furthest into the source.
    Furthest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
    /// `<!-- ...` or `--> ...` at the start of a line.
    Html,
    /// A comment that is the content of a JSX expression container, e.g. `{/* ... */}`.
    Markup,
}

/// A comment token located by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Comment {
    pub kind: CommentKind,
    pub span: Span,
}

/// A located parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Byte offset of the failure.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 0-based byte column.
    pub column: usize,
}

impl Diagnostic {
    fn at(node: Node<'_>, message: impl Into<String>) -> Self {
        let pos = node.start_position();
        Self {
            message: message.into(),
            offset: node.start_byte(),
            line: pos.row + 1,
            column: pos.column,
        }
    }

    fn requires(node: Node<'_>, plugin: &str) -> Self {
        Self::at(
            node,
            format!("Support for the experimental syntax '{plugin}' isn't currently enabled"),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.line, self.column)
    }
}

/// One failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub dialect: Dialect,
    pub diagnostic: Diagnostic,
}

/// No dialect could parse the source. Attempts are kept in the order they were made.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{}", self.message(ErrorReport::Last))]
pub struct ResolveError {
    pub attempts: Vec<AttemptFailure>,
}

impl ResolveError {
    /// The attempt selected by `report`.
    pub fn reported(&self, report: ErrorReport) -> Option<&AttemptFailure> {
        match report {
            ErrorReport::Last => self.attempts.last(),
            ErrorReport::Furthest => self
                .attempts
                .iter()
                .max_by_key(|a| a.diagnostic.offset),
        }
    }

    /// The diagnostic message selected by `report`.
    pub fn message(&self, report: ErrorReport) -> String {
        match self.reported(report) {
            Some(attempt) => attempt.diagnostic.to_string(),
            None => "no dialect was attempted".to_string(),
        }
    }
}

/// A successful parse.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub dialect: Dialect,
    pub tree: Tree,
    pub source_kind: SourceKind,
    /// Comments in document order.
    pub comments: Vec<Comment>,
}

/// Parse `source` under `dialect`, or under the default search order when `dialect` is `None`.
pub fn resolve(
    source: &str,
    dialect: Option<&Dialect>,
    options: &ParseOptions,
) -> Result<Resolved, ResolveError> {
    let dialects = match dialect {
        Some(d) => std::slice::from_ref(d),
        None => default_dialects(),
    };

    let mut cache = TreeCache::new();
    let mut attempts: Vec<AttemptFailure> = Vec::new();

    for dialect in dialects {
        let grammar = dialect.grammar();
        let Some(tree) = cache.get(source, grammar) else {
            let diagnostic = Diagnostic {
                message: format!("tree-sitter-{grammar} produced no tree"),
                offset: 0,
                line: 1,
                column: 0,
            };
            trace!(%dialect, %diagnostic, "dialect attempt failed");
            attempts.push(AttemptFailure {
                dialect: dialect.clone(),
                diagnostic,
            });
            continue;
        };

        match check(source, tree.root_node(), dialect, options) {
            Ok(source_kind) => {
                debug!(%dialect, %grammar, failed_attempts = attempts.len(), "resolved dialect");
                return Ok(Resolved {
                    dialect: dialect.clone(),
                    tree: tree.clone(),
                    source_kind,
                    comments: collect_comments(source, tree.root_node()),
                });
            }
            Err(diagnostic) => {
                trace!(%dialect, %diagnostic, "dialect attempt failed");
                attempts.push(AttemptFailure {
                    dialect: dialect.clone(),
                    diagnostic,
                });
            }
        }
    }

    Err(ResolveError { attempts })
}

/// Visit every node in document order until `visit` breaks.
///
/// Iterative traversal with a `TreeCursor`, so deep trees cannot overflow the stack.
fn walk<'t, T>(
    root: Node<'t>,
    mut visit: impl FnMut(Node<'t>) -> ControlFlow<T>,
) -> Option<T> {
    let mut cursor = root.walk();
    loop {
        if let ControlFlow::Break(value) = visit(cursor.node()) {
            return Some(value);
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// The first `ERROR` or `MISSING` node in document order.
fn first_syntax_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }

        // Only descend into subtrees that contain an error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn syntax_diagnostic(node: Node<'_>) -> Diagnostic {
    if node.is_missing() {
        let kind = node.kind();
        if node.is_named() {
            Diagnostic::at(node, format!("Missing {kind}"))
        } else {
            Diagnostic::at(node, format!("Missing `{kind}`"))
        }
    } else {
        Diagnostic::at(node, "Unexpected token")
    }
}

fn check(
    source: &str,
    root: Node<'_>,
    dialect: &Dialect,
    options: &ParseOptions,
) -> Result<SourceKind, Diagnostic> {
    if root.has_error() {
        let node = first_syntax_error(root).unwrap_or(root);
        return Err(syntax_diagnostic(node));
    }

    let source_kind = match options.source_type {
        SourceType::Module => SourceKind::Module,
        SourceType::Script => SourceKind::Script,
        SourceType::Unambiguous => {
            let mut cursor = root.walk();
            let has_module_syntax = root
                .named_children(&mut cursor)
                .any(|c| matches!(c.kind(), "import_statement" | "export_statement"));
            if has_module_syntax {
                SourceKind::Module
            } else {
                SourceKind::Script
            }
        }
    };

    let gates = Gates {
        source: source.as_bytes(),
        dialect,
        options,
        source_kind,
    };
    match walk(root, |node| match gates.check(node) {
        Some(diagnostic) => ControlFlow::Break(diagnostic),
        None => ControlFlow::Continue(()),
    }) {
        Some(diagnostic) => Err(diagnostic),
        None => Ok(source_kind),
    }
}

const CLASS_KINDS: &[&str] = &["class", "class_declaration", "abstract_class_declaration"];

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "generator_function_declaration",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Syntax the TypeScript grammars accept that Flow does not have.
const TYPESCRIPT_ONLY_KINDS: &[&str] = &[
    "enum_declaration",
    "internal_module",
    "module",
    "accessibility_modifier",
    "abstract_class_declaration",
    "non_null_expression",
    "satisfies_expression",
];

struct Gates<'a> {
    source: &'a [u8],
    dialect: &'a Dialect,
    options: &'a ParseOptions,
    source_kind: SourceKind,
}

impl<'a> Gates<'a> {
    fn enabled(&self, plugin: Plugin) -> bool {
        self.dialect.has(plugin)
    }

    fn require(&self, node: Node<'_>, plugin: Plugin) -> Option<Diagnostic> {
        if self.enabled(plugin) {
            None
        } else {
            Some(Diagnostic::requires(node, plugin.name()))
        }
    }

    fn text(&self, node: Node<'_>) -> &'a [u8] {
        &self.source[node.byte_range()]
    }

    /// Returns a diagnostic if `node` uses syntax the dialect or options do not allow.
    fn check(&self, node: Node<'_>) -> Option<Diagnostic> {
        match node.kind() {
            "jsx_element" | "jsx_self_closing_element" => self.require(node, Plugin::Jsx),
            "decorator" => self.check_decorator(node),
            kind if node.is_named()
                && TYPESCRIPT_ONLY_KINDS.contains(&kind)
                && self.enabled(Plugin::Flow)
                && !self.enabled(Plugin::TypeScript) =>
            {
                Some(Diagnostic::at(
                    node,
                    format!("Unexpected token, `{kind}` is TypeScript-only syntax"),
                ))
            }
            "field_definition" | "public_field_definition" => {
                let name = node
                    .child_by_field_name("property")
                    .or_else(|| node.child_by_field_name("name"));
                let private = name.is_some_and(|n| n.kind() == "private_property_identifier");
                if private || self.enabled(Plugin::TypeScript) {
                    None
                } else {
                    self.require(node, Plugin::ClassProperties)
                }
            }
            "private_property_identifier" => {
                let in_method = node
                    .parent()
                    .is_some_and(|p| p.kind() == "method_definition");
                if in_method {
                    self.require(node, Plugin::ClassPrivateMethods)
                } else {
                    self.require(node, Plugin::ClassPrivateProperties)
                }
            }
            "call_expression" => {
                let dynamic_import = node
                    .child_by_field_name("function")
                    .is_some_and(|f| f.kind() == "import");
                if dynamic_import {
                    self.require(node, Plugin::DynamicImport)
                } else {
                    None
                }
            }
            "catch_clause" if node.child_by_field_name("parameter").is_none() => {
                self.require(node, Plugin::OptionalCatchBinding)
            }
            "optional_chain" => self.require(node, Plugin::OptionalChaining),
            "binary_expression" => {
                let nullish = node
                    .child_by_field_name("operator")
                    .is_some_and(|op| op.kind() == "??");
                if nullish {
                    self.require(node, Plugin::NullishCoalescingOperator)
                } else {
                    None
                }
            }
            "spread_element" | "rest_pattern" => {
                let in_object = node
                    .parent()
                    .is_some_and(|p| matches!(p.kind(), "object" | "object_pattern"));
                if in_object {
                    self.require(node, Plugin::ObjectRestSpread)
                } else {
                    None
                }
            }
            "number" if self.text(node).contains(&b'_') => {
                self.require(node, Plugin::NumericSeparator)
            }
            "meta_property" if self.text(node).starts_with(b"import") => {
                self.require(node, Plugin::ImportMeta)
            }
            "await_expression" => self.check_await(node),
            "return_statement"
                if !self.options.allow_return_outside_function && !inside_function(node) =>
            {
                Some(Diagnostic::at(node, "'return' outside of function"))
            }
            "import_statement" | "export_statement" => self.check_module_syntax(node),
            _ => None,
        }
    }

    fn check_decorator(&self, node: Node<'_>) -> Option<Diagnostic> {
        let Some(decorators) = self.dialect.decorators() else {
            return Some(Diagnostic::at(
                node,
                "This experimental syntax requires enabling one of the following parser plugin(s): \"decorators\", \"decorators-legacy\"",
            ));
        };

        let Plugin::Decorators { before_export } = decorators else {
            // Legacy decorators accept either placement.
            return None;
        };

        let parent = node.parent()?;
        if before_export {
            let after_export = CLASS_KINDS.contains(&parent.kind())
                && parent
                    .parent()
                    .is_some_and(|gp| gp.kind() == "export_statement");
            if after_export {
                return Some(Diagnostic::at(
                    node,
                    "Decorators must be placed *before* the 'export' keyword. You can set the 'decoratorsBeforeExport' option to false to use the 'export @decorator class {}' syntax",
                ));
            }
        } else if parent.kind() == "export_statement" {
            return Some(Diagnostic::at(
                node,
                "Decorators must be placed *after* the 'export' keyword. You can set the 'decoratorsBeforeExport' option to true to use the '@decorator export class {}' syntax",
            ));
        }
        None
    }

    fn check_await(&self, node: Node<'_>) -> Option<Diagnostic> {
        if self.options.allow_await_outside_function || inside_function(node) {
            return None;
        }
        if self.enabled(Plugin::TopLevelAwait) && self.source_kind == SourceKind::Module {
            return None;
        }
        Some(Diagnostic::at(
            node,
            "'await' is only allowed within async functions and at the top levels of modules",
        ))
    }

    fn check_module_syntax(&self, node: Node<'_>) -> Option<Diagnostic> {
        if self.options.source_type == SourceType::Script {
            return Some(Diagnostic::at(
                node,
                "'import' and 'export' may appear only with 'sourceType: \"module\"'",
            ));
        }
        let top_level = node.parent().is_some_and(|p| p.kind() == "program");
        if !top_level && !self.options.allow_import_export_everywhere {
            return Some(Diagnostic::at(
                node,
                "'import' and 'export' may only appear at the top level",
            ));
        }
        None
    }
}

fn inside_function(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if FUNCTION_KINDS.contains(&n.kind()) {
            return true;
        }
        current = n.parent();
    }
    false
}

/// Collect comment tokens in document order.
fn collect_comments(source: &str, root: Node<'_>) -> Vec<Comment> {
    let bytes = source.as_bytes();
    let mut comments = Vec::new();

    walk(root, |node| {
        let kind = match node.kind() {
            "html_comment" => Some(CommentKind::Html),
            "comment" => {
                let in_markup = node.parent().is_some_and(|p| p.kind() == "jsx_expression");
                if in_markup {
                    Some(CommentKind::Markup)
                } else if bytes[node.start_byte()..].starts_with(b"//") {
                    Some(CommentKind::Line)
                } else {
                    Some(CommentKind::Block)
                }
            }
            _ => None,
        };
        if let Some(kind) = kind {
            comments.push(Comment {
                kind,
                span: Span::new(node.start_byte(), node.end_byte()),
            });
        }
        ControlFlow::<()>::Continue(())
    });

    comments
}
