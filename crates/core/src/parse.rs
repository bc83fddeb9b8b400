use std::{cell::RefCell, fmt};

use tree_sitter::Parser;

use crate::alloc::ensure_tree_sitter_allocator;

/// The tree-sitter grammar hosting a parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `tree-sitter-javascript`. JSX is always lexed; dialects gate it afterwards.
    JavaScript,
    /// `tree-sitter-typescript` without JSX.
    TypeScript,
    /// `tree-sitter-typescript` with JSX.
    Tsx,
}

impl Grammar {
    pub const ALL: [Grammar; 3] = [Grammar::JavaScript, Grammar::TypeScript, Grammar::Tsx];

    pub fn name(self) -> &'static str {
        match self {
            Grammar::JavaScript => "javascript",
            Grammar::TypeScript => "typescript",
            Grammar::Tsx => "tsx",
        }
    }

    fn index(self) -> usize {
        match self {
            Grammar::JavaScript => 0,
            Grammar::TypeScript => 1,
            Grammar::Tsx => 2,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn new_parser(language: tree_sitter::Language, name: &str) -> RefCell<Parser> {
    ensure_tree_sitter_allocator();

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .unwrap_or_else(|e| panic!("tree-sitter-{name} language load failed: {e}"));
    RefCell::new(parser)
}

thread_local! {
    /// Shared Tree-sitter parser instances. We reuse them to avoid reloading the language for
    /// each call.
    static JAVASCRIPT_PARSER: RefCell<Parser> =
        new_parser(tree_sitter_javascript::LANGUAGE.into(), "javascript");

    static TYPESCRIPT_PARSER: RefCell<Parser> =
        new_parser(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(), "typescript");

    static TSX_PARSER: RefCell<Parser> =
        new_parser(tree_sitter_typescript::LANGUAGE_TSX.into(), "tsx");
}

/// Parse `source` with the given grammar.
///
/// Returns `None` only if tree-sitter gives up on the input altogether. A returned tree may
/// still contain `ERROR`/`MISSING` nodes.
pub fn parse(source: &str, grammar: Grammar) -> Option<tree_sitter::Tree> {
    ensure_tree_sitter_allocator();

    let parser = match grammar {
        Grammar::JavaScript => &JAVASCRIPT_PARSER,
        Grammar::TypeScript => &TYPESCRIPT_PARSER,
        Grammar::Tsx => &TSX_PARSER,
    };
    parser.with(|p| p.borrow_mut().parse(source, None))
}

/// Per-call cache so each grammar parses a given source at most once.
#[derive(Default)]
pub struct TreeCache {
    trees: [Option<Option<tree_sitter::Tree>>; 3],
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tree for `grammar`, parsing on first use.
    pub fn get(&mut self, source: &str, grammar: Grammar) -> Option<&tree_sitter::Tree> {
        self.trees[grammar.index()]
            .get_or_insert_with(|| parse(source, grammar))
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grammar_parses_plain_script() {
        for grammar in Grammar::ALL {
            let tree = parse("const a = 1; // one\n", grammar).unwrap();
            assert!(!tree.root_node().has_error(), "{grammar} reported an error");
        }
    }

    #[test]
    fn typescript_annotations_fail_in_javascript() {
        let tree = parse("let a: number = 1;", Grammar::JavaScript).unwrap();
        assert!(tree.root_node().has_error());

        let tree = parse("let a: number = 1;", Grammar::TypeScript).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn cache_parses_each_grammar_once() {
        let mut cache = TreeCache::new();
        let first = cache.get("a;", Grammar::Tsx).map(|t| t.root_node().id());
        let second = cache.get("a;", Grammar::Tsx).map(|t| t.root_node().id());
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
