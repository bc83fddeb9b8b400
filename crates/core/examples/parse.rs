use std::{fs, path::PathBuf};

use clap::Parser;
use strip_comments::{
    ParseOptions, resolve,
    parse::{Grammar as GrammarInner, parse},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Grammar {
    Javascript,
    Typescript,
    Tsx,
}

impl From<Grammar> for GrammarInner {
    fn from(value: Grammar) -> Self {
        match value {
            Grammar::Javascript => GrammarInner::JavaScript,
            Grammar::Typescript => GrammarInner::TypeScript,
            Grammar::Tsx => GrammarInner::Tsx,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "parse")]
#[command(about = "Resolve a source file's dialect and print its CST", long_about = None)]
struct Args {
    /// Path to the source file to parse
    input: PathBuf,

    /// Dump the tree of this grammar instead of the resolved dialect's
    #[arg(long, short)]
    grammar: Option<Grammar>,

    /// Print the tree in S-expression format instead of the default dump format
    #[arg(long, short)]
    sexp: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let source = fs::read_to_string(&args.input)?;

    let tree = match args.grammar {
        Some(grammar) => parse(&source, grammar.into())
            .ok_or_else(|| std::io::Error::other("tree-sitter failed to parse input"))?,
        None => {
            let resolved = resolve(&source, None, &ParseOptions::default())?;
            println!(
                "# dialect: {} ({}), {:?}, {} comment(s)",
                resolved.dialect,
                resolved.dialect.grammar(),
                resolved.source_kind,
                resolved.comments.len()
            );
            resolved.tree
        }
    };

    let root = tree.root_node();
    if args.sexp {
        println!("{}", root.to_sexp());
    } else {
        dump_tree(&source, root);
    }

    Ok(())
}

fn dump_tree(source: &str, root: tree_sitter::Node<'_>) {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        let node = cursor.node();
        let start = node.start_position();
        let text = node
            .utf8_text(source.as_bytes())
            .map(|t| t.replace('\n', "\\n"))
            .unwrap_or_else(|_| "<non-utf8>".to_string());
        println!(
            "{indent}{kind} [{sb}..{eb}] ({row}:{col}) \"{text}\"",
            indent = "  ".repeat(depth),
            kind = node.kind(),
            sb = node.start_byte(),
            eb = node.end_byte(),
            row = start.row + 1,
            col = start.column,
            text = truncate(&text, 80),
        );

        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
            depth -= 1;
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
