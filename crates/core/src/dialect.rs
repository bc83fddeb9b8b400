//! Grammar extensions (plugins), dialects, and the default dialect search order.
//!
//! A [`Dialect`] is an ordered, duplicate-free set of [`Plugin`]s describing what syntax a parse
//! attempt assumes. The resolver maps each dialect to a tree-sitter [`Grammar`] and then gates
//! the parsed tree on the plugins the dialect enables.
//!
//! The default search order is fixed: for each decorator convention (modern, then legacy),
//! JSX + TypeScript, JSX + Flow, JSX alone, and no language extension, each with the common
//! proposal plugins; then the common plugins alone. Nine attempts in total.

use std::{fmt, path::Path, str::FromStr, sync::LazyLock};

use crate::parse::Grammar;

/// A named grammar extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plugin {
    Jsx,
    TypeScript,
    Flow,
    FlowComments,
    /// Standardized decorators. `before_export` selects `@dec export class` over
    /// `export @dec class`.
    Decorators {
        before_export: bool,
    },
    DecoratorsLegacy,
    ClassProperties,
    ClassPrivateProperties,
    ClassPrivateMethods,
    DynamicImport,
    OptionalCatchBinding,
    OptionalChaining,
    NullishCoalescingOperator,
    ObjectRestSpread,
    TopLevelAwait,
    ThrowExpressions,
    NumericSeparator,
    ImportMeta,
    ExportDefaultFrom,
    DoExpressions,
    FunctionBind,
}

impl Plugin {
    /// The canonical plugin name.
    pub fn name(self) -> &'static str {
        match self {
            Plugin::Jsx => "jsx",
            Plugin::TypeScript => "typescript",
            Plugin::Flow => "flow",
            Plugin::FlowComments => "flowComments",
            Plugin::Decorators { .. } => "decorators",
            Plugin::DecoratorsLegacy => "decorators-legacy",
            Plugin::ClassProperties => "classProperties",
            Plugin::ClassPrivateProperties => "classPrivateProperties",
            Plugin::ClassPrivateMethods => "classPrivateMethods",
            Plugin::DynamicImport => "dynamicImport",
            Plugin::OptionalCatchBinding => "optionalCatchBinding",
            Plugin::OptionalChaining => "optionalChaining",
            Plugin::NullishCoalescingOperator => "nullishCoalescingOperator",
            Plugin::ObjectRestSpread => "objectRestSpread",
            Plugin::TopLevelAwait => "topLevelAwait",
            Plugin::ThrowExpressions => "throwExpressions",
            Plugin::NumericSeparator => "numericSeparator",
            Plugin::ImportMeta => "importMeta",
            Plugin::ExportDefaultFrom => "exportDefaultFrom",
            Plugin::DoExpressions => "doExpressions",
            Plugin::FunctionBind => "functionBind",
        }
    }

    fn is_decorators(self) -> bool {
        matches!(self, Plugin::Decorators { .. } | Plugin::DecoratorsLegacy)
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a plugin name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown parser plugin: {0}")]
pub struct UnknownPlugin(pub String);

impl FromStr for Plugin {
    type Err = UnknownPlugin;

    /// Parses a canonical plugin name. `decorators` means `decoratorsBeforeExport: true`;
    /// `decorators-after-export` selects `false`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let plugin = match s {
            "jsx" => Plugin::Jsx,
            "typescript" => Plugin::TypeScript,
            "flow" => Plugin::Flow,
            "flowComments" => Plugin::FlowComments,
            "decorators" => Plugin::Decorators {
                before_export: true,
            },
            "decorators-after-export" => Plugin::Decorators {
                before_export: false,
            },
            "decorators-legacy" => Plugin::DecoratorsLegacy,
            "classProperties" => Plugin::ClassProperties,
            "classPrivateProperties" => Plugin::ClassPrivateProperties,
            "classPrivateMethods" => Plugin::ClassPrivateMethods,
            "dynamicImport" => Plugin::DynamicImport,
            "optionalCatchBinding" => Plugin::OptionalCatchBinding,
            "optionalChaining" => Plugin::OptionalChaining,
            "nullishCoalescingOperator" => Plugin::NullishCoalescingOperator,
            "objectRestSpread" => Plugin::ObjectRestSpread,
            "topLevelAwait" => Plugin::TopLevelAwait,
            "throwExpressions" => Plugin::ThrowExpressions,
            "numericSeparator" => Plugin::NumericSeparator,
            "importMeta" => Plugin::ImportMeta,
            "exportDefaultFrom" => Plugin::ExportDefaultFrom,
            "doExpressions" => Plugin::DoExpressions,
            "functionBind" => Plugin::FunctionBind,
            other => return Err(UnknownPlugin(other.to_string())),
        };
        Ok(plugin)
    }
}

/// Proposal plugins shared by every default dialect.
pub const COMMON_PLUGINS: &[Plugin] = &[
    Plugin::ClassProperties,
    Plugin::ClassPrivateProperties,
    Plugin::ClassPrivateMethods,
    Plugin::DynamicImport,
    Plugin::OptionalCatchBinding,
    Plugin::OptionalChaining,
    Plugin::NullishCoalescingOperator,
    Plugin::ObjectRestSpread,
    Plugin::TopLevelAwait,
    Plugin::ThrowExpressions,
    Plugin::NumericSeparator,
    Plugin::ImportMeta,
    Plugin::ExportDefaultFrom,
    Plugin::DoExpressions,
    Plugin::FunctionBind,
];

const DECORATOR_PLUGINS: [Plugin; 2] = [
    Plugin::Decorators {
        before_export: true,
    },
    Plugin::DecoratorsLegacy,
];

const LANGUAGE_PLUGINS: [&[Plugin]; 4] = [
    &[Plugin::Jsx, Plugin::TypeScript],
    &[Plugin::Jsx, Plugin::Flow, Plugin::FlowComments],
    &[Plugin::Jsx],
    &[],
];

/// File extensions the stripper handles.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["js", "cjs", "mjs", "jsx", "ts", "tsx", "cts", "mts"];

/// Returns true if `path` has one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// An ordered, duplicate-free set of plugins describing one parse attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Dialect {
    plugins: Vec<Plugin>,
}

impl Dialect {
    /// Builds a dialect, dropping repeated plugins (first occurrence wins).
    ///
    /// Only one decorator plugin is kept; later decorator plugins are dropped.
    pub fn new(plugins: impl IntoIterator<Item = Plugin>) -> Self {
        let mut out: Vec<Plugin> = Vec::new();
        for plugin in plugins {
            if out.contains(&plugin) {
                continue;
            }
            if plugin.is_decorators() && out.iter().any(|p| p.is_decorators()) {
                continue;
            }
            out.push(plugin);
        }
        Self { plugins: out }
    }

    /// Parses a dialect from plugin names.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownPlugin>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let plugins = names
            .into_iter()
            .map(|n| n.as_ref().parse::<Plugin>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(plugins))
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn has(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }

    /// The decorator plugin in effect, if any.
    pub fn decorators(&self) -> Option<Plugin> {
        self.plugins.iter().copied().find(|p| p.is_decorators())
    }

    /// The grammar that hosts this dialect.
    ///
    /// Flow annotations are hosted by the TypeScript grammars, which accept the annotation
    /// syntax both languages share; TypeScript-only constructs are rejected by the resolver.
    pub fn grammar(&self) -> Grammar {
        let typed = self.has(Plugin::TypeScript) || self.has(Plugin::Flow);
        match (typed, self.has(Plugin::Jsx)) {
            (true, true) => Grammar::Tsx,
            (true, false) => Grammar::TypeScript,
            (false, _) => Grammar::JavaScript,
        }
    }

    /// A short human-readable name listing the decorator and language plugins.
    pub fn name(&self) -> String {
        let parts: Vec<&str> = self
            .plugins
            .iter()
            .filter(|p| !COMMON_PLUGINS.contains(p))
            .map(|p| p.name())
            .collect();
        if parts.is_empty() {
            "base".to_string()
        } else {
            parts.join("+")
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromIterator<Plugin> for Dialect {
    fn from_iter<T: IntoIterator<Item = Plugin>>(iter: T) -> Self {
        Self::new(iter)
    }
}

static DEFAULT_DIALECTS: LazyLock<Vec<Dialect>> = LazyLock::new(|| {
    let mut dialects = Vec::with_capacity(DECORATOR_PLUGINS.len() * LANGUAGE_PLUGINS.len() + 1);
    for decorators in DECORATOR_PLUGINS {
        for language in LANGUAGE_PLUGINS {
            let plugins = std::iter::once(decorators)
                .chain(language.iter().copied())
                .chain(COMMON_PLUGINS.iter().copied());
            dialects.push(Dialect::new(plugins));
        }
    }
    dialects.push(Dialect::new(COMMON_PLUGINS.iter().copied()));
    dialects
});

/// The default dialect search order.
pub fn default_dialects() -> &'static [Dialect] {
    &DEFAULT_DIALECTS
}
