use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use strip_comments::{
    COMMON_PLUGINS, Dialect, ErrorReport, Plugin, StripError, StripOptions, strip_comments_bytes,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod discover;
mod report;

use report::{FileReport, Report};

/// A fixed dialect selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Preset {
    /// JSX and TypeScript
    Typescript,
    /// JSX and Flow
    Flow,
    /// JSX only
    Jsx,
    /// No language extensions
    Plain,
    /// No language extensions and no decorators
    Minimal,
}

impl Preset {
    fn dialect(self, legacy_decorators: bool) -> Dialect {
        let decorators = if legacy_decorators {
            Plugin::DecoratorsLegacy
        } else {
            Plugin::Decorators {
                before_export: true,
            }
        };
        let language: &[Plugin] = match self {
            Preset::Typescript => &[Plugin::Jsx, Plugin::TypeScript],
            Preset::Flow => &[Plugin::Jsx, Plugin::Flow, Plugin::FlowComments],
            Preset::Jsx => &[Plugin::Jsx],
            Preset::Plain | Preset::Minimal => &[],
        };
        let decorators = (self != Preset::Minimal).then_some(decorators);

        decorators
            .into_iter()
            .chain(language.iter().copied())
            .chain(COMMON_PLUGINS.iter().copied())
            .collect()
    }
}

#[derive(Parser, Debug)]
#[command(name = "strip-comments")]
#[command(about = "Remove comments from JavaScript, JSX, TypeScript and Flow sources")]
#[command(version)]
struct Args {
    /// Files or directories to process
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Overwrite changed files in place
    #[arg(long)]
    write: bool,

    /// Exit non-zero if any file would change
    #[arg(long)]
    check: bool,

    /// Print a JSON report instead of the text summary
    #[arg(long)]
    json: bool,

    /// Parse with one fixed dialect instead of trying the default list
    #[arg(long, value_enum)]
    dialect: Option<Preset>,

    /// Use legacy decorators with --dialect
    #[arg(long, requires = "dialect")]
    legacy_decorators: bool,

    /// Report the parse error located furthest into each file
    #[arg(long)]
    furthest_error: bool,

    /// Stop at the first file that fails
    #[arg(long)]
    fail_fast: bool,
}

impl Args {
    fn strip_options(&self) -> StripOptions {
        StripOptions {
            dialect: self
                .dialect
                .map(|preset| preset.dialect(self.legacy_decorators)),
            error_report: if self.furthest_error {
                ErrorReport::Furthest
            } else {
                ErrorReport::Last
            },
            ..StripOptions::default()
        }
    }
}

/// Strip one file, writing it back when `write` is set and the content changed.
fn process_file(path: &Path, options: &StripOptions, write: bool) -> Result<FileReport> {
    let source = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let options = StripOptions {
        filename: Some(path.display().to_string()),
        ..options.clone()
    };
    let res = strip_comments_bytes(&source, &options)?;
    let changed = res.code.as_bytes() != source.as_slice();

    if write && changed {
        fs::write(path, &res.code)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "wrote stripped file");
    }

    Ok(FileReport {
        path: path.display().to_string(),
        comment_count: res.comment_count,
        removed_chars: res.removed_chars,
        changed,
        error: None,
    })
}

fn run(args: &Args) -> Result<Report> {
    let files = discover::discover(&args.paths)?;
    let options = args.strip_options();
    info!(files = files.len(), dialect = ?args.dialect, "processing");

    let mut report = Report::default();
    for path in &files {
        match process_file(path, &options, args.write) {
            Ok(file) => report.push(file),
            Err(err) => {
                // A strip error's message already includes its cause.
                let message = match err.downcast_ref::<StripError>() {
                    Some(strip_err) => strip_err.to_string(),
                    None => format!("{err:#}"),
                };
                warn!(path = %path.display(), "{message}");
                report.push(FileReport::failed(path.display().to_string(), message));
                if args.fail_fast {
                    break;
                }
            }
        }
    }
    Ok(report)
}

/// Failure when any file failed, or when `--check` finds a file that would change.
fn exit_code(args: &Args, report: &Report) -> ExitCode {
    let would_change = args.check && report.summary.changed > 0;
    if report.has_failures() || would_change {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let report = run(&args)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        for file in &report.files {
            match &file.error {
                Some(error) => eprintln!("error: {error}"),
                None if file.changed && !args.write => println!("would change: {}", file.path),
                None => {}
            }
        }
        println!("{}", report.summary);
    }

    Ok(exit_code(&args, &report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("strip-comments").chain(extra.iter().copied()))
    }

    fn is_failure(code: ExitCode) -> bool {
        format!("{code:?}") == format!("{:?}", ExitCode::FAILURE)
    }

    #[test]
    fn presets_build_expected_dialects() {
        assert_eq!(
            Preset::Typescript.dialect(false).to_string(),
            "decorators+jsx+typescript"
        );
        assert_eq!(
            Preset::Flow.dialect(true).to_string(),
            "decorators-legacy+jsx+flow+flowComments"
        );
        assert_eq!(Preset::Plain.dialect(false).to_string(), "decorators");
        assert_eq!(Preset::Minimal.dialect(true).to_string(), "base");
    }

    #[test]
    fn flags_map_onto_strip_options() {
        let options = args(&["--dialect", "jsx", "--legacy-decorators", "--furthest-error"])
            .strip_options();
        assert_eq!(options.error_report, ErrorReport::Furthest);
        assert_eq!(
            options.dialect.map(|d| d.to_string()),
            Some("decorators-legacy+jsx".to_string())
        );
        assert!(args(&[]).strip_options().dialect.is_none());
        assert_eq!(args(&[]).paths, [PathBuf::from(".")]);
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a; // b\n").unwrap();

        let report = run(&args(&[dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(report.summary.files, 1);
        assert_eq!(report.summary.changed, 1);
        assert_eq!(report.summary.comments, 1);
        assert_eq!(report.summary.removed_chars, 4);
        assert_eq!(fs::read_to_string(&file).unwrap(), "a; // b\n");
    }

    #[test]
    fn write_updates_changed_files_only() {
        let dir = TempDir::new().unwrap();
        let changed = dir.path().join("a.ts");
        let clean = dir.path().join("b.js");
        fs::write(&changed, "let a: number = 1; /* one */\n").unwrap();
        fs::write(&clean, "b;\n").unwrap();

        let report = run(&args(&["--write", dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(report.summary.changed, 1);
        assert_eq!(fs::read_to_string(&changed).unwrap(), "let a: number = 1; \n");
        assert_eq!(fs::read_to_string(&clean).unwrap(), "b;\n");
    }

    #[test]
    fn failures_are_recorded_and_processing_continues() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "const = ;\n").unwrap();
        fs::write(dir.path().join("b.js"), "b; // c\n").unwrap();
        fs::write(dir.path().join("c.js"), [0xff, 0xfe]).unwrap();

        let report = run(&args(&[dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(report.summary.files, 3);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.changed, 1);
        let error = report.files[0].error.as_deref().unwrap();
        assert!(error.starts_with("Failed to parse "), "{error}");
        assert!(error.contains("a.js: "), "{error}");
        assert!(report.files[2].error.as_deref().unwrap().starts_with("input is not text"));

        let report = run(&args(&["--fail-fast", dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(report.summary.files, 1);
        assert!(report.has_failures());
    }

    #[test]
    fn check_fails_only_when_a_file_would_change() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a; // b\n").unwrap();
        let path = dir.path().to_str().unwrap();

        let check = args(&["--check", path]);
        let report = run(&check).unwrap();
        assert!(is_failure(exit_code(&check, &report)));

        let plain = args(&[path]);
        let report = run(&plain).unwrap();
        assert!(!is_failure(exit_code(&plain, &report)));

        let write = args(&["--write", path]);
        run(&write).unwrap();
        let report = run(&check).unwrap();
        assert_eq!(report.summary.changed, 0);
        assert!(!is_failure(exit_code(&check, &report)));
    }

    #[test]
    fn forced_dialect_applies_to_every_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "let a: number = 1; // c\n").unwrap();

        let report = run(&args(&["--dialect", "jsx", dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(report.summary.failed, 1);

        let report =
            run(&args(&["--dialect", "typescript", dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.summary.comments, 1);
    }
}
