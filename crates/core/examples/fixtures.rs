use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use strip_comments::{StripOptions, is_supported_path, strip_comments};

#[derive(Parser, Debug)]
#[command(name = "fixtures")]
#[command(about = "Create or validate fixture files", long_about = None)]
struct Args {
    /// Write fixtures instead of validating them
    #[arg(long, short)]
    write: bool,

    /// Path to the fixtures directory (defaults to "./fixtures")
    #[arg(long, default_value = "fixtures")]
    dir: PathBuf,
}

/// `name.ext` -> `name.out.ext`
fn output_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    let (basename, extension) = filename.rsplit_once('.')?;
    Some(dir.join(format!("{basename}.out.{extension}")))
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut input_files = Vec::new();
    for entry in fs::read_dir(&args.dir)? {
        let path = entry?.path();
        let is_output = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(".out."));
        if path.is_file() && !is_output && is_supported_path(&path) {
            input_files.push(path);
        }
    }
    input_files.sort();

    let mut mismatches = Vec::new();
    for input_path in &input_files {
        let filename = input_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or("invalid filename")?;
        let out_path = output_path(&args.dir, filename).ok_or("filename missing extension")?;

        let source = fs::read_to_string(input_path)?;
        let options = StripOptions {
            filename: Some(filename.to_string()),
            ..StripOptions::default()
        };
        let res = strip_comments(&source, &options)?;

        if args.write {
            fs::write(&out_path, &res.code)?;
            println!(
                "  {filename}: {} comment(s) -> {}",
                res.comment_count,
                out_path.display()
            );
            continue;
        }

        match fs::read(&out_path) {
            Ok(expected) if expected == res.code.as_bytes() => println!("  ✓ {filename}"),
            Ok(_) => mismatches.push(format!("{filename}: code mismatch")),
            Err(_) => mismatches.push(format!(
                "{filename}: missing output file {}",
                out_path.display()
            )),
        }
    }

    if !mismatches.is_empty() {
        eprintln!("\nValidation failed:");
        for mismatch in &mismatches {
            eprintln!("  ✗ {mismatch}");
        }
        return Err(format!("{} validation error(s)", mismatches.len()).into());
    }

    println!("\n{} fixture(s) processed.", input_files.len());
    Ok(())
}
