//! Repository checks for the shipped web assets.
//!
//! Usage: repo-check <manifest|markup|tracked|changed|all> [--root DIR] [--web DIR]
//!        [--skip DIR]... [--no-skip] [--diff-filter FILTER] [-- PATTERN...]
//!
//! Exits 1 when a check finds violations or git fails.

use pooltrivia_server::git_files::{
    list_changed_files, list_tracked_files, ListOptions, DEFAULT_DIFF_FILTER,
};
use pooltrivia_server::manifest::{validate_manifest_file, MIN_SHIPPED_GROUPS};
use pooltrivia_server::markup::{check_markup, check_stylesheet};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: repo-check <manifest|markup|tracked|changed|all> [--root DIR] [--web DIR] \
[--skip DIR]... [--no-skip] [--diff-filter FILTER] [-- PATTERN...]";

struct Args {
    command: String,
    root: PathBuf,
    web: Option<PathBuf>,
    skip_dirs: Option<BTreeSet<String>>,
    diff_filter: String,
    patterns: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        command: String::new(),
        root: PathBuf::from("."),
        web: None,
        skip_dirs: None,
        diff_filter: DEFAULT_DIFF_FILTER.to_string(),
        patterns: Vec::new(),
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--root" => {
                i += 1;
                parsed.root = args.get(i).map(PathBuf::from).ok_or("--root needs a value")?;
            }
            "--web" => {
                i += 1;
                parsed.web = Some(args.get(i).map(PathBuf::from).ok_or("--web needs a value")?);
            }
            "--skip" => {
                i += 1;
                let dir = args.get(i).ok_or("--skip needs a value")?;
                parsed.skip_dirs.get_or_insert_with(BTreeSet::new).insert(dir.clone());
            }
            "--no-skip" => parsed.skip_dirs = Some(BTreeSet::new()),
            "--diff-filter" => {
                i += 1;
                parsed.diff_filter = args.get(i).cloned().ok_or("--diff-filter needs a value")?;
            }
            "--" => {
                parsed.patterns = args[i + 1..].to_vec();
                break;
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if parsed.command.is_empty() && !other.starts_with('-') => {
                parsed.command = other.to_string();
            }
            other => return Err(format!("unexpected argument {other:?}\n{USAGE}")),
        }
        i += 1;
    }
    if parsed.command.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(parsed)
}

impl Args {
    fn web_dir(&self) -> PathBuf {
        self.web.clone().unwrap_or_else(|| self.root.join("web"))
    }

    fn list_options(&self) -> ListOptions {
        ListOptions {
            skip_dirs: self.skip_dirs.clone(),
            error_message: None,
        }
    }
}

/// Returns the number of violations found.
fn check_manifest(args: &Args) -> Result<usize, String> {
    let web = args.web_dir();
    let path = web.join("functional_groups.json");
    let report = validate_manifest_file(&path, &web, MIN_SHIPPED_GROUPS).map_err(|e| e.to_string())?;
    for violation in &report.violations {
        println!("{}: {}", path.display(), violation);
    }
    println!("manifest: {} group(s), {} violation(s)", report.group_count, report.violations.len());
    Ok(report.violations.len())
}

fn check_page(args: &Args) -> Result<usize, String> {
    let web = args.web_dir();
    let mut count = 0;
    for (file, check) in [
        ("index.html", check_markup as fn(&str) -> Vec<String>),
        ("style.css", check_stylesheet),
    ] {
        let path = web.join(file);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        for violation in check(&text) {
            println!("{}: {}", path.display(), violation);
            count += 1;
        }
    }
    println!("markup: {} violation(s)", count);
    Ok(count)
}

fn print_paths(paths: &[String]) -> usize {
    for path in paths {
        println!("{path}");
    }
    0
}

fn run(args: &Args) -> Result<usize, String> {
    let patterns: Vec<&str> = args.patterns.iter().map(String::as_str).collect();
    match args.command.as_str() {
        "manifest" => check_manifest(args),
        "markup" => check_page(args),
        "tracked" => list_tracked_files(&args.root, &patterns, &args.list_options())
            .map(|paths| print_paths(&paths))
            .map_err(|e| e.to_string()),
        "changed" => list_changed_files(&args.root, &args.diff_filter, &args.list_options())
            .map(|paths| print_paths(&paths))
            .map_err(|e| e.to_string()),
        "all" => Ok(check_manifest(args)? + check_page(args)?),
        other => Err(format!("unknown command {other:?}\n{USAGE}")),
    }
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("repo-check: {message}");
            ExitCode::FAILURE
        }
    }
}
