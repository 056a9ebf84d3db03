//! Repository file listings through the `git` executable.
//!
//! Paths come back exactly as git prints them (relative to the repository
//! root, forward slashes) minus anything under a skipped directory.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

/// Directory names left out of every listing unless overridden.
pub const DEFAULT_SKIP_DIRS: &[&str] = &["old_shell_folder"];
pub const DEFAULT_DIFF_FILTER: &str = "ACMRTUXB";

const TRACKED_FAILED: &str = "Failed to list tracked files.";
const CHANGED_FAILED: &str = "Failed to list changed files.";

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),
    /// Non-zero exit: trimmed stderr, or the caller's fallback message
    #[error("{0}")]
    Failed(String),
}

/// Options shared by the listing functions.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// `None` applies [`DEFAULT_SKIP_DIRS`]; an empty set disables filtering.
    pub skip_dirs: Option<BTreeSet<String>>,
    /// Replaces the default failure message when git prints nothing to stderr.
    pub error_message: Option<String>,
}

impl ListOptions {
    pub fn skipping<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skip_dirs: Some(dirs.into_iter().map(Into::into).collect()),
            error_message: None,
        }
    }

    fn skip_set(&self) -> BTreeSet<String> {
        match &self.skip_dirs {
            Some(dirs) => dirs.clone(),
            None => DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

fn run_git(repo_root: &Path, args: &[&str], error_message: &str) -> Result<String, GitError> {
    tracing::debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .current_dir(repo_root)
        .args(args)
        .output()?;
    git_result(
        output.status.success(),
        &output.stdout,
        &output.stderr,
        error_message,
    )
}

/// Stdout on success; otherwise trimmed stderr, or `error_message` when stderr is blank.
fn git_result(
    success: bool,
    stdout: &[u8],
    stderr: &[u8],
    error_message: &str,
) -> Result<String, GitError> {
    if success {
        return Ok(String::from_utf8_lossy(stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(stderr);
    let message = match stderr.trim() {
        "" => error_message.to_string(),
        trimmed => trimmed.to_string(),
    };
    Err(GitError::Failed(message))
}

/// Split NUL-separated output, dropping empty entries.
pub fn split_null(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn path_has_skip_dir(path: &str, skip_dirs: &BTreeSet<String>) -> bool {
    path.replace('\\', "/")
        .split('/')
        .any(|part| skip_dirs.contains(part))
}

pub fn filter_skip_dirs(paths: Vec<String>, skip_dirs: &BTreeSet<String>) -> Vec<String> {
    if skip_dirs.is_empty() {
        return paths;
    }
    paths
        .into_iter()
        .filter(|p| !path_has_skip_dir(p, skip_dirs))
        .collect()
}

/// `git ls-files -z [-- patterns]`.
pub fn list_tracked_files(
    repo_root: &Path,
    patterns: &[&str],
    options: &ListOptions,
) -> Result<Vec<String>, GitError> {
    let mut args = vec!["ls-files", "-z"];
    if !patterns.is_empty() {
        args.push("--");
        args.extend_from_slice(patterns);
    }
    let error_message = options.error_message.as_deref().unwrap_or(TRACKED_FAILED);
    let output = run_git(repo_root, &args, error_message)?;
    Ok(filter_skip_dirs(split_null(&output), &options.skip_set()))
}

/// Files changed in the working tree, then staged files not already listed.
pub fn list_changed_files(
    repo_root: &Path,
    diff_filter: &str,
    options: &ListOptions,
) -> Result<Vec<String>, GitError> {
    let filter_arg = format!("--diff-filter={diff_filter}");
    let error_message = options.error_message.as_deref().unwrap_or(CHANGED_FAILED);
    let commands: [Vec<&str>; 2] = [
        vec!["diff", "--name-only", filter_arg.as_str(), "-z"],
        vec!["diff", "--name-only", "--cached", filter_arg.as_str(), "-z"],
    ];

    let mut paths: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    for args in &commands {
        let output = run_git(repo_root, args, error_message)?;
        for path in split_null(&output) {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }
    Ok(filter_skip_dirs(paths, &options.skip_set()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_skip() -> BTreeSet<String> {
        ListOptions::default().skip_set()
    }

    fn failure_message(stderr: &[u8], error_message: &str) -> String {
        match git_result(false, b"ignored", stderr, error_message) {
            Err(GitError::Failed(message)) => message,
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn silent_failures_use_default_messages() {
        assert_eq!(failure_message(b"", TRACKED_FAILED), "Failed to list tracked files.");
        assert_eq!(failure_message(b"  \n", CHANGED_FAILED), "Failed to list changed files.");
    }

    #[test]
    fn silent_failure_uses_caller_message() {
        let options = ListOptions {
            error_message: Some("ls-files broke".to_string()),
            ..ListOptions::default()
        };
        let fallback = options.error_message.as_deref().unwrap_or(TRACKED_FAILED);
        assert_eq!(failure_message(b"", fallback), "ls-files broke");
    }

    #[test]
    fn stderr_is_trimmed_and_wins_over_default() {
        assert_eq!(
            failure_message(b"\nfatal: not a git repository\n", TRACKED_FAILED),
            "fatal: not a git repository"
        );
    }

    #[test]
    fn success_returns_stdout() {
        let out = git_result(true, b"a.txt\0", b"warning: noise", TRACKED_FAILED).unwrap();
        assert_eq!(out, "a.txt\0");
    }

    #[test]
    fn split_null_drops_empty_entries() {
        assert_eq!(split_null("a.txt\0\0src/b.rs\0"), vec!["a.txt", "src/b.rs"]);
        assert!(split_null("").is_empty());
    }

    #[test]
    fn default_skip_set_filters_old_shell_folder() {
        let paths = vec!["old_shell_folder/a.txt".to_string(), "src/b.txt".to_string()];
        assert_eq!(filter_skip_dirs(paths, &default_skip()), vec!["src/b.txt"]);
    }

    #[test]
    fn skip_dir_matches_any_segment_and_backslashes() {
        let skip = default_skip();
        assert!(path_has_skip_dir("web/old_shell_folder/x.js", &skip));
        assert!(path_has_skip_dir("web\\old_shell_folder\\x.js", &skip));
        assert!(!path_has_skip_dir("web/old_shell_folder_v2/x.js", &skip));
    }

    #[test]
    fn empty_skip_set_disables_filtering() {
        let paths = vec!["old_shell_folder/a.txt".to_string()];
        let options = ListOptions::skipping(Vec::<String>::new());
        assert_eq!(filter_skip_dirs(paths.clone(), &options.skip_set()), paths);
    }

    #[test]
    fn custom_skip_set_replaces_default() {
        let options = ListOptions::skipping(["vendor"]);
        let paths = vec![
            "old_shell_folder/a.txt".to_string(),
            "vendor/lib.js".to_string(),
        ];
        assert_eq!(
            filter_skip_dirs(paths, &options.skip_set()),
            vec!["old_shell_folder/a.txt"]
        );
    }
}
