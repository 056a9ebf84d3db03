//! Structural validation of the functional-group manifest.
//!
//! Unlike [`crate::groups::parse_manifest`], which only needs something the
//! game can play with, this walks the raw JSON and reports every problem so
//! a broken asset is caught before it ships.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// The shipped manifest must carry at least this many groups.
pub const MIN_SHIPPED_GROUPS: usize = 5;

const REQUIRED_STRING_FIELDS: [&str; 3] = ["id", "display_name", "image"];

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestReport {
    pub group_count: usize,
    pub violations: Vec<String>,
}

impl ManifestReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Read `path` and check it. Image paths resolve against `asset_root`.
pub fn validate_manifest_file(
    path: &Path,
    asset_root: &Path,
    min_groups: usize,
) -> Result<ManifestReport, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(validate_manifest(&value, asset_root, min_groups))
}

pub fn validate_manifest(value: &Value, asset_root: &Path, min_groups: usize) -> ManifestReport {
    let mut report = ManifestReport::default();
    let Some(groups) = value.get("groups") else {
        report.violations.push("missing top-level \"groups\"".to_string());
        return report;
    };
    let Some(groups) = groups.as_array() else {
        report.violations.push("\"groups\" is not a list".to_string());
        return report;
    };
    report.group_count = groups.len();
    if groups.len() < min_groups {
        report.violations.push(format!(
            "expected at least {} groups, found {}",
            min_groups,
            groups.len()
        ));
    }

    for (index, entry) in groups.iter().enumerate() {
        let label = entry
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(|id| format!("group {id:?}"))
            .unwrap_or_else(|| format!("group #{index}"));

        for field in REQUIRED_STRING_FIELDS {
            let ok = entry
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !ok {
                report
                    .violations
                    .push(format!("{label}: {field} must be a non-empty string"));
            }
        }

        let aliases_ok = entry
            .get("aliases")
            .and_then(Value::as_array)
            .is_some_and(|a| !a.is_empty());
        if !aliases_ok {
            report
                .violations
                .push(format!("{label}: aliases must be a non-empty list"));
        }

        if let Some(image) = entry.get("image").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            if !asset_root.join(image).is_file() {
                report
                    .violations
                    .push(format!("{label}: missing image asset: {image}"));
            }
        }
    }
    report
}
