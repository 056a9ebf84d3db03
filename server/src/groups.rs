//! Functional-group pool: manifest loading with a built-in fallback.

use pooltrivia_shared::phase::GroupLoadState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const FALLBACK_MESSAGE: &str = "Group manifest unavailable. Using local fallback groups. \
     For full content check POOLTRIVIA_GROUPS_PATH and restart the server.";
pub const FAILED_MESSAGE_PREFIX: &str = "Could not load functional_groups.json.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalGroup {
    pub id: String,
    pub display_name: String,
    /// Image path relative to the web root
    pub image: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupManifest {
    pub groups: Vec<FunctionalGroup>,
}

#[derive(Debug, thiserror::Error)]
pub enum GroupLoadError {
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
    #[error("group data schema invalid: no groups in {0}")]
    Empty(PathBuf),
}

/// Outcome of a load attempt, ready to hand to the game state.
#[derive(Debug, Clone)]
pub struct GroupLoad {
    pub pool: Vec<FunctionalGroup>,
    pub state: GroupLoadState,
    /// User-facing explanation when the manifest could not be used
    pub message: Option<String>,
}

impl GroupLoad {
    pub fn remote(pool: Vec<FunctionalGroup>) -> Self {
        Self {
            pool,
            state: GroupLoadState::Remote,
            message: None,
        }
    }

    pub fn fallback() -> Self {
        Self {
            pool: local_fallback_groups(),
            state: GroupLoadState::Fallback,
            message: Some(FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn failed(path: &Path) -> Self {
        Self {
            pool: Vec::new(),
            state: GroupLoadState::Failed,
            message: Some(format!(
                "{} Check that {} exists and is valid JSON, then restart the server.",
                FAILED_MESSAGE_PREFIX,
                path.display()
            )),
        }
    }
}

/// Groups used when the manifest cannot be loaded.
pub fn local_fallback_groups() -> Vec<FunctionalGroup> {
    fn group(id: &str, display_name: &str, aliases: &[&str]) -> FunctionalGroup {
        FunctionalGroup {
            id: id.to_string(),
            display_name: display_name.to_string(),
            image: format!("assets/groups/{id}.svg"),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
    vec![
        group("alcohol", "Alcohol", &["alcohol", "hydroxyl", "hydroxy"]),
        group("ketone", "Ketone", &["ketone", "oxo"]),
        group("amine", "Amine", &["amine", "amino"]),
    ]
}

/// Parse a manifest and require at least one group.
pub fn parse_manifest(path: &Path, text: &str) -> Result<Vec<FunctionalGroup>, GroupLoadError> {
    let manifest: GroupManifest =
        serde_json::from_str(text).map_err(|source| GroupLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if manifest.groups.is_empty() {
        return Err(GroupLoadError::Empty(path.to_path_buf()));
    }
    Ok(manifest.groups)
}

pub async fn read_manifest(path: &Path) -> Result<Vec<FunctionalGroup>, GroupLoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| GroupLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_manifest(path, &text)
}

/// Load the pool from `path`. Failures never escape: they become a fallback
/// pool or a failed state carrying a visible message.
pub async fn load_groups(path: PathBuf, allow_fallback: bool) -> GroupLoad {
    match read_manifest(&path).await {
        Ok(pool) => {
            tracing::info!("Loaded {} groups from {}", pool.len(), path.display());
            GroupLoad::remote(pool)
        }
        Err(e) if allow_fallback => {
            tracing::warn!("Group load failed ({}); using local fallback groups", e);
            GroupLoad::fallback()
        }
        Err(e) => {
            tracing::error!("Group load failed: {}", e);
            GroupLoad::failed(&path)
        }
    }
}
