//! First-run onboarding flag, persisted as a small JSON key/value file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const ONBOARDING_KEY: &str = "organic_eight_ball_onboarding_seen_v1";
const SEEN_VALUE: &str = "1";

/// Key/value store with local-storage semantics: reads never fail (missing
/// or corrupt data reads as unset), writes are best effort.
#[derive(Debug, Clone)]
pub struct OnboardingStore {
    path: PathBuf,
}

impl OnboardingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn has_seen(&self) -> bool {
        self.read_all().get(ONBOARDING_KEY).map(String::as_str) == Some(SEEN_VALUE)
    }

    /// Record that onboarding was dismissed. Failures are logged, not returned.
    ///
    /// Inside a tokio runtime the write runs on the blocking pool and the
    /// task handle is returned; otherwise it happens inline.
    pub fn mark_seen(&self) -> Option<JoinHandle<()>> {
        match Handle::try_current() {
            Ok(handle) => {
                let store = self.clone();
                Some(handle.spawn_blocking(move || store.persist_seen()))
            }
            Err(_) => {
                self.persist_seen();
                None
            }
        }
    }

    fn persist_seen(&self) {
        if let Err(e) = self.write_seen() {
            tracing::warn!(
                "Could not persist onboarding flag to {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn write_seen(&self) -> std::io::Result<()> {
        let mut entries = self.read_all();
        entries.insert(ONBOARDING_KEY.to_string(), SEEN_VALUE.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> OnboardingStore {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        OnboardingStore::new(std::env::temp_dir().join(format!(
            "pooltrivia_onboarding_{}_{}/{}",
            std::process::id(),
            nanos,
            name
        )))
    }

    #[test]
    fn missing_file_reads_as_unseen() {
        let store = temp_store("missing.json");
        assert!(!store.has_seen());
    }

    #[test]
    fn mark_seen_persists_across_instances() {
        let store = temp_store("seen.json");
        store.mark_seen();
        let reopened = OnboardingStore::new(store.path().to_path_buf());
        assert!(reopened.has_seen());
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn corrupt_file_reads_as_unseen_and_is_repaired() {
        let store = temp_store("corrupt.json");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(!store.has_seen());
        store.mark_seen();
        assert!(store.has_seen());
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn other_keys_are_preserved() {
        let store = temp_store("shared.json");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"volume":"0.5"}"#).unwrap();
        store.mark_seen();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("volume"));
        assert!(text.contains(ONBOARDING_KEY));
        std::fs::remove_file(store.path()).ok();
    }

    #[tokio::test]
    async fn mark_seen_writes_off_the_runtime_thread() {
        let store = temp_store("async.json");
        let write = store.mark_seen().expect("runtime present");
        write.await.unwrap();
        assert!(store.has_seen());
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn mark_seen_without_runtime_writes_inline() {
        let store = temp_store("inline.json");
        assert!(store.mark_seen().is_none());
        assert!(store.has_seen());
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn unwritable_location_is_ignored() {
        let dir = temp_store("dir_as_file.json");
        std::fs::create_dir_all(dir.path()).unwrap();
        // The path is a directory, so the write fails; nothing panics.
        dir.mark_seen();
        assert!(!dir.has_seen());
        std::fs::remove_dir_all(dir.path()).ok();
    }
}
