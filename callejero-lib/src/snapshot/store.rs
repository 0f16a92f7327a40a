use super::Snapshot;
use crate::Result;
use crate::path_utils::is_safe_path_component;
use ohno::{IntoAppError, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Log target for the snapshot store
const LOG_TARGET: &str = "  snapshot";

/// Name of the file holding the published version, in the snapshots root.
pub const CURRENT_FILE_NAME: &str = "CURRENT";

/// Owns the current snapshot of a snapshots root.
///
/// Readers clone the `Arc` and keep using it for as long as they like; publishing a new
/// snapshot only swaps the handle.
#[derive(Debug)]
pub struct SnapshotStore {
    root: PathBuf,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: RwLock::new(None),
        }
    }

    /// Installs `snapshot` as the current one and returns the previous handle.
    fn replace(&self, snapshot: Arc<Snapshot>) -> Option<Arc<Snapshot>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner).replace(snapshot)
    }

    /// Loads the version named by `CURRENT` and makes it current.
    ///
    /// The previous snapshot stays in place if loading fails.
    pub fn load(&self) -> Result<Arc<Snapshot>> {
        let Some(version) = read_current_version(&self.root)? else {
            bail!("no snapshot has been published under '{}'; run the build command first", self.root.display());
        };

        let snapshot = Arc::new(Snapshot::open(&self.root.join(&version))?);
        match self.replace(Arc::clone(&snapshot)) {
            Some(previous) => log::debug!(target: LOG_TARGET, "Snapshot '{version}' replaces '{}'", previous.version()),
            None => log::debug!(target: LOG_TARGET, "Snapshot '{version}' is now current"),
        }
        Ok(snapshot)
    }
}

/// Returns the published version, or `None` if nothing was published yet.
pub fn read_current_version(root: &Path) -> Result<Option<String>> {
    let path = root.join(CURRENT_FILE_NAME);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).into_app_err_with(|| format!("unable to read '{}'", path.display())),
    };

    let version = text.trim();
    if !is_safe_path_component(version) {
        bail!("'{}' names an invalid snapshot version '{version}'", path.display());
    }

    Ok(Some(version.to_string()))
}

/// Atomically points `CURRENT` at `version`.
pub fn write_current_version(root: &Path, version: &str) -> Result<()> {
    let tmp = root.join(format!("{CURRENT_FILE_NAME}.tmp"));
    let path = root.join(CURRENT_FILE_NAME);

    fs::write(&tmp, format!("{version}\n")).into_app_err_with(|| format!("unable to write '{}'", tmp.display()))?;
    fs::rename(&tmp, &path).into_app_err_with(|| format!("unable to replace '{}'", path.display()))
}

/// Lists published version directories, oldest first.
///
/// Staging directories and files are ignored.
pub fn list_versions(root: &Path) -> Result<Vec<String>> {
    let mut versions = Vec::new();
    for entry in fs::read_dir(root).into_app_err_with(|| format!("unable to list '{}'", root.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        if let Some(name) = entry.file_name().to_str()
            && !name.starts_with('.')
        {
            versions.push(name.to_string());
        }
    }

    versions.sort_unstable();
    Ok(versions)
}

/// Deletes all but the newest `retain` versions, never touching `keep`.
///
/// Best effort: failures are logged and the remaining versions are still processed.
/// Returns the versions that were removed.
#[must_use]
pub fn prune_versions(root: &Path, retain: usize, keep: &str) -> Vec<String> {
    let versions = match list_versions(root) {
        Ok(v) => v,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not list snapshot versions for pruning: {e:#}");
            return Vec::new();
        }
    };

    let excess = versions.len().saturating_sub(retain.max(1));
    let mut removed = Vec::new();
    for version in versions.into_iter().take(excess).filter(|v| v != keep) {
        let dir = root.join(&version);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                log::debug!(target: LOG_TARGET, "Removed old snapshot '{version}'");
                removed.push(version);
            }
            Err(e) => log::warn!(target: LOG_TARGET, "Could not remove old snapshot '{}': {e:#}", dir.display()),
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Manifest;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_current_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_current_version(dir.path()).unwrap(), None);

        write_current_version(dir.path(), "v1").unwrap();
        assert_eq!(read_current_version(dir.path()).unwrap().as_deref(), Some("v1"));

        write_current_version(dir.path(), "v2").unwrap();
        assert_eq!(read_current_version(dir.path()).unwrap().as_deref(), Some("v2"));
        assert!(!dir.path().join("CURRENT.tmp").exists());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_current_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CURRENT_FILE_NAME), "../elsewhere").unwrap();
        let _ = read_current_version(dir.path()).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_prune_keeps_newest_and_current() {
        let dir = tempfile::tempdir().unwrap();
        for v in ["v1", "v2", "v3", "v4", ".staging-v5"] {
            fs::create_dir(dir.path().join(v)).unwrap();
        }
        fs::write(dir.path().join(CURRENT_FILE_NAME), "v4").unwrap();

        let removed = prune_versions(dir.path(), 2, "v1");
        assert_eq!(removed, vec!["v2".to_string()]);
        assert_eq!(list_versions(dir.path()).unwrap(), vec!["v1", "v3", "v4"]);
        assert!(dir.path().join(".staging-v5").exists());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_without_publish_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let _ = store.load().unwrap_err();
    }

    #[test]
    fn test_replace_keeps_old_handles_valid() {
        let snapshot = |version: &str| {
            let manifest = Manifest {
                version: version.to_string(),
                source: None,
                created_at: Utc::now(),
                tables: BTreeMap::new(),
            };
            Arc::new(Snapshot::from_rows(manifest, Vec::new(), Vec::new()))
        };

        let store = SnapshotStore::new("unused");
        let first = snapshot("v1");
        assert!(store.replace(Arc::clone(&first)).is_none());

        let previous = store.replace(snapshot("v2")).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert_eq!(first.version(), "v1");
    }
}
