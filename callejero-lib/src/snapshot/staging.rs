use crate::Result;
use fs4::fs_std::FileExt;
use ohno::{IntoAppError, bail};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Log target for `staging`
const LOG_TARGET: &str = "   builder";

pub const BUILD_LOCK_FILE_NAME: &str = "build.lock";

const STAGING_PREFIX: &str = ".staging-";

/// Exclusive access to a snapshots root for the duration of one build.
///
/// Holding a `BuildStage` means holding `build.lock`. A version is assembled in a hidden
/// staging directory and becomes visible only through [`BuildStage::commit`]. Dropping the
/// stage removes anything staged but not committed, then releases the lock.
#[derive(Debug)]
pub struct BuildStage {
    lock: File,
    root: PathBuf,
    staged: Option<(String, PathBuf)>,
}

impl BuildStage {
    /// Waits for any running build on `root`, then clears staging directories abandoned by
    /// builds that never finished.
    pub async fn begin(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).into_app_err_with(|| format!("unable to create snapshots directory '{}'", root.display()))?;

        let lock_path = root.join(BUILD_LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .into_app_err_with(|| format!("opening build lock file at '{}'", lock_path.display()))?;

        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || {
            file.lock_exclusive()
                .into_app_err_with(|| format!("waiting for the build lock at '{}'", lock_path.display()))?;
            log::debug!(target: LOG_TARGET, "Acquired build lock at '{}'", lock_path.display());

            let stage = Self {
                lock: file,
                root,
                staged: None,
            };
            stage.clear_abandoned()?;
            Ok::<_, ohno::AppError>(stage)
        })
        .await
        .into_app_err("build lock task panicked")?
    }

    fn clear_abandoned(&self) -> Result<()> {
        for entry in fs::read_dir(&self.root).into_app_err_with(|| format!("unable to list '{}'", self.root.display()))? {
            let entry = entry?;
            let abandoned = entry.file_name().to_str().is_some_and(|name| name.starts_with(STAGING_PREFIX));
            if abandoned && entry.file_type()?.is_dir() {
                log::warn!(target: LOG_TARGET, "Removing staging directory left by an interrupted build: '{}'", entry.path().display());
                fs::remove_dir_all(entry.path())
                    .into_app_err_with(|| format!("unable to remove '{}'", entry.path().display()))?;
            }
        }
        Ok(())
    }

    /// Creates the staging directory for `version` and returns its path.
    pub fn stage(&mut self, version: &str) -> Result<PathBuf> {
        if let Some((staged, _)) = &self.staged {
            bail!("snapshot '{staged}' is already staged");
        }

        let path = self.root.join(format!("{STAGING_PREFIX}{version}"));
        fs::create_dir(&path).into_app_err_with(|| format!("unable to create staging directory '{}'", path.display()))?;
        self.staged = Some((version.to_string(), path.clone()));
        Ok(path)
    }

    /// Renames the staged directory to `<root>/<version>` and returns the new path.
    pub fn commit(&mut self) -> Result<PathBuf> {
        let Some((version, staging)) = &self.staged else {
            bail!("no snapshot has been staged");
        };

        let final_dir = self.root.join(version);
        fs::rename(staging, &final_dir).into_app_err_with(|| format!("unable to move snapshot into '{}'", final_dir.display()))?;
        self.staged = None;
        Ok(final_dir)
    }
}

impl Drop for BuildStage {
    fn drop(&mut self) {
        if let Some((_, staging)) = self.staged.take()
            && let Err(e) = fs::remove_dir_all(&staging)
        {
            log::warn!(target: LOG_TARGET, "Could not remove staging directory '{}': {e:#}", staging.display());
        }

        if let Err(e) = self.lock.unlock() {
            log::warn!(target: LOG_TARGET, "Could not release the build lock of '{}': {e:#}", self.root.display());
        }
    }
}
