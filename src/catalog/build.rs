//! Build-refresh guard.
//!
//! `build.txt` does double duty: its contents are the build number the
//! catalogs were last rebuilt from, and its mtime caches the "what is the
//! current build" question for 24 hours so a run that opens four catalogs
//! asks the API at most once a day.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::api::GameApi;
use crate::error::Result;

const BUILD_FILE: &str = "build.txt";

/// How long a fetched build number is trusted before re-asking the API.
const BUILD_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Decides whether the on-disk catalogs match the current game build.
pub struct BuildGuard {
    path: PathBuf,
}

impl BuildGuard {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(BUILD_FILE),
        }
    }

    /// Build number the catalogs were last rebuilt from, if any.
    pub fn recorded_build(&self) -> Option<u64> {
        let text = fs::read_to_string(&self.path).ok()?;
        text.trim().parse().ok()
    }

    fn recorded_age(&self) -> Option<Duration> {
        let meta = fs::metadata(&self.path).ok()?;
        meta.modified().ok()?.elapsed().ok()
    }

    /// The current build when the catalogs need a full rebuild, `None`
    /// when they are current.
    ///
    /// Within [`BUILD_CHECK_INTERVAL`] of the last check the recorded build
    /// is trusted and the API is not consulted. In offline mode the check
    /// is suppressed entirely; whatever is on disk is current enough.
    pub async fn needs_rebuild(&self, api: &dyn GameApi, offline: bool) -> Result<Option<u64>> {
        if offline {
            return Ok(None);
        }

        let recorded = self.recorded_build();
        if recorded.is_some() && self.recorded_age().is_some_and(|a| a < BUILD_CHECK_INTERVAL) {
            debug!(build = recorded, "build checked recently, trusting catalogs");
            return Ok(None);
        }

        let current = api.build_id().await?;
        match recorded {
            Some(recorded) if recorded == current => {
                // Same build; refresh the mtime so the next 24 h skip the fetch.
                self.record(current)?;
                Ok(None)
            }
            Some(recorded) => {
                info!(recorded, current, "game build changed, catalogs are stale");
                Ok(Some(current))
            }
            None => {
                info!(current, "no recorded build, catalogs need a first build");
                Ok(Some(current))
            }
        }
    }

    /// Record `build` as the one the catalogs now reflect.
    pub fn record(&self, build: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{build}\n"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let guard = BuildGuard::new(dir.path());
        assert_eq!(guard.recorded_build(), None);

        guard.record(175_842).unwrap();
        assert_eq!(guard.recorded_build(), Some(175_842));
    }

    #[test]
    fn garbage_build_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(BUILD_FILE), "not a number").unwrap();
        let guard = BuildGuard::new(dir.path());
        assert_eq!(guard.recorded_build(), None);
    }
}
