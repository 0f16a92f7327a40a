use crate::Result;
use chrono::{DateTime, Utc};
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Describes one published snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,

    /// Name of the archive the snapshot was built from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Row count per table file name.
    pub tables: BTreeMap<String, u64>,
}

impl Manifest {
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let text = std::fs::read_to_string(&path).into_app_err_with(|| format!("unable to read '{}'", path.display()))?;
        serde_json::from_str(&text).into_app_err_with(|| format!("unable to parse '{}'", path.display()))
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let text = serde_json::to_string_pretty(self).into_app_err("unable to serialize snapshot manifest")?;
        std::fs::write(&path, text).into_app_err_with(|| format!("unable to write '{}'", path.display()))
    }
}
