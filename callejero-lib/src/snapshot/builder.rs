use super::{BuildStage, Manifest, Snapshot, locate_sources, prune_versions, write_current_version, write_table};
use crate::Result;
use crate::entities::{DecodeStats, EntityKind, parse_entity};
use crate::progress::Progress;
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use ohno::{EnrichableExt, IntoAppError, bail};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Log target for the snapshot builder
const LOG_TARGET: &str = "   builder";

/// Inputs of a snapshot build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory holding the extracted source files.
    pub input_dir: PathBuf,

    /// Directory receiving one `<PREFIX>.table` per parsed entity.
    pub output_dir: PathBuf,

    /// Directory holding the published snapshot versions and `CURRENT`.
    pub snapshots_root: PathBuf,

    /// Name of the source archive, recorded in the manifest.
    pub source: Option<String>,

    /// Number of snapshot versions to keep after publishing.
    pub retention: usize,

    /// Maximum number of lines to read per source file.
    pub max_lines: Option<u64>,
}

/// Per-entity results of a build.
#[derive(Debug, Clone)]
pub struct EntityReport {
    pub kind: EntityKind,
    pub source_path: PathBuf,
    pub table_path: PathBuf,
    pub rows: u64,
    pub stats: DecodeStats,
}

/// The outcome of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub version: String,
    pub snapshot: Arc<Snapshot>,
    pub entities: Vec<EntityReport>,
    pub skipped: Vec<EntityKind>,
    pub pruned: Vec<String>,
}

/// Parses every available entity, persists the tables, and publishes a new snapshot.
///
/// Publication is all-or-nothing: when any step fails, `CURRENT` still names the previous
/// version and the partially written snapshot is removed.
pub async fn build_snapshot(options: &BuildOptions, now: DateTime<Utc>, progress: &dyn Progress) -> Result<BuildReport> {
    match build_snapshot_core(options, now, progress).await {
        Ok(report) => Ok(report),
        Err(e) => Err(e.enrich("could not build the street directory snapshot")),
    }
}

async fn build_snapshot_core(options: &BuildOptions, now: DateTime<Utc>, progress: &dyn Progress) -> Result<BuildReport> {
    let start = Instant::now();

    fs::create_dir_all(&options.output_dir)
        .into_app_err_with(|| format!("unable to create output directory '{}'", options.output_dir.display()))?;

    let mut stage = BuildStage::begin(&options.snapshots_root).await?;

    progress.set_phase("Locating");
    let sources = locate_sources(&options.input_dir)?;

    for kind in EntityKind::ALL.into_iter().filter(|k| k.is_required()) {
        if !sources.contains_key(&kind) {
            bail!(
                "source unavailable: no {kind} file found under '{}'; cannot build a snapshot without it",
                options.input_dir.display()
            );
        }
    }

    let skipped: Vec<EntityKind> = EntityKind::ALL.into_iter().filter(|k| !sources.contains_key(k)).collect();
    for kind in &skipped {
        log::warn!(target: LOG_TARGET, "Source unavailable: no {kind} file found, skipping it");
    }

    progress.set_phase("Parsing");
    let entities = parse_all(sources, options, now, progress).await?;

    progress.set_phase("Publishing");
    let version = unique_version(&options.snapshots_root, now);
    let manifest = Manifest {
        version: version.clone(),
        source: options.source.clone(),
        created_at: now,
        tables: entities
            .iter()
            .filter(|e| e.kind.is_required())
            .map(|e| (e.kind.table_file_name(), e.rows))
            .collect(),
    };

    let snapshot = publish(&mut stage, options, &entities, &manifest)?;
    progress.done();

    let pruned = prune_versions(&options.snapshots_root, options.retention, &version);

    log::info!(
        target: LOG_TARGET,
        "Published snapshot '{version}' in {:.3}s",
        start.elapsed().as_secs_f64()
    );

    Ok(BuildReport {
        version,
        snapshot,
        entities,
        skipped,
        pruned,
    })
}

/// Runs one parser per entity on the blocking pool and persists each table as it completes.
async fn parse_all(
    sources: BTreeMap<EntityKind, PathBuf>,
    options: &BuildOptions,
    now: DateTime<Utc>,
    progress: &dyn Progress,
) -> Result<Vec<EntityReport>> {
    let total = sources.len() as u64;
    let finished = Arc::new(AtomicU64::new(0));
    let finished_clone = Arc::clone(&finished);
    progress.set_determinate(Box::new(move || {
        (total, finished_clone.load(Ordering::Relaxed), "Parsing street directory files".to_string())
    }));

    let tasks: Vec<_> = sources
        .into_iter()
        .map(|(kind, source_path)| {
            let table_path = options.output_dir.join(kind.table_file_name());
            let max_lines = options.max_lines;
            let finished = Arc::clone(&finished);

            tokio::task::spawn_blocking(move || {
                let parsed = parse_entity(kind, &source_path, max_lines)?;
                let rows = write_table(&table_path, &parsed.table, now)?;
                let _ = finished.fetch_add(1, Ordering::Relaxed);

                Ok::<_, ohno::AppError>(EntityReport {
                    kind,
                    source_path,
                    table_path,
                    rows,
                    stats: parsed.stats,
                })
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for result in futures::future::join_all(tasks).await {
        reports.push(result.into_app_err("parser task panicked")??);
    }

    Ok(reports)
}

/// Copies the required tables into the staging directory, commits it, loads it, and finally
/// switches `CURRENT`.
fn publish(stage: &mut BuildStage, options: &BuildOptions, entities: &[EntityReport], manifest: &Manifest) -> Result<Arc<Snapshot>> {
    let staging = stage.stage(&manifest.version)?;

    for entity in entities.iter().filter(|e| e.kind.is_required()) {
        let target = staging.join(entity.kind.table_file_name());
        let _ = fs::copy(&entity.table_path, &target)
            .into_app_err_with(|| format!("unable to copy '{}' into the snapshot", entity.table_path.display()))?;
    }
    manifest.write(&staging)?;

    let final_dir = stage.commit()?;

    let snapshot = match Snapshot::open(&final_dir) {
        Ok(snapshot) => Arc::new(snapshot),
        Err(e) => {
            let _ = fs::remove_dir_all(&final_dir);
            return Err(e);
        }
    };

    write_current_version(&options.snapshots_root, &manifest.version)?;
    Ok(snapshot)
}

/// Picks a version name from the build time, adding a suffix if that name is taken.
fn unique_version(root: &Path, now: DateTime<Utc>) -> String {
    let base = now.format("%Y%m%dT%H%M%S%3fZ").to_string();
    let mut candidate = base.clone();
    let mut n = 1;
    while root.join(&candidate).exists() {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_version_format() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 12, 30, 5).unwrap();
        assert_eq!(unique_version(dir.path(), now), "20250701T123005000Z");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_version_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 12, 30, 5).unwrap();
        fs::create_dir(dir.path().join("20250701T123005000Z")).unwrap();
        assert_eq!(unique_version(dir.path(), now), "20250701T123005000Z-1");
    }
}
