use super::Host;
use super::common::{DataDirs, GlobalArgs, LogLevel, init_logging, load_config};
use super::config::Config;
use super::progress_reporter::ProgressReporter;
use crate::Result;
use crate::archive::{ArchiveSource, HttpMirror, extract_archive};
use crate::progress::Progress;
use crate::snapshot::{BuildOptions, BuildReport, build_snapshot};
use camino::Utf8PathBuf;
use chrono::{Local, Utc};
use clap::Parser;
use core::time::Duration;
use ohno::IntoAppError;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Log target for the build command
const LOG_TARGET: &str = "     build";

/// How long a build may run before its progress bar appears.
const PROGRESS_DELAY: Duration = Duration::from_millis(300);

/// Keeps the bar hidden for good when log lines would interleave with it.
const PROGRESS_DELAY_WITH_LOGGING: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Build from files already extracted in this directory instead of downloading the archive
    #[arg(long, value_name = "PATH")]
    pub input_dir: Option<Utf8PathBuf>,

    /// Read at most this many lines from each source file
    #[arg(long, value_name = "COUNT")]
    pub max_lines: Option<u64>,

    /// Build even when the mirror already holds a snapshot of the latest archive
    #[arg(long)]
    pub force: bool,
}

/// Where the source files of a build come from.
struct Sources {
    input_dir: PathBuf,
    archive_name: Option<String>,
}

pub async fn build<H: Host>(host: &mut H, global: &GlobalArgs, args: &BuildArgs) -> Result<()> {
    init_logging(global.log_level);

    let config = load_config(global)?;
    let dirs = DataDirs::resolve(global.data_dir.as_deref())?;
    let mirror = match config.mirror_url()? {
        Some(url) => Some(HttpMirror::new(&url, &config.mirror_object, config.download_timeout)?),
        None => None,
    };

    let delay = if global.log_level == LogLevel::None {
        PROGRESS_DELAY
    } else {
        PROGRESS_DELAY_WITH_LOGGING
    };
    let progress = ProgressReporter::new(delay, global.color.enabled(std::io::stderr().is_terminal()));

    let result = build_core(host, &config, &dirs, mirror.as_ref(), args, &progress).await;
    progress.done();
    result
}

async fn build_core<H: Host>(
    host: &mut H,
    config: &Config,
    dirs: &DataDirs,
    mirror: Option<&HttpMirror>,
    args: &BuildArgs,
    progress: &ProgressReporter,
) -> Result<()> {
    let sources = if let Some(input_dir) = &args.input_dir {
        Sources {
            input_dir: input_dir.as_std_path().to_path_buf(),
            archive_name: None,
        }
    } else {
        let Some(sources) = fetch_sources(host, config, dirs, mirror, args.force, progress).await? else {
            return Ok(());
        };
        sources
    };

    let options = BuildOptions {
        input_dir: sources.input_dir,
        output_dir: dirs.work().join("tables"),
        snapshots_root: dirs.snapshots(),
        source: sources.archive_name.clone(),
        retention: config.snapshot_retention,
        max_lines: args.max_lines,
    };

    let report = build_snapshot(&options, Utc::now(), progress).await?;
    print_report(host, &report);

    if let (Some(mirror), Some(archive_name)) = (mirror, &sources.archive_name) {
        let snapshot_dir = options.snapshots_root.join(&report.version);
        if mirror.upload(&snapshot_dir, archive_name).await {
            let _ = writeln!(host.output(), "Mirrored to {}", mirror.object_url());
        } else {
            let _ = writeln!(host.error(), "warning: the snapshot could not be mirrored; the local snapshot is unaffected");
        }
    }

    Ok(())
}

/// Downloads and extracts the newest archive, or returns `None` when the mirror already
/// holds a snapshot built from it.
async fn fetch_sources<H: Host>(
    host: &mut H,
    config: &Config,
    dirs: &DataDirs,
    mirror: Option<&HttpMirror>,
    force: bool,
    progress: &ProgressReporter,
) -> Result<Option<Sources>> {
    let source = ArchiveSource::new(&config.archive_base_url()?, config.download_timeout)?;

    progress.set_phase("Probing");
    let period = source.find_latest(Local::now().date_naive()).await?;
    let archive_name = period.archive_name();

    if !force
        && let Some(mirror) = mirror
        && mirror.holds_source(&archive_name).await
    {
        log::info!(target: LOG_TARGET, "Mirror already holds a snapshot of {archive_name}");
        let _ = writeln!(host.output(), "Snapshot of {archive_name} is already mirrored, nothing to build (use --force to rebuild)");
        return Ok(None);
    }

    let work_dir = dirs.work().join(period.code());

    progress.set_phase("Download");
    let zip_path = source.download(period, &work_dir, Arc::new(progress.clone()) as Arc<dyn Progress>).await?;

    progress.set_phase("Extract");
    let input_dir = work_dir.join("input");
    let zip_clone = zip_path.clone();
    let input_clone = input_dir.clone();
    let extracted = tokio::task::spawn_blocking(move || extract_archive(&zip_clone, &input_clone))
        .await
        .into_app_err("archive extraction task panicked")??;
    log::info!(target: LOG_TARGET, "Extracted {} file(s) from '{}'", extracted.len(), zip_path.display());

    Ok(Some(Sources {
        input_dir,
        archive_name: Some(archive_name),
    }))
}

fn print_report<H: Host>(host: &mut H, report: &BuildReport) {
    let mut out = host.output();

    let _ = writeln!(out, "Published snapshot {}", report.version);
    for entity in &report.entities {
        let stats = &entity.stats;
        let _ = write!(out, "  {:<5} {:>9} row(s)", entity.kind.to_string(), entity.rows);
        if stats.duplicate_rows > 0 {
            let _ = write!(out, ", {} duplicate(s) dropped", stats.duplicate_rows);
        }
        if stats.has_leniency() {
            let _ = write!(
                out,
                ", {} line(s) with unmappable bytes, {} value(s) set to null",
                stats.lines_with_unmappable_bytes, stats.degraded_values
            );
        }
        let _ = writeln!(out);
    }

    for kind in &report.skipped {
        let _ = writeln!(out, "  {:<5} skipped, no source file", kind.to_string());
    }

    if !report.pruned.is_empty() {
        let _ = writeln!(out, "Removed old snapshot(s): {}", report.pruned.join(", "));
    }
}
