use crate::Result;
use crate::path_utils::sanitize_path_component;
use flate2::read::DeflateDecoder;
use ohno::{IntoAppError, app_err, bail};
use rawzip::{CompressionMethod, ZipArchive};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Log target for archive extraction
const LOG_TARGET: &str = "   extract";

/// Extracts every file of the zip archive at `zip_path` below `dest_dir`.
///
/// Directory structure inside the archive is kept, with each path component sanitized so no
/// entry can land outside `dest_dir`. Stored and deflated entries are supported.
/// Returns the paths of the extracted files.
pub fn extract_archive(zip_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    let file = File::open(zip_path).into_app_err_with(|| format!("unable to open archive '{}'", zip_path.display()))?;

    let mut buf = vec![0u8; rawzip::RECOMMENDED_BUFFER_SIZE];
    let archive = ZipArchive::with_max_search_space(64 * 1024)
        .locate_in_file(file, &mut buf)
        .map_err(|(_, e)| app_err!("'{}' is not a valid zip archive: {e}", zip_path.display()))?;

    let mut pending = Vec::new();
    let mut entries = archive.entries(&mut buf);
    while let Some(entry) = entries.next_entry().map_err(|e| app_err!("unable to read zip directory: {e}"))? {
        let name = String::from_utf8_lossy(entry.file_path().as_ref()).into_owned();
        pending.push((name, entry.compression_method(), entry.wayfinder()));
    }

    let mut extracted = Vec::new();
    for (name, compression, wayfinder) in pending {
        let Some(relative) = safe_relative_path(&name) else {
            continue;
        };

        let target = dest_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).into_app_err_with(|| format!("unable to create directory '{}'", parent.display()))?;
        }

        let zip_entry = archive.get_entry(wayfinder).map_err(|e| app_err!("unable to read zip entry '{name}': {e}"))?;
        let out = File::create(&target).into_app_err_with(|| format!("unable to create '{}'", target.display()))?;
        let mut out = BufWriter::with_capacity(1024 * 1024, out);

        let copied = if compression == CompressionMethod::Deflate {
            io::copy(&mut DeflateDecoder::new(zip_entry.reader()), &mut out)
        } else if compression == CompressionMethod::Store {
            io::copy(&mut zip_entry.reader(), &mut out)
        } else {
            bail!("zip entry '{name}' uses an unsupported compression method");
        };
        let written = copied.into_app_err_with(|| format!("unable to extract '{name}'"))?;
        out.flush()?;

        log::debug!(target: LOG_TARGET, "Extracted '{name}' ({written} bytes)");
        extracted.push(target);
    }

    log::info!(
        target: LOG_TARGET,
        "Extracted {} file(s) from '{}' in {:.3}s",
        extracted.len(),
        zip_path.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(extracted)
}

/// Turns an archive entry name into a relative path, or `None` for directory entries.
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    if name.ends_with('/') || name.ends_with('\\') {
        return None;
    }

    let path: PathBuf = name
        .split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .map(sanitize_path_component)
        .collect();

    (!path.as_os_str().is_empty()).then_some(path)
}
