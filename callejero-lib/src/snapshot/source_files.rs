use crate::Result;
use crate::entities::EntityKind;
use ohno::IntoAppError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Log target for source discovery
const LOG_TARGET: &str = "   builder";

/// Finds the source file of each entity kind under `input_dir`.
///
/// A file belongs to an entity when its name starts with the entity prefix and has an
/// extension. It may sit directly in `input_dir` or in a `caj_esp_MMYYYY` directory below it.
/// When several files match, the lexicographically first path wins.
pub fn locate_sources(input_dir: &Path) -> Result<BTreeMap<EntityKind, PathBuf>> {
    let mut candidates: BTreeMap<EntityKind, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(2) {
        let entry = entry.into_app_err_with(|| format!("unable to scan input directory '{}'", input_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        if entry.depth() == 2 {
            let in_period_dir = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .is_some_and(is_period_dir_name);
            if !in_period_dir {
                continue;
            }
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if let Some(kind) = EntityKind::ALL.into_iter().find(|kind| matches_prefix(name, kind.prefix())) {
            candidates.entry(kind).or_default().push(entry.into_path());
        }
    }

    Ok(candidates
        .into_iter()
        .filter_map(|(kind, mut paths)| {
            paths.sort();
            if paths.len() > 1 {
                log::warn!(
                    target: LOG_TARGET,
                    "Found {} candidate files for {kind}, using '{}'",
                    paths.len(),
                    paths[0].display()
                );
            }
            paths.into_iter().next().map(|path| (kind, path))
        })
        .collect())
}

/// `caj_esp_` followed by six digits.
fn is_period_dir_name(name: &str) -> bool {
    name.strip_prefix("caj_esp_")
        .is_some_and(|rest| rest.len() == 6 && rest.bytes().all(|b| b.is_ascii_digit()))
}

fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix).is_some_and(|rest| rest.contains('.'))
}
