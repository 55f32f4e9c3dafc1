use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::error::MigrateBagError;

// ═══════════════════════════════════════════════════════════════
//  Discovery
// ═══════════════════════════════════════════════════════════════

/// Collect container files from `sources`.
///
/// A directory contributes its direct entries with `extension`, sorted by
/// name; anything else in it is logged and skipped. A file is taken as is
/// when it has the extension. Duplicates are removed, first occurrence wins.
pub fn discover(sources: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, MigrateBagError> {
    let mut found: Vec<PathBuf> = Vec::new();

    for source in sources {
        let meta = std::fs::metadata(source)
            .map_err(|e| MigrateBagError::io("inspect source", source, e))?;

        if meta.is_file() {
            if has_extension(source, extension) {
                push_unique(&mut found, source.clone());
            } else {
                tracing::error!(path = %source.display(), extension, "source is not a container, skipping");
            }
            continue;
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(source)
            .map_err(|e| MigrateBagError::io("read source directory", source, e))?
            .filter_map(|entry| match entry {
                Ok(e) => Some(e.path()),
                Err(e) => {
                    tracing::warn!(dir = %source.display(), error = %e, "unreadable directory entry");
                    None
                }
            })
            .collect();
        entries.sort();

        for path in entries {
            if path.is_file() && has_extension(&path, extension) {
                push_unique(&mut found, path);
            } else {
                tracing::error!(path = %path.display(), "unexpected entry in source directory, skipping");
            }
        }
    }

    Ok(found)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|e| e == extension)
}

fn push_unique(found: &mut Vec<PathBuf>, path: PathBuf) {
    if !found.contains(&path) {
        found.push(path);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Naming
// ═══════════════════════════════════════════════════════════════

/// File name of the migrated container.
///
/// `name_v1.jsonl` migrated 1 → 3 becomes `name_v3.jsonl`; a stem without
/// the `_v{from}` suffix gets `_v{to}` appended: `name.jsonl` → `name_v3.jsonl`.
pub fn migrated_file_name(source: &Path, from: u32, to: u32) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!("_v{from}");
    let base = stem.strip_suffix(&suffix).unwrap_or(&stem);

    match source.extension() {
        Some(ext) => format!("{base}_v{to}.{}", ext.to_string_lossy()),
        None => format!("{base}_v{to}"),
    }
}

/// File name of the backup copy: `<name>.bak`.
pub fn backup_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{name}.bak")
}

/// Where one container is read, staged, published and backed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPlan {
    pub source: PathBuf,
    pub scratch: PathBuf,
    pub output: PathBuf,
    pub backup: PathBuf,
}

impl ContainerPlan {
    pub fn new(source: &Path, from: u32, to: u32, tmp_dir: &Path, output_dir: &Path, backup_dir: &Path) -> Self {
        let name = migrated_file_name(source, from, to);
        Self {
            source: source.to_path_buf(),
            scratch: tmp_dir.join(&name),
            output: output_dir.join(&name),
            backup: backup_dir.join(backup_file_name(source)),
        }
    }
}

/// План для каждого контейнера. Два источника с одним именем из разных
/// каталогов дали бы один scratch, один выход и один `.bak`; такой запуск
/// отклоняется целиком, до первого перемещения.
pub fn plan_all(
    containers: &[PathBuf],
    from: u32,
    to: u32,
    tmp_dir: &Path,
    output_dir: &Path,
    backup_dir: &Path,
) -> Result<Vec<ContainerPlan>, MigrateBagError> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut plans = Vec::with_capacity(containers.len());

    for source in containers {
        let plan = ContainerPlan::new(source, from, to, tmp_dir, output_dir, backup_dir);
        for target in [&plan.output, &plan.backup] {
            if let Some(first) = claimed.insert(target.clone(), source) {
                return Err(MigrateBagError::NameClash {
                    first: first.to_path_buf(),
                    second: source.clone(),
                    target: target.clone(),
                });
            }
        }
        plans.push(plan);
    }
    Ok(plans)
}

// ═══════════════════════════════════════════════════════════════
//  Relocation
// ═══════════════════════════════════════════════════════════════

/// Move `from` to `to`, replacing `to`. Falls back to copy + remove when the
/// two paths are on different filesystems.
pub fn relocate(from: &Path, to: &Path) -> Result<(), MigrateBagError> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            std::fs::copy(from, to).map_err(|e| MigrateBagError::io("copy to", to, e))?;
            std::fs::remove_file(from).map_err(|e| MigrateBagError::io("remove", from, e))
        }
        Err(e) => Err(MigrateBagError::io("move to", to, e)),
    }
}

/// Create each directory (and its parents) if missing.
pub fn ensure_dirs(dirs: &[&Path]) -> Result<(), MigrateBagError> {
    for dir in dirs {
        std::fs::create_dir_all(dir).map_err(|e| MigrateBagError::io("create directory", *dir, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_suffix_is_replaced() {
        assert_eq!(migrated_file_name(Path::new("/d/run_v1.jsonl"), 1, 3), "run_v3.jsonl");
    }

    #[test]
    fn version_suffix_is_appended() {
        assert_eq!(migrated_file_name(Path::new("/d/run.jsonl"), 1, 3), "run_v3.jsonl");
        // Only the `_v{from}` suffix counts.
        assert_eq!(migrated_file_name(Path::new("run_v2.jsonl"), 1, 3), "run_v2_v3.jsonl");
        assert_eq!(migrated_file_name(Path::new("v1_run.jsonl"), 1, 3), "v1_run_v3.jsonl");
    }

    #[test]
    fn backup_keeps_full_name() {
        assert_eq!(backup_file_name(Path::new("/d/run_v1.jsonl")), "run_v1.jsonl.bak");
    }

    #[test]
    fn plan_joins_directories() {
        let plan = ContainerPlan::new(
            Path::new("/in/a_v1.jsonl"),
            1,
            2,
            Path::new("/tmp"),
            Path::new("/out"),
            Path::new("/bak"),
        );
        assert_eq!(plan.scratch, PathBuf::from("/tmp/a_v2.jsonl"));
        assert_eq!(plan.output, PathBuf::from("/out/a_v2.jsonl"));
        assert_eq!(plan.backup, PathBuf::from("/bak/a_v1.jsonl.bak"));
    }

    #[test]
    fn same_name_in_two_sources_is_rejected() {
        let containers = vec![PathBuf::from("/d1/x.jsonl"), PathBuf::from("/d2/x.jsonl")];
        let err = plan_all(&containers, 0, 1, Path::new("/tmp"), Path::new("/out"), Path::new("/bak"))
            .unwrap_err();
        match err {
            MigrateBagError::NameClash { first, second, target } => {
                assert_eq!(first, PathBuf::from("/d1/x.jsonl"));
                assert_eq!(second, PathBuf::from("/d2/x.jsonl"));
                assert_eq!(target, PathBuf::from("/out/x_v1.jsonl"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn renamed_output_can_clash_with_another_source() {
        // x.jsonl and x_v0.jsonl both migrate to x_v1.jsonl.
        let containers = vec![PathBuf::from("/d/x.jsonl"), PathBuf::from("/d/x_v0.jsonl")];
        assert!(plan_all(&containers, 0, 1, Path::new("/t"), Path::new("/o"), Path::new("/b")).is_err());

        let containers = vec![PathBuf::from("/d/x.jsonl"), PathBuf::from("/d/y.jsonl")];
        let plans = plan_all(&containers, 0, 1, Path::new("/t"), Path::new("/o"), Path::new("/b")).unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jsonl", "a.jsonl", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.jsonl")).unwrap();
        let single = dir.path().join("a.jsonl");

        let found = discover(&[dir.path().to_path_buf(), single.clone()], "jsonl").unwrap();
        assert_eq!(found, vec![single, dir.path().join("b.jsonl")]);
    }

    #[test]
    fn discover_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(&[dir.path().join("nope")], "jsonl").is_err());
    }

    #[test]
    fn relocate_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("x");
        let to = dir.path().join("y");
        std::fs::write(&from, "data").unwrap();

        relocate(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "data");
    }
}
