use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use converter_core::RawFile;
use engine_logging::engine_debug;
use walkdir::WalkDir;

/// Turns command-line paths into raw selection entries.
///
/// A directory contributes every file below it as `<dir name>/<path under it>`.
/// A plain file contributes its bare name, which the collector refuses.
pub fn collect_selection(paths: &[PathBuf]) -> anyhow::Result<Vec<RawFile>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if metadata.is_dir() {
            collect_directory(path, &mut files)?;
        } else {
            let name = display_name(path)?;
            let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
            files.push(RawFile::new(name, bytes));
        }
    }
    Ok(files)
}

fn collect_directory(path: &Path, files: &mut Vec<RawFile>) -> anyhow::Result<()> {
    let root = fs::canonicalize(path)
        .with_context(|| format!("cannot resolve {}", path.display()))?;
    let dir_name = display_name(&root)?;
    let before = files.len();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(&root)?;
        let under: Vec<String> = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy().into_owned())
            .collect();
        let bytes = fs::read(entry.path())
            .with_context(|| format!("cannot read {}", entry.path().display()))?;
        files.push(RawFile::new(
            format!("{}/{}", dir_name, under.join("/")),
            bytes,
        ));
    }

    engine_debug!(
        "Collected {} files from directory {}",
        files.len() - before,
        dir_name
    );
    Ok(())
}

fn display_name(path: &Path) -> anyhow::Result<String> {
    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => bail!("{} has no name to group files under", path.display()),
    }
}
