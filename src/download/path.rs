//! Destination path allocation with collision-avoiding numeric suffixes.

use std::path::{Path, PathBuf};

/// Builds the destination path for a download.
///
/// Creates `root/subdir` (and missing ancestors) idempotently when a
/// subdirectory is given. When `overwrite` is false and the target exists,
/// a numeric disambiguator is inserted before the extension, starting at 2
/// (`name_2.ext`, `name_3.ext`, ...).
///
/// The returned path's parent directory exists, and with `overwrite` false
/// no file occupied the path at the moment of allocation. The remaining
/// probe-to-create gap is closed by the caller opening the file with
/// `create_new`.
pub(crate) fn allocate_path(
    root: &Path,
    subdir: &str,
    filename: &str,
    overwrite: bool,
) -> std::io::Result<PathBuf> {
    let dir = if subdir.is_empty() {
        root.to_path_buf()
    } else {
        let dir = root.join(subdir);
        std::fs::create_dir_all(&dir)?;
        dir
    };

    let target = dir.join(filename);
    if overwrite || !target.exists() {
        return Ok(target);
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename, ""),
    };

    // "1" is implicit in the undecorated name, so suffixes start at 2
    for tries in 2..10_000 {
        let candidate = dir.join(format!("{stem}_{tries}{ext}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fallback (extremely unlikely)
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Ok(dir.join(format!("{stem}_{timestamp}{ext}")))
}
