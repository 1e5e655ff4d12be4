//! Filesystem side of a run: directories, discovery, backups, timestamps,
//! and atomic output writes

use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{RandomizerError, Result};

/// Office writes `~$name.xlsx` owner files next to open workbooks
const LOCK_FILE_PREFIX: &str = "~$";

/// Create each directory (and its parents) if missing
pub fn prepare_directories<I, P>(dirs: I) -> Result<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for dir in dirs {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| RandomizerError::io(dir, e))?;
        log::info!("directory ready: {}", dir.display());
    }
    Ok(())
}

/// List regular files in `dir` whose extension is one of `extensions`
/// (compared case-insensitively), sorted by file name.
pub fn discover_files<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| RandomizerError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RandomizerError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        if name.starts_with(LOCK_FILE_PREFIX) {
            log::debug!("skipping lock file {}", name);
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.as_ref().eq_ignore_ascii_case(ext)));
        if matches_extension {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// `dir/<file name of path>`
pub fn mirrored_path(path: &Path, dir: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        RandomizerError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    Ok(dir.join(name))
}

/// Copy `path` into `backup_dir` unless a backup with the same file name
/// already exists. Returns `true` when a copy was made.
pub fn backup_file(path: &Path, backup_dir: &Path) -> Result<bool> {
    let backup_path = mirrored_path(path, backup_dir)?;

    if backup_path.exists() {
        log::info!("backup already exists: {}", backup_path.display());
        return Ok(false);
    }

    fs::copy(path, &backup_path).map_err(|e| RandomizerError::io(&backup_path, e))?;
    if let Err(e) = preserve_timestamps(path, &backup_path) {
        log::debug!("backup keeps copy-time timestamps: {}", e);
    }
    log::info!("backup created: {}", backup_path.display());
    Ok(true)
}

/// Copy the access and modification times of `source` onto `target`
pub fn preserve_timestamps(source: &Path, target: &Path) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| RandomizerError::io(source, e))?;
    let accessed = metadata
        .accessed()
        .map_err(|e| RandomizerError::io(source, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| RandomizerError::io(source, e))?;

    let times = FileTimes::new()
        .set_accessed(accessed)
        .set_modified(modified);

    File::options()
        .write(true)
        .open(target)
        .and_then(|file| file.set_times(times))
        .map_err(|e| RandomizerError::io(target, e))
}

/// Write `path` through a temporary file in the same directory, renamed into
/// place once `write` succeeds. A failed or interrupted write leaves any
/// previous file at `path` untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| RandomizerError::io(dir, e))?;
    write(&mut temp)?;
    temp.flush().map_err(|e| RandomizerError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| RandomizerError::io(path, e.error))?;
    Ok(())
}
