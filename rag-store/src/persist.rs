//! Crash-safe full-file rewrites.
//!
//! Each store is persisted by writing a sibling `<name>.tmp`, flushing and
//! syncing it, then renaming it over the target. A crash at any point leaves
//! either the previous file or the new one on disk, never a torn mix.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::RagError;

/// Result of loading a persisted store. Loading never fails; this records
/// what happened so callers (and tests) can tell the fallbacks apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was read; holds the number of entries.
    Loaded(usize),
    /// No file at the path; started empty.
    Missing,
    /// The file could not be decoded; started empty.
    Corrupt(String),
}

impl LoadOutcome {
    /// Number of entries recovered from disk.
    pub fn count(&self) -> usize {
        match self {
            LoadOutcome::Loaded(n) => *n,
            _ => 0,
        }
    }
}

/// Path of the temporary sibling used while rewriting `path`.
pub fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replaces `path` with the bytes produced by `write`.
///
/// # Errors
/// Returns [`RagError::Io`] if any step fails; the previous file stays intact
/// and the temporary file is removed on a best-effort basis.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), RagError>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temporary_path(path);
    trace!(path = %path.display(), tmp = %tmp.display(), "persist: writing temporary file");

    let result = (|| -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp)?;
        {
            let mut writer = BufWriter::with_capacity(64 * 1024, &mut file);
            write(&mut writer)?;
            writer.flush()?;
        }
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        sync_parent_directory(path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(RagError::Io(e));
    }

    debug!(path = %path.display(), "persist: file replaced");
    Ok(())
}

#[cfg(unix)]
fn sync_parent_directory(path: &Path) -> io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => File::open(parent)?.sync_all(),
        None => File::open(".")?.sync_all(),
    }
}

#[cfg(not(unix))]
fn sync_parent_directory(_path: &Path) -> io::Result<()> {
    Ok(())
}
