use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("unusable output directory {0}")]
    OutputDir(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Create `dir` and its parents if needed, then prove that files can be
/// created inside it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |err: io::Error| PersistError::OutputDir(format!("{}: {err}", dir.display()));
    fs::create_dir_all(dir).map_err(unusable)?;
    if !dir.is_dir() {
        return Err(PersistError::OutputDir(format!(
            "{}: not a directory",
            dir.display()
        )));
    }
    tempfile::Builder::new()
        .prefix(".write-probe")
        .tempfile_in(dir)
        .map_err(unusable)?;
    Ok(())
}

/// Replace `target` with `content` (UTF-8) by writing a sibling temp file and
/// renaming it over the target. Readers see the old or the new file, never a
/// partial one.
pub fn write_atomic(target: &Path, content: &str) -> Result<(), PersistError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
