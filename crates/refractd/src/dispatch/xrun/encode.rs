//! Encoders turning a transformation result into reply entries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use refract_engine::{EditSet, FileSystem, FileSystemError, FsOperation, LogEntry};

use super::{Mode, XrunError};
use crate::dispatch::response::{FileChange, FsChange, LogLine};

/// Encodes the log and reports whether any entry was fatal.
pub(super) fn encode_log(entries: &[LogEntry]) -> (Vec<LogLine>, bool) {
    let fatal = entries.iter().any(LogEntry::is_fatal);
    (entries.iter().map(LogLine::from).collect(), fatal)
}

/// Encodes every edited file, stopping at the first failure.
pub(super) fn encode_edits(
    filesystem: &dyn FileSystem,
    edits: &BTreeMap<PathBuf, EditSet>,
    mode: Mode,
) -> Result<Vec<FileChange>, XrunError> {
    edits
        .iter()
        .map(|(path, edit_set)| match mode {
            Mode::Patch => encode_patch(filesystem, path, edit_set),
            Mode::Text => encode_content(filesystem, path, edit_set),
        })
        .collect()
}

fn encode_patch(
    filesystem: &dyn FileSystem,
    path: &Path,
    edit_set: &EditSet,
) -> Result<FileChange, XrunError> {
    let patch = edit_set
        .create_patch(filesystem, path)
        .map_err(|error| XrunError::encoding(path, error))?;

    let filename = path.display().to_string();
    let patch_file = format!("{filename}.diff");
    let mut diff = Vec::new();
    patch
        .write(&filename, &filename, &mut diff)
        .map_err(|error| XrunError::encoding(path, FileSystemError::write(&patch_file, error)))?;
    filesystem
        .create_file(Path::new(&patch_file), &diff)
        .map_err(|error| XrunError::encoding(path, error))?;

    Ok(FileChange::Patch {
        filename,
        patch_file,
    })
}

fn encode_content(
    filesystem: &dyn FileSystem,
    path: &Path,
    edit_set: &EditSet,
) -> Result<FileChange, XrunError> {
    let content = edit_set
        .apply_to(filesystem, path)
        .map_err(|error| XrunError::encoding(path, error))?;
    Ok(FileChange::Content {
        filename: path.display().to_string(),
        content,
    })
}

/// Encodes filesystem operations, preserving their order.
pub(super) fn encode_fs_changes(operations: &[FsOperation]) -> Vec<FsChange> {
    operations.iter().map(FsChange::from).collect()
}
