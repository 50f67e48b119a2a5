pub mod local;

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::types::is_list_dir_name;

pub use local::{BoardStore, StoreOptions};

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Path outside board directory: {0}")]
    PathOutsideBoard(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Invalid list name: {0}")]
    InvalidListName(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("List already exists: {0}")]
    ListExists(String),

    #[error("Card not found: {0}")]
    CardNotFound(PathBuf),

    #[error("Card file already exists: {0}")]
    CardExists(PathBuf),

    #[error("List is locked: {0}")]
    ListLocked(String),

    #[error("Source and target lists are the same: {0}")]
    SameList(String),

    #[error("Card template not found: {0}")]
    TemplateNotFound(String),

    #[error("No card ids left above {0}")]
    IdsExhausted(u64),

    #[error("Invalid label names: {old:?} -> {new:?}")]
    InvalidLabel { old: String, new: String },
}

/// Write via a sibling temp file and rename, so a reader never sees a
/// half-written card.
pub(crate) fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("daedalus.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content.as_bytes())?;
    drop(file);
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Size of a file in bytes, 0 if it cannot be stat'd.
pub(crate) fn file_size(path: &Path) -> i64 {
    match fs::metadata(path) {
        Ok(meta) => meta.len() as i64,
        Err(e) => {
            log::warn!("[daedalus.storage] Failed to stat {:?}: {}", path, e);
            0
        }
    }
}

/// Make `path` absolute and fold `.` and `..` components without touching
/// the filesystem.
pub fn normalize_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Resolve symlinks for the longest existing prefix of an absolute,
/// normalized path, then re-append the part that does not exist yet.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(&existing) {
            let mut resolved = canonical;
            for part in tail.iter().rev() {
                resolved.push(part);
            }
            return resolved;
        }
        match (existing.file_name().map(|n| n.to_os_string()), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name);
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Check that `path` resolves to somewhere strictly inside `root`.
///
/// The comparison is made on resolved absolute paths (symlinks followed
/// where the path exists), not on the raw string. Returns the normalized
/// absolute path, which is the form card paths take in memory.
pub fn validate_path(root: &Path, path: &Path) -> Result<PathBuf> {
    let normalized = normalize_path(path).map_err(|e| {
        log::warn!("[daedalus.storage] Path resolution failed for {:?}: {}", path, e);
        StorageError::InvalidPath(path.to_path_buf())
    })?;
    let root_normalized =
        normalize_path(root).map_err(|_| StorageError::InvalidPath(root.to_path_buf()))?;

    let resolved = resolve_existing_prefix(&normalized);
    let resolved_root = resolve_existing_prefix(&root_normalized);

    if resolved == resolved_root || !resolved.starts_with(&resolved_root) {
        log::warn!(
            "[daedalus.storage] Path traversal rejected: {:?} (root {:?})",
            resolved,
            resolved_root
        );
        return Err(StorageError::PathOutsideBoard(path.to_path_buf()));
    }
    Ok(normalized)
}

/// Trim and validate a list directory name.
pub fn validate_list_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::InvalidListName("list name cannot be empty".to_string()));
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(StorageError::InvalidListName(name.to_string()));
    }
    if !is_list_dir_name(name) {
        return Err(StorageError::InvalidListName(format!("{name} is reserved")));
    }
    Ok(name.to_string())
}
