use std::path::{Path, PathBuf};

use crate::domain::TransferError;

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve a user supplied local name to a file inside `download_dir`.
///
/// The name is flattened into a single path component, so a local name can
/// never escape the download directory.
pub fn resolve_local_path(download_dir: &Path, local_name: &str) -> Result<PathBuf, TransferError> {
    let file_name = sanitize_filename(local_name);
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(TransferError::Io(format!(
            "invalid local file name: {:?}",
            local_name
        )));
    }
    Ok(download_dir.join(file_name))
}
