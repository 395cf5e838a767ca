use crate::domain::{AppError, NameField, TransferError};

/// Turn any failure into the message shown to the user.
///
/// Total and deterministic: every variant maps to a non-empty message that
/// only depends on the variant and its detail.
pub fn classify(error: &AppError) -> String {
    match error {
        AppError::EmptyName(NameField::Local) => "Please enter a local file name.".to_string(),
        AppError::EmptyName(NameField::Remote) => "Please enter a remote file name.".to_string(),
        AppError::Transfer(e) => classify_transfer(e),
    }
}

fn classify_transfer(error: &TransferError) -> String {
    match error {
        TransferError::NoActiveConnection => {
            "Not connected to a server. Please log in first.".to_string()
        }
        TransferError::NotFound(name) => with_detail("File not found on server", name),
        TransferError::PermissionDenied(detail) => with_detail("Permission denied", detail),
        TransferError::Network(detail) => with_detail("Network error", detail),
        TransferError::Io(detail) => with_detail("Could not save file", detail),
        TransferError::TimedOut(after) => {
            // whole seconds, rounded up
            let secs = after.as_secs() + u64::from(after.subsec_nanos() > 0);
            if secs == 1 {
                "Download timed out after 1 second.".to_string()
            } else {
                format!("Download timed out after {} seconds.", secs)
            }
        }
        TransferError::Other(detail) => with_detail("Unknown error", detail),
    }
}

fn with_detail(prefix: &str, detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        format!("{}.", prefix)
    } else {
        format!("{}: {}", prefix, detail)
    }
}
