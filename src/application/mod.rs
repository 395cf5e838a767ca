pub mod download_coordinator;
pub mod error_classifier;

pub use download_coordinator::{directive_for, DownloadCoordinator};
pub use error_classifier::classify;
