pub mod application;
pub mod backend;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ui;
pub mod utils;

pub use application::{classify, DownloadCoordinator};
pub use backend::{Connection, HttpBackend, TransferBackend};
pub use config::AppConfig;
pub use domain::{
    AfterAcknowledge, AppError, NavigationDirective, OriginContext, RetrievalOutcome,
    RetrievalRequest, Screen, TransferError,
};
