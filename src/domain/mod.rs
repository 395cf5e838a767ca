pub mod error;
pub mod model;

pub use error::{AppError, NameField, TransferError};
pub use model::{
    AfterAcknowledge, DownloadPhase, NavigationDirective, OriginContext, RetrievalOutcome,
    RetrievalRequest, Screen,
};
