pub mod connection;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::TransferError;

pub use connection::Connection;
pub use http::HttpBackend;

/// A session able to fetch a remote file into a local destination.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Fetch `remote_name` from the server and store it as `local_name`.
    ///
    /// Resolves once the transfer has completed or failed.
    async fn retrieve(&self, local_name: &str, remote_name: &str) -> Result<(), TransferError>;
}

#[async_trait]
impl<T: TransferBackend + ?Sized> TransferBackend for Arc<T> {
    async fn retrieve(&self, local_name: &str, remote_name: &str) -> Result<(), TransferError> {
        (**self).retrieve(local_name, remote_name).await
    }
}
