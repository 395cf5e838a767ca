use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::TransferBackend;
use crate::domain::TransferError;

/// Handle to the single active backend session.
///
/// Clones share the same slot. Retrieving through a closed connection fails
/// with [`TransferError::NoActiveConnection`].
#[derive(Clone, Default)]
pub struct Connection {
    active: Arc<RwLock<Option<Arc<dyn TransferBackend>>>>,
}

impl Connection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `backend` as the active session, replacing any previous one.
    pub async fn open<B>(&self, backend: B)
    where
        B: TransferBackend + 'static,
    {
        let previous = self.active.write().await.replace(Arc::new(backend));
        if previous.is_some() {
            info!("replaced active connection");
        } else {
            info!("connection opened");
        }
    }

    pub async fn close(&self) {
        if self.active.write().await.take().is_some() {
            info!("connection closed");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.active.read().await.is_some()
    }
}

#[async_trait]
impl TransferBackend for Connection {
    async fn retrieve(&self, local_name: &str, remote_name: &str) -> Result<(), TransferError> {
        // Release the lock before the transfer runs so close() is not blocked.
        let backend = self.active.read().await.clone();
        match backend {
            Some(backend) => backend.retrieve(local_name, remote_name).await,
            None => {
                debug!("retrieve of {} requested without an active connection", remote_name);
                Err(TransferError::NoActiveConnection)
            }
        }
    }
}
