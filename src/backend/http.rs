use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use super::TransferBackend;
use crate::{config::ServerConfig, domain::TransferError, utils::resolve_local_path};

#[derive(Debug, Clone)]
pub enum TransferEvent {
    /// Fraction of the body written so far, `0.0` when the size is unknown.
    Progress(f32),
    Completed(PathBuf),
    Failed(TransferError),
}

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: Option<String>,
}

/// Retrieves files from an HTTP(S) server into a local download directory.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    download_dir: PathBuf,
}

impl HttpBackend {
    /// Open a session against `server` and check that it answers.
    pub async fn connect(
        server: &ServerConfig,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self, TransferError> {
        let raw_url = server
            .url
            .as_deref()
            .ok_or(TransferError::NoActiveConnection)?;
        let base_url = parse_base_url(raw_url)?;

        let client = Client::builder().user_agent(&server.user_agent).build()?;

        let backend = Self {
            client,
            base_url,
            credentials: server.username.clone().map(|username| Credentials {
                username,
                password: server.password.clone(),
            }),
            download_dir: download_dir.into(),
        };

        backend.check_reachable().await?;
        info!(
            "connected to {} (downloads go to {})",
            backend.base_url,
            backend.download_dir.display()
        );
        Ok(backend)
    }

    async fn check_reachable(&self) -> Result<(), TransferError> {
        let response = self
            .request(Method::HEAD, self.base_url.clone())
            .send()
            .await?;

        let status = response.status();
        debug!("HEAD {} -> {}", self.base_url, status);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                TransferError::PermissionDenied(format!("login rejected by server ({})", status)),
            ),
            s if s.is_server_error() => Err(TransferError::Network(format!(
                "server unavailable ({})",
                s
            ))),
            _ => Ok(()),
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, c.password.as_deref()),
            None => request,
        }
    }

    /// Resolve a remote name below the server base URL.
    fn remote_url(&self, remote_name: &str) -> Result<Url, TransferError> {
        let url = self
            .base_url
            .join(remote_name.trim_start_matches('/'))
            .map_err(|e| {
                TransferError::Other(format!("invalid remote name {:?}: {}", remote_name, e))
            })?;

        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(TransferError::PermissionDenied(format!(
                "{} is outside the server root",
                remote_name
            )));
        }
        Ok(url)
    }

    /// Stream `url` into `path`, reporting progress as it goes.
    ///
    /// The body is written to a hidden `.part` sibling that only replaces
    /// `path` once it has been synced. Dropping the stream early, or any
    /// failure, removes the `.part` file and leaves `path` untouched.
    pub fn download_stream(
        &self,
        url: Url,
        remote_name: String,
        path: PathBuf,
    ) -> BoxStream<'static, TransferEvent> {
        futures::stream::unfold(
            TransferState::Start {
                request: self.request(Method::GET, url),
                remote_name,
                path,
            },
            |state| async move {
                match state {
                    TransferState::Start {
                        request,
                        remote_name,
                        path,
                    } => {
                        let response = match request.send().await {
                            Ok(response) => response,
                            Err(e) => {
                                return Some((
                                    TransferEvent::Failed(e.into()),
                                    TransferState::Finished,
                                ));
                            }
                        };

                        if let Err(e) = check_status(response.status(), &remote_name) {
                            return Some((TransferEvent::Failed(e), TransferState::Finished));
                        }

                        let (file, part) = match create_part_file(&path).await {
                            Ok(created) => created,
                            Err(e) => {
                                return Some((TransferEvent::Failed(e), TransferState::Finished));
                            }
                        };

                        let total = response.content_length();
                        Some((
                            TransferEvent::Progress(0.0),
                            TransferState::Downloading {
                                file,
                                part,
                                stream: response.bytes_stream().boxed(),
                                downloaded: 0,
                                total,
                                path,
                            },
                        ))
                    }
                    TransferState::Downloading {
                        mut file,
                        part,
                        mut stream,
                        mut downloaded,
                        total,
                        path,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                return Some((
                                    TransferEvent::Failed(TransferError::Io(format!(
                                        "Write error: {}",
                                        e
                                    ))),
                                    TransferState::Finished,
                                ));
                            }

                            downloaded += chunk.len() as u64;

                            let progress = match total {
                                Some(total_size) if total_size > 0 => {
                                    downloaded as f32 / total_size as f32
                                }
                                _ => 0.0,
                            };

                            Some((
                                TransferEvent::Progress(progress),
                                TransferState::Downloading {
                                    file,
                                    part,
                                    stream,
                                    downloaded,
                                    total,
                                    path,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            debug!("body of {} failed after {} bytes", path.display(), downloaded);
                            Some((TransferEvent::Failed(e.into()), TransferState::Finished))
                        }
                        None => {
                            if let Err(e) = file.sync_all().await {
                                return Some((
                                    TransferEvent::Failed(TransferError::Io(format!(
                                        "Failed to sync file: {}",
                                        e
                                    ))),
                                    TransferState::Finished,
                                ));
                            }
                            drop(file);

                            if let Err(e) = part.persist(&path) {
                                return Some((
                                    TransferEvent::Failed(TransferError::Io(format!(
                                        "Failed to move file into place: {}",
                                        e.error
                                    ))),
                                    TransferState::Finished,
                                ));
                            }

                            debug!("wrote {} bytes to {}", downloaded, path.display());
                            Some((TransferEvent::Completed(path), TransferState::Finished))
                        }
                    },
                    TransferState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

#[async_trait]
impl TransferBackend for HttpBackend {
    async fn retrieve(&self, local_name: &str, remote_name: &str) -> Result<(), TransferError> {
        let url = self.remote_url(remote_name)?;
        let path = resolve_local_path(&self.download_dir, local_name)?;
        tokio::fs::create_dir_all(&self.download_dir).await?;

        info!("retrieving {} -> {}", url, path.display());

        let mut events = self.download_stream(url, remote_name.to_string(), path);
        let mut next_report = 0.25_f32;
        while let Some(event) = events.next().await {
            match event {
                TransferEvent::Progress(progress) => {
                    if progress >= next_report {
                        debug!("{}: {:.0}%", remote_name, progress * 100.0);
                        next_report = progress + 0.25;
                    }
                }
                TransferEvent::Completed(path) => {
                    info!("saved {}", path.display());
                    return Ok(());
                }
                TransferEvent::Failed(e) => {
                    warn!("retrieving {} failed: {}", remote_name, e);
                    return Err(e);
                }
            }
        }

        Err(TransferError::Other(
            "transfer ended without a result".to_string(),
        ))
    }
}

enum TransferState {
    Start {
        request: RequestBuilder,
        remote_name: String,
        path: PathBuf,
    },
    Downloading {
        file: tokio::fs::File,
        /// Deletes the `.part` file when dropped without being persisted.
        part: TempPath,
        stream: BoxStream<'static, reqwest::Result<bytes::Bytes>>,
        downloaded: u64,
        total: Option<u64>,
        path: PathBuf,
    },
    Finished,
}

/// Create the hidden `.part` file next to `path`.
async fn create_part_file(path: &Path) -> Result<(tokio::fs::File, TempPath), TransferError> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let created = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(dir)
    })
    .await
    .map_err(|e| TransferError::Other(format!("Failed to create file: {}", e)))?;

    let (file, part) = created
        .map_err(|e| TransferError::Io(format!("Failed to create file: {}", e)))?
        .into_parts();
    Ok((tokio::fs::File::from_std(file), part))
}

fn parse_base_url(raw: &str) -> Result<Url, TransferError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| TransferError::Other(format!("invalid server url {:?}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransferError::Other(format!(
            "unsupported scheme {:?} in server url",
            url.scheme()
        )));
    }

    // join() treats the last segment as a file unless the path ends in '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn check_status(status: StatusCode, remote_name: &str) -> Result<(), TransferError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            Err(TransferError::NotFound(remote_name.to_string()))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransferError::PermissionDenied(
            format!("{} ({})", remote_name, status),
        )),
        _ => Err(TransferError::Network(format!(
            "server answered {} for {}",
            status, remote_name
        ))),
    }
}
