//! Local-or-remote resource store.
//!
//! Identifiers on the configured server host are read from the data root
//! (`https://host/a/b.acl` maps to `<root>/a/b.acl`; in multi-user mode the
//! host name is an extra directory level). Everything else is fetched over
//! HTTP. Local files are read as Turtle, or N-Triples for `.nt` files;
//! remote documents are parsed according to their `Content-Type`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use wac_core::graph::{self, ntriples, turtle, RDF_MEDIA_TYPES};
use wac_core::{ConfigProvider, Document, Error, ResourceStore, ResourceUri, Result};

/// Store reading local resources from disk and remote ones over HTTP.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    server_host: Option<String>,
    multiuser: bool,
    client: reqwest::Client,
}

impl FsStore {
    /// Create a store serving `server_uri`'s host from `root`.
    pub fn new(root: impl Into<PathBuf>, server_uri: &str, multiuser: bool) -> Self {
        let server_host = ResourceUri::parse(server_uri)
            .ok()
            .and_then(|uri| uri.host());
        Self {
            root: root.into(),
            server_host,
            multiuser,
            client: reqwest::Client::new(),
        }
    }

    /// Create a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the data root cannot be determined.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self::new(
            config.data_root()?,
            config.server_uri(),
            config.multiuser(),
        ))
    }

    /// Filesystem path of `uri`, or `None` when it lives on another host.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUri`] when the path tries to leave the data root.
    pub fn local_path(&self, uri: &ResourceUri) -> Result<Option<PathBuf>> {
        let (Some(host), Some(server)) = (uri.host(), self.server_host.as_deref()) else {
            return Ok(None);
        };

        let mut path = self.root.clone();
        if self.multiuser {
            let on_server = host == server || host.ends_with(&format!(".{server}"));
            if !on_server {
                return Ok(None);
            }
            path.push(&host);
        } else if host != server {
            return Ok(None);
        }

        let relative = Path::new(uri.path());
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::invalid_uri(format!(
                "{uri}: path escapes the data root"
            )));
        }
        path.push(relative);
        Ok(Some(path))
    }

    async fn read_local(&self, uri: &str, path: &Path) -> Result<Document> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(e, path))?;
        parse_document(uri, &source, local_media_type(path))
    }

    async fn read_remote(&self, uri: &str, preferred: Option<&str>) -> Result<Document> {
        log::debug!("Fetching {uri} over HTTP");
        let response = self
            .client
            .get(uri)
            .header(ACCEPT, accept_header(preferred))
            .send()
            .await
            .map_err(|e| Error::fetch(uri, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(uri));
        }
        if !status.is_success() {
            return Err(Error::fetch(uri, format!("HTTP {status}")));
        }
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or_else(|| turtle::CONTENT_TYPE.to_string(), graph::media_type);
        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(uri, e.to_string()))?;
        parse_document(uri, &body, &media_type)
    }
}

fn local_media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("nt") => ntriples::CONTENT_TYPE,
        _ => turtle::CONTENT_TYPE,
    }
}

/// `Accept` value listing `preferred` first, then every readable type.
fn accept_header(preferred: Option<&str>) -> String {
    let mut types: Vec<String> = preferred.map(str::to_string).into_iter().collect();
    for media_type in RDF_MEDIA_TYPES {
        if preferred != Some(media_type) {
            types.push(format!("{media_type};q=0.8"));
        }
    }
    types.join(", ")
}

fn parse_document(uri: &str, source: &str, media_type: &str) -> Result<Document> {
    match graph::parse_as(media_type, source, Some(uri)) {
        Some(parsed) => {
            let graph = parsed.map_err(|e| Error::parse(format!("{uri}: {e}")))?;
            Ok(Document::new(uri, graph).with_content_type(media_type))
        }
        None => Err(Error::fetch(
            uri,
            format!("unsupported media type {media_type}"),
        )),
    }
}

#[async_trait]
impl ResourceStore for FsStore {
    async fn fetch_document(&self, uri: &str) -> Result<Document> {
        let resource = ResourceUri::parse(uri)?;
        match self.local_path(&resource)? {
            Some(path) => self.read_local(uri, &path).await,
            None => self.read_remote(uri, None).await,
        }
    }

    /// Profiles and groups on the server host may also be published
    /// elsewhere, so a local miss falls through to HTTP.
    async fn fetch_graph(&self, uri: &str, content_type: Option<&str>) -> Result<Document> {
        let resource = ResourceUri::parse(uri)?;
        if let Some(path) = self.local_path(&resource)? {
            match self.read_local(uri, &path).await {
                Err(e) if e.is_not_found() => {
                    log::debug!("{uri} not found locally, trying HTTP");
                }
                other => return other,
            }
        }
        self.read_remote(uri, content_type).await
    }

    async fn exists(&self, uri: &ResourceUri) -> Result<bool> {
        match self.local_path(uri)? {
            Some(path) => Ok(tokio::fs::metadata(&path).await.is_ok()),
            None => {
                let response = self
                    .client
                    .head(uri.as_str())
                    .send()
                    .await
                    .map_err(|e| Error::fetch(uri.as_str(), e.to_string()))?;
                Ok(response.status().is_success())
            }
        }
    }

    async fn is_container(&self, uri: &ResourceUri) -> Result<bool> {
        match self.local_path(uri)? {
            Some(path) => Ok(tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false)),
            None => Ok(uri.is_container() && self.exists(uri).await?),
        }
    }
}
