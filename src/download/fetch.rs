//! Raw byte downloads and gitiles URL construction

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;

use crate::error::{BuildError, Result};

/// Transport used for every remote read
///
/// `timeout` bounds the whole request; `None` waits indefinitely.
pub trait Fetch {
    fn fetch(&self, url: &str, timeout: Option<Duration>)
    -> impl Future<Output = Result<Vec<u8>>>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| BuildError::Network {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let network = |source| BuildError::Network {
            url: url.to_string(),
            source,
        };

        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(network)?;

        if !response.status().is_success() {
            return Err(BuildError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(network)?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

/// Source tree snapshot addressed by tag on a gitiles host
#[derive(Debug, Clone)]
pub struct RemoteSource<F> {
    fetcher: F,
    host: String,
}

impl<F: Fetch> RemoteSource<F> {
    pub fn new(fetcher: F, host: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self { fetcher, host }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// `<host>/+archive/refs/tags/<tag>/<path>.tar.gz`
    pub fn archive_url(&self, tag: &str, repo_path: &str) -> String {
        format!("{}/+archive/refs/tags/{}/{}.tar.gz", self.host, tag, repo_path)
    }

    /// `<host>/+/refs/tags/<tag>/<path>?format=TEXT`
    pub fn tagged_file_url(&self, tag: &str, repo_path: &str) -> String {
        format!("{}/+/refs/tags/{}/{}?format=TEXT", self.host, tag, repo_path)
    }

    /// Plain GET without a timeout
    pub async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.fetcher.fetch(url, None).await
    }

    /// Download one file at `tag`; gitiles serves it base64-encoded
    pub async fn download_tagged_file(&self, tag: &str, repo_path: &str) -> Result<Vec<u8>> {
        let url = self.tagged_file_url(tag, repo_path);
        let body = self.download_bytes(&url).await?;
        decode_text_payload(&body).map_err(|source| BuildError::Decode { url, source })
    }
}

/// Decode a `?format=TEXT` body, ignoring any line wrapping
fn decode_text_payload(body: &[u8]) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}
