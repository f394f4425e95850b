use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::MetaError;

/// Fetches a JSON document at a URL. The pipeline never talks HTTP directly;
/// tests substitute a canned implementation.
pub trait DccClient: Send + Sync {
    fn fetch_json(&self, url: &str) -> Result<Value, MetaError>;
}

#[derive(Clone)]
pub struct DccHttpClient {
    client: Client,
}

impl DccHttpClient {
    pub fn new(credentials: Option<&str>) -> Result<Self, MetaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("encode-meta/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MetaError::DccHttp(err.to_string()))?,
        );
        if let Some(token) = credentials {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Basic {token}"))
                    .map_err(|_| MetaError::MalformedCredentials)?,
            );
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| MetaError::DccHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl DccClient for DccHttpClient {
    fn fetch_json(&self, url: &str) -> Result<Value, MetaError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| MetaError::DccHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "DCC request failed".to_string());
            return Err(MetaError::DccStatus { status, message });
        }
        response
            .json()
            .map_err(|err| MetaError::DccHttp(err.to_string()))
    }
}

/// Reads the single-token Basic auth payload from a credentials file.
pub fn load_credentials(path: &Path) -> Result<String, MetaError> {
    let content =
        fs::read_to_string(path).map_err(|_| MetaError::CredentialsRead(path.to_path_buf()))?;
    let token = content.trim();
    if token.is_empty() || token.split_whitespace().count() != 1 {
        return Err(MetaError::MalformedCredentials);
    }
    Ok(token.to_string())
}

/// Derives `protocol://host` from the query URL; detail-page paths returned
/// by the API are relative and get glued onto this.
pub fn site_base(query_url: &str) -> Result<String, MetaError> {
    let url = Url::parse(query_url).map_err(|err| MetaError::InvalidQueryUrl(err.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| MetaError::InvalidQueryUrl(format!("no host in {query_url}")))?;
    match url.port() {
        Some(port) => Ok(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Ok(format!("{}://{}", url.scheme(), host)),
    }
}
