use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MetaError {
    #[error("failed to read allow-list at {0}")]
    AllowListRead(PathBuf),

    #[error("allow-list line {line} holds more than one token: {content:?}")]
    MalformedAllowList { line: usize, content: String },

    #[error("failed to read credentials file at {0}")]
    CredentialsRead(PathBuf),

    #[error("credentials file must contain exactly one token")]
    MalformedCredentials,

    #[error("invalid query url: {0}")]
    InvalidQueryUrl(String),

    #[error("search response notification is not \"Success\": {0}")]
    UpstreamProtocol(String),

    #[error("required field missing: {path}")]
    FieldMissing { path: String },

    #[error("DCC request failed: {0}")]
    DccHttp(String),

    #[error("DCC returned status {status}: {message}")]
    DccStatus { status: u16, message: String },

    #[error("failed to write output: {0}")]
    OutputIo(String),
}
