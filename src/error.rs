use std::io;
use std::path::PathBuf;

use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Empty search keyword")]
    EmptyQuery,

    #[error("Couldn't build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Couldn't write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Errors raised while extracting mandatory fields from a page.
///
/// Optional fields never produce one of these, they are left empty instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing {field} in {context}")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ParseError {
    pub(crate) fn missing(field: &'static str, context: &'static str) -> Self {
        Self::MissingField { field, context }
    }
}
