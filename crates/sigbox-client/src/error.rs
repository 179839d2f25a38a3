//! Error taxonomy for SigBox operations.

use thiserror::Error;

/// Everything that can go wrong while talking to a SigBox server.
///
/// Callers that only care about "did the request reach the server and
/// get refused" vs "did the answer make no sense" can match on
/// [`Error::RemoteRequest`] and [`Error::ResponseFormat`] respectively;
/// the remaining variants cover local misuse and transport failures.
#[derive(Error, Debug)]
pub enum Error {
    /// The API key or server URL handed to the constructor is unusable.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The server answered with a non-success status code.
    #[error("{method} {url} returned HTTP status {status}")]
    RemoteRequest {
        method: String,
        url: String,
        status: u16,
    },

    /// The server answered 2xx but the body or headers were not in the
    /// promised shape (undecodable JSON, missing `Location`, ...).
    #[error("Malformed server response: {0}")]
    ResponseFormat(String),

    /// The request never completed: connect failure, TLS, timeout.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// A local file scheduled for upload could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
