//! Error types for ingestion and serving.
//!
//! Almost every error here is recovered where it happens: it is logged and the
//! pipeline carries on with whatever it has. Only [`ServeError`] stops the
//! process.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Reading tags, duration or artwork from one audio file failed.
#[derive(Debug, Error)]
#[error("failed to read metadata from {}: {source}", .path.display())]
pub struct ExtractError {
    pub path: PathBuf,
    #[source]
    pub source: lofty::error::LoftyError,
}

/// Walking the library directory failed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to walk library directory {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to write artwork {}: {source}", .path.display())]
    Artwork {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writing a generated page failed.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to write playback page {}: {source}", .path.display())]
    Page {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write library index {}: {source}", .path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A request body could not be read as `multipart/form-data`.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("request has no content type")]
    MissingContentType,

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),
}

/// The HTTP server could not start or stopped with an error.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),
}
