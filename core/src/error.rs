//! Error kinds and their dispositions, per spec §7.
//!
//! Errors are reported at their producer and recorded in counters; they
//! never unwind across threads. `List` and `Get` errors are logged and the
//! affected job (or the whole producer side) is abandoned, not retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum S3pdError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("list error: {0}")]
    List(String),

    #[error("failed to download object '{key}': {source}")]
    Get {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to open sink for object '{key}': {source}")]
    Sink {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize object-client subsystem: {0}")]
    ClientInit(String),
}

impl S3pdError {
    pub fn get(key: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Get {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn sink(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Sink {
            key: key.into(),
            source,
        }
    }
}
