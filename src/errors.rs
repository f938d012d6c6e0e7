use std::error::Error as StdError;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

#[derive(Error, Debug)]
pub enum StreamError {
    /// Raised while constructing a stream from something that is not an
    /// open handle, or while parsing factory input.
    #[error("Invalid argument: {0}")]
    Argument(String),
    #[error("{message}")]
    Runtime {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl StreamError {
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            source: None,
        }
    }

    /// Runtime error carrying the I/O fault that caused it.
    /// The message reads `"<context>: <io error>"`.
    pub fn io(context: impl AsRef<str>, err: io::Error) -> Self {
        Self::Runtime {
            message: format!("{}: {}", context.as_ref(), err),
            source: Some(Box::new(err)),
        }
    }

    /// Wrap a runtime error with extra context, keeping it as the source.
    pub fn wrap(context: impl AsRef<str>, inner: StreamError) -> Self {
        Self::Runtime {
            message: format!("{}: {}", context.as_ref(), inner),
            source: Some(Box::new(inner)),
        }
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime { .. })
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        let kind = match err {
            StreamError::Argument(_) => io::ErrorKind::InvalidInput,
            StreamError::Runtime { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Argument(err.to_string())
    }
}

impl From<url::ParseError> for StreamError {
    fn from(err: url::ParseError) -> Self {
        Self::Argument(err.to_string())
    }
}
