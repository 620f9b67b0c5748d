//! Typed errors for the tablespace substrate.
//!
//! Каждая операция возвращает ровно одну типизированную ошибку; ретраев на
//! этом уровне нет. `ErrorKind` позволяет тестам сверять класс ошибки без
//! привязки к тексту сообщения.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("corrupt metadata: {0}")]
    CorruptMetadata(String),

    #[error("truncated: {0}")]
    Truncated(String),

    #[error("i/o error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    CapacityExceeded,
    CorruptMetadata,
    Truncated,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            Error::CorruptMetadata(_) => ErrorKind::CorruptMetadata,
            Error::Truncated(_) => ErrorKind::Truncated,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// `.ctx(...)` for io results, in the spirit of anyhow's `with_context`.
pub(crate) trait IoResultExt<T> {
    fn ctx<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn ctx<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::io(f(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_context_is_kept_in_message() {
        let r: io::Result<()> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let e = r.ctx(|| "write page 3 of ibdata1").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Io);
        let msg = e.to_string();
        assert!(msg.contains("ibdata1"), "{msg}");
        assert!(msg.contains("boom"), "{msg}");
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(
            Error::CapacityExceeded("x".into()).kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(Error::Truncated("x".into()).kind(), ErrorKind::Truncated);
    }
}
