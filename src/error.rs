//! Error types and checking helpers
//!
//! Two kinds of fault exist. An operation fault means a call into the
//! native terminal service reported failure; it carries no further detail.
//! An assertion fault means an internal invariant was violated by the
//! caller (malformed rectangle, bad color pair index, full pair table).

use thiserror::Error;

use crate::backend::Status;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("terminal operation failed")]
    Operation,

    #[error("failed assertion: {0}")]
    Assertion(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Translate a native status into a result.
#[inline]
pub fn check(status: Status) -> Result<()> {
    match status {
        Status::Ok => Ok(()),
        Status::Err => Err(Error::Operation),
    }
}

/// Fail with an assertion fault unless `cond` holds.
#[inline]
pub fn ensure(cond: bool, what: &'static str) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(Error::Assertion(what))
    }
}
