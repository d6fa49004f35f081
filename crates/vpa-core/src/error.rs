//! Library error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An update mode that is not one of Off, Initial or Auto.
    #[error("unknown mode: '{0}', allowed values: Off, Initial & Auto")]
    UnknownMode(String),
}
