use std::error;
use std::fmt;
use std::result;

/// Errors raised by the ordered map operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// An insertion was attempted without a key.
    MissingKey,
    /// An extremal key was requested from an empty map.
    EmptyCollection,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingKey => write!(f, "a key is required to insert into the map"),
            Error::EmptyCollection => write!(f, "the map contains no entries"),
        }
    }
}

/// Convenience `Result` type for map operations.
pub type Result<T> = result::Result<T, Error>;
