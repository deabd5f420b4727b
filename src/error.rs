use std::fmt;

/// Failure of a keyed mutation. The tree is left untouched in every case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// `insert` found the key already present.
    DuplicateKey,
    /// `update` found no entry for the key.
    KeyNotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateKey => f.write_str("key already present"),
            Error::KeyNotFound => f.write_str("key not found"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
