use trackable::error::TrackableError;
use trackable::error::{ErrorKind as TrackableErrorKind, ErrorKindExt};

/// The error type for this crate.
pub type Error = TrackableError<ErrorKind>;

/// A list of error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input (e.g., an empty file path or an unknown encoder name).
    Invalid,

    /// Unknown error (e.g., a log directory could not be created).
    Other,
}
impl TrackableErrorKind for ErrorKind {}

/// Converts an I/O failure into an `ErrorKind::Other` error.
pub(crate) fn other<E>(e: E) -> Error
where
    E: Into<trackable::error::BoxError>,
{
    ErrorKind::Other.cause(e)
}
