//! Error conversion implementations.
//!
//! Decompression failures travel through `std::io::Read` as `io::Error`
//! values wrapping either a `flate2::DecompressError` or this crate's own
//! [`Error`]; these helpers recover the underlying classification when such an
//! error reaches the record layer.

use super::types::Error;
use crate::common::binary::BinaryError;
use std::io;

impl From<flate2::DecompressError> for Error {
    fn from(err: flate2::DecompressError) -> Self {
        Error::Decompression(err.to_string())
    }
}

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        Error::Format(err.to_string())
    }
}

impl Error {
    /// Convert an `io::Error` produced while reading a section stream.
    ///
    /// Errors that originated in the inflater are reported as
    /// [`Error::Decompression`]; everything else stays an IO error.
    pub(crate) fn from_stream_io(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return match err.into_inner().map(|inner| inner.downcast::<Error>()) {
                Some(Ok(inner)) => *inner,
                Some(Err(other)) => Error::Io(io::Error::other(other)),
                None => Error::Io(io::Error::from(io::ErrorKind::InvalidData)),
            };
        }
        let is_inflate_error = err
            .get_ref()
            .is_some_and(|inner| inner.is::<flate2::DecompressError>());
        if is_inflate_error {
            Error::Decompression(err.to_string())
        } else {
            Error::Io(err)
        }
    }
}
