use std::{collections::TryReserveError, io};

use thiserror::Error;

/// A problem that stops the whole audit.
///
/// Everything else that's wrong with a file is a non-fatal finding: it gets a
/// line in the report, bumps the error count, and then the audit keeps going.
/// These variants are the cases where there's simply no way to go on.
#[derive(Debug, Error)]
pub enum FatalError {
  /// The first 8 bytes aren't the PNG signature.
  #[error("wrong signature")]
  BadSignature,

  /// The stream ended in the middle of something.
  #[error("unexpected end of file")]
  UnexpectedEndOfInput,

  /// The underlying reader reported an error (other than hitting the end).
  #[error("file read error")]
  ReadFailure(#[source] io::Error),

  /// A chunk declared a length with the high bit set.
  #[error("negative length chunk")]
  NegativeLength,

  /// The allocator couldn't give us enough space.
  #[error("memory error")]
  OutOfMemory,

  /// Seeking the input or writing the report failed.
  #[error("input/output error")]
  GenericIoFailure(#[from] io::Error),
}
impl From<TryReserveError> for FatalError {
  #[inline]
  fn from(_: TryReserveError) -> Self {
    Self::OutOfMemory
  }
}
impl FatalError {
  /// Converts an error from a `read` call on the input.
  #[inline]
  #[must_use]
  pub(crate) fn from_read(e: io::Error) -> Self {
    match e.kind() {
      io::ErrorKind::UnexpectedEof => Self::UnexpectedEndOfInput,
      io::ErrorKind::OutOfMemory => Self::OutOfMemory,
      _ => Self::ReadFailure(e),
    }
  }
}

/// Shorthand for results that can fail fatally.
pub type AuditResult<T> = Result<T, FatalError>;

#[test]
fn test_read_errors_are_classified() {
  let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
  assert!(matches!(FatalError::from_read(eof), FatalError::UnexpectedEndOfInput));
  let other = io::Error::new(io::ErrorKind::Other, "disk on fire");
  assert!(matches!(FatalError::from_read(other), FatalError::ReadFailure(_)));
  let write = io::Error::from(io::ErrorKind::BrokenPipe);
  assert!(matches!(FatalError::from(write), FatalError::GenericIoFailure(_)));
}
