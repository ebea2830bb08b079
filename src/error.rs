use std::fmt;

/// Errors returned by the fallible table operations.
///
/// All variants are local, recoverable conditions; none are fatal to the
/// process. Callers must check the error before using a returned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
  /// The requested key is not in the table, and (for `value`) no data
  /// loader is configured to produce it.
  KeyNotFound,
  /// The key was absent and the configured data loader declined to
  /// produce an item for it.
  KeyNotFoundOrNotLoadable,
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::KeyNotFound => write!(f, "key not found in cache"),
      CacheError::KeyNotFoundOrNotLoadable => {
        write!(f, "key not found and could not be loaded into cache")
      }
    }
  }
}

impl std::error::Error for CacheError {}
