//! Scan error types
//!
//! Budget exhaustion is not represented here: an overrun is a typed
//! interrupt (`Step::Overrun`), never an `Err`. Everything below is fatal
//! to the current scan attempt and propagates unchanged.

use thiserror::Error;

use crate::uid::HierarchyError;

use super::store::StoreError;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that abort a scan attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A document uid failed to parse as `<parent>[.<child>]*`
    #[error("malformed uid hierarchy: {0}")]
    MalformedHierarchy(#[from] HierarchyError),

    /// Downstream store failure, propagated unchanged
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// `next()` was called without a prior successful `has_next()`
    #[error("next() called without a staged candidate; call has_next() first")]
    NotReady,

    /// `document()` was called before `next()` produced a result
    #[error("document() is only valid immediately after next()")]
    NoDocument,

    /// The scan was used before `initialize()`
    #[error("scan used before initialize()")]
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_error_converts() {
        let err: ScanError = HierarchyError::Empty.into();
        assert_eq!(err, ScanError::MalformedHierarchy(HierarchyError::Empty));
    }

    #[test]
    fn test_storage_error_message_passes_through() {
        let err: ScanError = StoreError("tablet unavailable".to_string()).into();
        assert_eq!(format!("{}", err), "store failure: tablet unavailable");
    }
}
