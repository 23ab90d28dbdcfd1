//! Uid hierarchy error types
//!
//! A malformed uid is fatal to the scan that encountered it. There is no
//! internal retry; the error propagates unchanged to the host.

use thiserror::Error;

/// Result type for uid operations
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Failures parsing a document uid as `<parent>[.<child>]*`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Empty uid string
    #[error("empty uid")]
    Empty,

    /// A hierarchy segment between separators is empty
    #[error("uid {0:?} has an empty hierarchy segment")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", HierarchyError::Empty), "empty uid");

        let err = HierarchyError::EmptySegment("abc..def".to_string());
        assert!(format!("{}", err).contains("abc..def"));
    }
}
