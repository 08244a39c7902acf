//! Error types for the Nexus executor core
//!
//! Errors fall into three groups that callers treat differently:
//! - **fatal** ([`Error::Internal`]): an invariant the planner must guarantee
//!   was broken (missing alias, wrong child arity). Never recovered.
//! - **unsupported** ([`Error::NotSupported`]): a feature path that is not
//!   implemented. Always raised before any side effect.
//! - **user/data** ([`Error::Input`], [`Error::TypeMismatch`]): query content
//!   that cannot be bound. Reported without an internal trace.

use thiserror::Error;

/// Result type alias using the executor Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the executor
#[derive(Error, Debug)]
pub enum Error {
    /// Storage transaction failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Feature path that is explicitly not implemented
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Query content that cannot be bound
    #[error("Input error: {0}")]
    Input(String),

    /// Type mismatch errors
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Output encoding errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Broken planner or executor invariant
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not-supported error
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for broken invariants that signal an upstream planning bug
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// True for errors that can be reported to the caller as-is
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::TypeMismatch { .. } | Self::NotSupported(_)
        )
    }
}

/// Return an [`Error::Internal`] from the enclosing function when the
/// condition does not hold.
#[macro_export]
macro_rules! exec_assert {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::internal(format!($($arg)+)));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guarded(flag: bool) -> Result<u32> {
        exec_assert!(flag, "flag was {}", flag);
        Ok(7)
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::internal("x").is_fatal());
        assert!(!Error::internal("x").is_user_error());
        assert!(Error::not_supported("x").is_user_error());
        assert!(Error::input("x").is_user_error());
        assert!(Error::type_mismatch("Int64", "String").is_user_error());
        assert!(!Error::storage("x").is_fatal());
    }

    #[test]
    fn test_exec_assert() {
        assert_eq!(guarded(true).unwrap(), 7);
        let err = guarded(false).unwrap_err();
        assert!(matches!(err, Error::Internal(ref m) if m == "flag was false"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::type_mismatch("Int64", "String");
        assert_eq!(err.to_string(), "Type mismatch: expected Int64, got String");
    }
}
