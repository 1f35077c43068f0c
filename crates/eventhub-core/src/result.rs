//! Uniform success/failure wrapper returned by every fallible operation.
//!
//! A plain result is `OperationResult<()>`; a payload result carries a `T`.
//! The wrapper is backed by `Result<T, DomainError>`, so a successful value
//! never carries an error and a failure never carries a payload.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::DomainError;

/// Success flag, optional error message and optional payload.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct OperationResult<T = ()> {
    outcome: Result<T, DomainError>,
}

impl OperationResult<()> {
    /// A plain success without payload.
    pub fn success() -> Self {
        Self { outcome: Ok(()) }
    }
}

impl<T> OperationResult<T> {
    /// A success carrying `value`.
    pub fn ok(value: T) -> Self {
        Self { outcome: Ok(value) }
    }

    /// A failure carrying `error`.
    pub fn failure(error: DomainError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The error message, present only on failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(DomainError::message)
    }

    /// The typed failure, present only on failure.
    #[must_use]
    pub fn domain_error(&self) -> Option<&DomainError> {
        self.outcome.as_ref().err()
    }

    /// The payload, present only on success.
    #[must_use]
    pub fn result(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// Unwraps into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried `DomainError` when the operation failed.
    pub fn into_inner(self) -> Result<T, DomainError> {
        self.outcome
    }

    /// Transforms the payload, keeping a failure untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            outcome: self.outcome.map(f),
        }
    }

    /// Drops the payload, keeping only success or the failure.
    pub fn discard(self) -> OperationResult {
        self.map(|_| ())
    }
}

impl<T> From<Result<T, DomainError>> for OperationResult<T> {
    fn from(outcome: Result<T, DomainError>) -> Self {
        Self { outcome }
    }
}

impl<T: Serialize> Serialize for OperationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OperationResult", 3)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("error", &self.error())?;
        state.serialize_field("result", &self.result())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_error() {
        let result = OperationResult::success();
        assert!(result.is_success());
        assert!(result.error().is_none());
    }

    #[test]
    fn test_failure_has_no_payload() {
        let result: OperationResult<u32> =
            OperationResult::failure(DomainError::NotFound("Not Found".into()));
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("Not Found"));
        assert!(result.result().is_none());
    }

    #[test]
    fn test_discard_preserves_error_verbatim() {
        let result: OperationResult<u32> =
            OperationResult::failure(DomainError::Persistence("connection refused".into()));
        let plain = result.discard();
        assert_eq!(plain.error(), Some("connection refused"));
    }

    #[test]
    fn test_serializes_success_flag_error_and_payload() {
        let ok = serde_json::to_value(OperationResult::ok(vec![1, 2])).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({ "success": true, "error": null, "result": [1, 2] })
        );

        let failed: OperationResult<Vec<u32>> =
            OperationResult::failure(DomainError::Conflict("Exists".into()));
        let failed = serde_json::to_value(failed).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({ "success": false, "error": "Exists", "result": null })
        );
    }
}
