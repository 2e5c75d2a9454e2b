//! Error types for spatialrt-client.
//!
//! Native error codes are never reinterpreted or hidden: every variant that
//! originates in the runtime carries the full [`ResultStatus`], so advanced
//! callers can branch on vendor detail even when the framework taxonomy is
//! coarse. Recoverable conditions ([`Error::FuturePending`] and the
//! loss-pending form of [`Error::OwnerLost`]) are distinguishable purely by
//! inspecting the error, never by retry-until-timeout guessing.

use thiserror::Error;

use crate::status::{NativeResult, ResultStatus, StatusCode};

/// Main error type for all spatialrt operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller-supplied arguments failed local validation. Raised before any
    /// native call is attempted, so no partial native state exists.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// No ambient runtime scope is available to direct the call at.
    #[error("no current {scope} is available; the provider is uninitialized")]
    ProviderUninitialized { scope: &'static str },

    /// The runtime does not implement this operation or extension.
    #[error("operation unsupported by the runtime: {0}")]
    Unsupported(ResultStatus),

    /// A future, session, or other handle no longer refers to a live object.
    #[error("handle is invalid: {0}")]
    HandleInvalid(ResultStatus),

    /// The future is not ready yet. Retryable: poll longer, then complete.
    /// Distinct from [`Error::HandleInvalid`] because the handle stays live.
    #[error("future is still pending: {0}")]
    FuturePending(ResultStatus),

    /// Native-side memory or slot limits were reached.
    #[error("native resources exhausted: {0}")]
    ResourceExhausted(ResultStatus),

    /// The instance or session that scoped the operation has been lost or is
    /// being lost. `recoverable` is `true` for a pending loss, where the
    /// caller may still attempt to finish in-flight work.
    #[error("owning scope lost (recoverable: {recoverable}): {status}")]
    OwnerLost {
        status: ResultStatus,
        recoverable: bool,
    },

    /// The operation requires a permission that has not been granted.
    #[error("permission insufficient: {0}")]
    PermissionInsufficient(ResultStatus),

    /// An opaque native error that could not be classified further. The raw
    /// native code is preserved in the carried status for diagnostics.
    #[error("platform error: {0}")]
    Platform(ResultStatus),
}

impl Error {
    /// Classify a failed native code into the error taxonomy.
    ///
    /// The mapping is total: any code without a more specific kind lands in
    /// [`Error::Platform`] with the raw code preserved.
    pub fn from_native(code: NativeResult) -> Self {
        debug_assert!(code.is_error());
        let status = ResultStatus::from_native(code);
        match code {
            NativeResult::FUNCTION_UNSUPPORTED
            | NativeResult::FEATURE_UNSUPPORTED
            | NativeResult::EXTENSION_NOT_PRESENT => Self::Unsupported(status),
            NativeResult::HANDLE_INVALID | NativeResult::FUTURE_INVALID => {
                Self::HandleInvalid(status)
            }
            NativeResult::FUTURE_PENDING => Self::FuturePending(status),
            NativeResult::OUT_OF_MEMORY | NativeResult::LIMIT_REACHED => {
                Self::ResourceExhausted(status)
            }
            NativeResult::INSTANCE_LOST | NativeResult::SESSION_LOST => Self::OwnerLost {
                status,
                recoverable: false,
            },
            NativeResult::PERMISSION_INSUFFICIENT => Self::PermissionInsufficient(status),
            _ => Self::Platform(status),
        }
    }

    /// The two-tier status this error corresponds to.
    ///
    /// Local kinds that never reached native code synthesize a status with
    /// the matching framework tier and a neutral native code.
    pub fn status(&self) -> ResultStatus {
        match self {
            Self::InvalidArgument { .. } => {
                ResultStatus::with_native(StatusCode::ValidationFailure, NativeResult::SUCCESS)
            }
            Self::ProviderUninitialized { .. } => {
                ResultStatus::with_native(StatusCode::ProviderUninitialized, NativeResult::SUCCESS)
            }
            Self::Unsupported(status)
            | Self::HandleInvalid(status)
            | Self::FuturePending(status)
            | Self::ResourceExhausted(status)
            | Self::PermissionInsufficient(status)
            | Self::Platform(status)
            | Self::OwnerLost { status, .. } => *status,
        }
    }

    /// Whether the caller may reasonably retry or finish in-flight work.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FuturePending(_)
                | Self::OwnerLost {
                    recoverable: true,
                    ..
                }
        )
    }
}

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_covers_documented_codes() {
        assert!(matches!(
            Error::from_native(NativeResult::FUNCTION_UNSUPPORTED),
            Error::Unsupported(_)
        ));
        assert!(matches!(
            Error::from_native(NativeResult::FUTURE_INVALID),
            Error::HandleInvalid(_)
        ));
        assert!(matches!(
            Error::from_native(NativeResult::HANDLE_INVALID),
            Error::HandleInvalid(_)
        ));
        assert!(matches!(
            Error::from_native(NativeResult::FUTURE_PENDING),
            Error::FuturePending(_)
        ));
        assert!(matches!(
            Error::from_native(NativeResult::OUT_OF_MEMORY),
            Error::ResourceExhausted(_)
        ));
        assert!(matches!(
            Error::from_native(NativeResult::PERMISSION_INSUFFICIENT),
            Error::PermissionInsufficient(_)
        ));
        assert!(matches!(
            Error::from_native(NativeResult::SESSION_LOST),
            Error::OwnerLost {
                recoverable: false,
                ..
            }
        ));
    }

    #[test]
    fn test_unclassified_codes_preserve_raw_value() {
        let err = Error::from_native(NativeResult::from_raw(-987654));
        match err {
            Error::Platform(status) => {
                assert_eq!(status.native_status_code().raw(), -987654);
            }
            other => panic!("expected Platform, got {other:?}"),
        }
    }

    #[test]
    fn test_future_pending_is_recoverable() {
        assert!(Error::from_native(NativeResult::FUTURE_PENDING).is_recoverable());
        assert!(!Error::from_native(NativeResult::FUTURE_INVALID).is_recoverable());
        assert!(!Error::from_native(NativeResult::INSTANCE_LOST).is_recoverable());
    }

    #[test]
    fn test_local_kinds_synthesize_matching_status() {
        let err = Error::InvalidArgument {
            reason: "bad".to_owned(),
        };
        assert_eq!(err.status().status_code(), StatusCode::ValidationFailure);
        assert!(err.status().is_error());

        let err = Error::ProviderUninitialized { scope: "instance" };
        assert_eq!(
            err.status().status_code(),
            StatusCode::ProviderUninitialized
        );
    }
}
