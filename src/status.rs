//! Two-tier operation status.
//!
//! Every call into the runtime reports its outcome on two layers:
//! a framework-level [`StatusCode`] drawn from a small closed set, and a
//! runtime-provided [`NativeResult`] whose sign conveys success or failure
//! and whose magnitude carries vendor detail. [`ResultStatus`] combines the
//! two and defines when the native half is meaningful.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw result code reported by the native runtime.
///
/// Negative values are errors, zero is plain success, and positive values are
/// qualified successes that carry extra information (for example
/// [`NativeResult::LOSS_PENDING`]). The set of named constants below is the
/// documented surface; unlisted values round-trip unchanged so no vendor
/// detail is ever lost.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NativeResult(i32);

impl NativeResult {
    /// The operation completed successfully.
    pub const SUCCESS: Self = Self(0);
    /// The operation timed out before it could complete.
    pub const TIMEOUT_EXPIRED: Self = Self(1);
    /// The owning session will be lost soon. In-flight work may still finish.
    pub const LOSS_PENDING: Self = Self(3);
    /// Arguments failed the runtime's own validation.
    pub const VALIDATION_FAILURE: Self = Self(-1);
    /// The runtime failed in a way not covered by a more specific code.
    pub const RUNTIME_FAILURE: Self = Self(-2);
    /// A native-side allocation failed.
    pub const OUT_OF_MEMORY: Self = Self(-3);
    /// The requested function is not implemented by this runtime.
    pub const FUNCTION_UNSUPPORTED: Self = Self(-7);
    /// The requested feature is not supported.
    pub const FEATURE_UNSUPPORTED: Self = Self(-8);
    /// A required runtime extension is not present.
    pub const EXTENSION_NOT_PRESENT: Self = Self(-9);
    /// The runtime supports no more of the requested resource.
    pub const LIMIT_REACHED: Self = Self(-10);
    /// A supplied object handle was invalid.
    pub const HANDLE_INVALID: Self = Self(-12);
    /// The instance was lost and must be destroyed and recreated.
    pub const INSTANCE_LOST: Self = Self(-13);
    /// The session was lost.
    pub const SESSION_LOST: Self = Self(-17);
    /// The operation requires a permission that has not been granted.
    pub const PERMISSION_INSUFFICIENT: Self = Self(-1000710000);
    /// The future is not ready yet. Retryable: poll longer, then complete.
    pub const FUTURE_PENDING: Self = Self(-1000469001);
    /// The future was already completed or cancelled.
    pub const FUTURE_INVALID: Self = Self(-1000469002);
    /// The requested persistence scope is not supported by the system.
    pub const SCOPE_UNSUPPORTED: Self = Self(-1000763001);
    /// The persistence scope is incompatible with the operation.
    pub const SCOPE_INCOMPATIBLE: Self = Self(-1000781001);

    /// Wrap a raw code reported by the runtime.
    pub const fn from_raw(code: i32) -> Self {
        Self(code)
    }

    /// The raw integer value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// `true` for zero and all positive codes.
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// `true` for all negative codes.
    pub const fn is_error(self) -> bool {
        self.0 < 0
    }

    /// Name of the code if it is part of the documented set.
    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "Success",
            Self::TIMEOUT_EXPIRED => "TimeoutExpired",
            Self::LOSS_PENDING => "LossPending",
            Self::VALIDATION_FAILURE => "ValidationFailure",
            Self::RUNTIME_FAILURE => "RuntimeFailure",
            Self::OUT_OF_MEMORY => "OutOfMemory",
            Self::FUNCTION_UNSUPPORTED => "FunctionUnsupported",
            Self::FEATURE_UNSUPPORTED => "FeatureUnsupported",
            Self::EXTENSION_NOT_PRESENT => "ExtensionNotPresent",
            Self::LIMIT_REACHED => "LimitReached",
            Self::HANDLE_INVALID => "HandleInvalid",
            Self::INSTANCE_LOST => "InstanceLost",
            Self::SESSION_LOST => "SessionLost",
            Self::PERMISSION_INSUFFICIENT => "PermissionInsufficient",
            Self::FUTURE_PENDING => "FuturePending",
            Self::FUTURE_INVALID => "FutureInvalid",
            Self::SCOPE_UNSUPPORTED => "ScopeUnsupported",
            Self::SCOPE_INCOMPATIBLE => "ScopeIncompatible",
            _ => return None,
        })
    }
}

impl fmt::Display for NativeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "NativeResult({})", self.0),
        }
    }
}

/// Framework-level outcome of an operation.
///
/// Negative values are failures, zero is an unqualified success, and positive
/// values are successes with additional information available in the
/// companion [`NativeResult`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(i32)]
pub enum StatusCode {
    /// The operation succeeded and the native code carries extra detail.
    PlatformQualifiedSuccess = 1,
    /// The operation succeeded with nothing further to report.
    #[default]
    UnqualifiedSuccess = 0,
    /// The operation failed and the native code carries the error detail.
    PlatformError = -1,
    /// The operation failed for an unknown reason with no native detail.
    UnknownError = -2,
    /// The client has no live runtime scope to direct the call at.
    ProviderUninitialized = -3,
    /// The runtime scope exists but has not been started.
    ProviderNotStarted = -4,
    /// Arguments failed local validation before reaching native code.
    ValidationFailure = -5,
    /// The client has determined the operation is unsupported on this system.
    Unsupported = -6,
}

impl StatusCode {
    /// Whether this code is defined to require a companion native code.
    pub const fn requires_native_code(self) -> bool {
        matches!(self, Self::PlatformQualifiedSuccess | Self::PlatformError)
    }
}

/// The outcome of an operation as a framework [`StatusCode`] plus a
/// runtime-provided [`NativeResult`].
///
/// The native half is only meaningful when the status code is
/// [`StatusCode::PlatformQualifiedSuccess`] or [`StatusCode::PlatformError`];
/// for every other status code it holds [`NativeResult::SUCCESS`] as a
/// neutral filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultStatus {
    status_code: StatusCode,
    native_status_code: NativeResult,
}

impl ResultStatus {
    /// A default successful status, convenient for tests.
    pub const UNQUALIFIED_SUCCESS: Self = Self {
        status_code: StatusCode::UnqualifiedSuccess,
        native_status_code: NativeResult::SUCCESS,
    };

    /// Construct from a bare framework outcome.
    ///
    /// Fails with [`Error::InvalidArgument`] if `status_code` is
    /// [`StatusCode::PlatformQualifiedSuccess`] or
    /// [`StatusCode::PlatformError`], since those are defined to require a
    /// companion native code. Use [`ResultStatus::from_native`] or
    /// [`ResultStatus::with_native`] for those.
    pub fn from_code(status_code: StatusCode) -> Result<Self> {
        if status_code.requires_native_code() {
            return Err(Error::InvalidArgument {
                reason: format!(
                    "status code {status_code:?} requires a corresponding native status code"
                ),
            });
        }
        Ok(Self {
            status_code,
            native_status_code: NativeResult::SUCCESS,
        })
    }

    /// Construct from a native result code alone.
    ///
    /// The framework tier is derived from the sign of the code: positive is a
    /// qualified success, zero an unqualified success, negative a platform
    /// error.
    pub const fn from_native(native_status_code: NativeResult) -> Self {
        let status_code = match native_status_code.raw() {
            1.. => StatusCode::PlatformQualifiedSuccess,
            0 => StatusCode::UnqualifiedSuccess,
            _ => StatusCode::PlatformError,
        };
        Self {
            status_code,
            native_status_code,
        }
    }

    /// Construct from an explicit pair, for call sites that need full control.
    pub const fn with_native(status_code: StatusCode, native_status_code: NativeResult) -> Self {
        Self {
            status_code,
            native_status_code,
        }
    }

    /// The framework-level status code.
    pub const fn status_code(self) -> StatusCode {
        self.status_code
    }

    /// The runtime-provided status code.
    ///
    /// Only meaningful when [`ResultStatus::status_code`] is
    /// [`StatusCode::PlatformQualifiedSuccess`] or
    /// [`StatusCode::PlatformError`].
    pub const fn native_status_code(self) -> NativeResult {
        self.native_status_code
    }

    /// `true` if the operation succeeded with nothing further to report.
    pub const fn is_unqualified_success(self) -> bool {
        matches!(self.status_code, StatusCode::UnqualifiedSuccess)
    }

    /// `true` for any success, inclusive of qualified successes.
    ///
    /// Equivalent to `!self.is_error()` and to converting to `bool`.
    pub const fn is_success(self) -> bool {
        self.status_code as i32 >= 0
    }

    /// `true` if the operation failed with an error.
    pub const fn is_error(self) -> bool {
        !self.is_success()
    }
}

impl From<ResultStatus> for bool {
    fn from(status: ResultStatus) -> Self {
        status.is_success()
    }
}

impl From<NativeResult> for ResultStatus {
    fn from(code: NativeResult) -> Self {
        Self::from_native(code)
    }
}

/// Equality against a bare native code: the native halves must match and the
/// framework tier must agree with the sign of the code.
impl PartialEq<NativeResult> for ResultStatus {
    fn eq(&self, other: &NativeResult) -> bool {
        if self.native_status_code != *other {
            return false;
        }
        match other.raw() {
            1.. => self.status_code == StatusCode::PlatformQualifiedSuccess,
            0 => self.status_code == StatusCode::UnqualifiedSuccess,
            _ => self.status_code == StatusCode::PlatformError,
        }
    }
}

impl PartialEq<ResultStatus> for NativeResult {
    fn eq(&self, other: &ResultStatus) -> bool {
        other == self
    }
}

/// Sorted first by native status code, then by framework status code, so
/// batches of statuses can be sorted and deduplicated deterministically.
impl Ord for ResultStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.native_status_code
            .cmp(&other.native_status_code)
            .then_with(|| self.status_code.cmp(&other.status_code))
    }
}

impl PartialOrd for ResultStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status_code.requires_native_code() {
            write!(f, "({:?}, {})", self.status_code, self.native_status_code)
        } else {
            write!(f, "({:?})", self.status_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_rejects_platform_variants() {
        for code in [StatusCode::PlatformQualifiedSuccess, StatusCode::PlatformError] {
            let err = ResultStatus::from_code(code).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument { .. }), "{code:?}");
        }
    }

    #[test]
    fn test_from_code_accepts_remaining_variants() {
        for code in [
            StatusCode::UnqualifiedSuccess,
            StatusCode::UnknownError,
            StatusCode::ProviderUninitialized,
            StatusCode::ProviderNotStarted,
            StatusCode::ValidationFailure,
            StatusCode::Unsupported,
        ] {
            let status = ResultStatus::from_code(code).unwrap();
            assert_eq!(status.status_code(), code);
            assert_eq!(status.native_status_code(), NativeResult::SUCCESS);
        }
    }

    #[test]
    fn test_from_native_derives_tier_from_sign() {
        let qualified = ResultStatus::from_native(NativeResult::LOSS_PENDING);
        assert_eq!(qualified.status_code(), StatusCode::PlatformQualifiedSuccess);
        assert!(qualified.is_success());
        assert!(!qualified.is_unqualified_success());

        let plain = ResultStatus::from_native(NativeResult::SUCCESS);
        assert_eq!(plain.status_code(), StatusCode::UnqualifiedSuccess);
        assert!(plain.is_unqualified_success());

        let error = ResultStatus::from_native(NativeResult::HANDLE_INVALID);
        assert_eq!(error.status_code(), StatusCode::PlatformError);
        assert!(error.is_error());
        assert!(!bool::from(error));
    }

    #[test]
    fn test_equality_with_native_code() {
        for raw in [-1000469002, -12, -1, 0, 1, 3] {
            let code = NativeResult::from_raw(raw);
            assert_eq!(ResultStatus::from_native(code), code, "code {raw}");
        }

        // Same native code but a mismatched tier is not equal.
        let mismatched =
            ResultStatus::with_native(StatusCode::PlatformError, NativeResult::SUCCESS);
        assert_ne!(mismatched, NativeResult::SUCCESS);

        // Codes on opposite sides of zero are never equal.
        let zero = ResultStatus::from_native(NativeResult::SUCCESS);
        assert_ne!(zero, NativeResult::TIMEOUT_EXPIRED);
        assert_ne!(zero, NativeResult::VALIDATION_FAILURE);
    }

    #[test]
    fn test_ordering_native_code_first() {
        let a = ResultStatus::from_native(NativeResult::HANDLE_INVALID);
        let b = ResultStatus::from_native(NativeResult::SUCCESS);
        let c = ResultStatus::from_native(NativeResult::LOSS_PENDING);

        assert!(a < b);
        assert!(b < c);
        assert_eq!(
            a.cmp(&b),
            a.native_status_code().cmp(&b.native_status_code())
        );
    }

    #[test]
    fn test_ordering_falls_back_to_status_code() {
        let unknown =
            ResultStatus::from_code(StatusCode::UnknownError).unwrap();
        let unsupported = ResultStatus::from_code(StatusCode::Unsupported).unwrap();
        assert_eq!(
            unknown.native_status_code(),
            unsupported.native_status_code()
        );
        assert!(unsupported < unknown);
    }

    #[test]
    fn test_sort_and_dedup_batches() {
        let mut batch = vec![
            ResultStatus::from_native(NativeResult::SUCCESS),
            ResultStatus::from_native(NativeResult::FUTURE_INVALID),
            ResultStatus::from_native(NativeResult::SUCCESS),
            ResultStatus::from_native(NativeResult::LOSS_PENDING),
        ];
        batch.sort();
        batch.dedup();
        assert_eq!(
            batch,
            vec![
                ResultStatus::from_native(NativeResult::FUTURE_INVALID),
                ResultStatus::from_native(NativeResult::SUCCESS),
                ResultStatus::from_native(NativeResult::LOSS_PENDING),
            ]
        );
    }

    #[test]
    fn test_display_shows_native_code_only_when_qualified() {
        let qualified = ResultStatus::from_native(NativeResult::FUTURE_PENDING);
        assert_eq!(qualified.to_string(), "(PlatformError, FuturePending)");

        let plain = ResultStatus::from_code(StatusCode::Unsupported).unwrap();
        assert_eq!(plain.to_string(), "(Unsupported)");
    }

    #[test]
    fn test_native_result_display() {
        assert_eq!(NativeResult::FUTURE_INVALID.to_string(), "FutureInvalid");
        assert_eq!(
            NativeResult::from_raw(-42).to_string(),
            "NativeResult(-42)"
        );
    }
}
