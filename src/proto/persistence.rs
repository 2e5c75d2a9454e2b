//! Persistence context records.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::chain::ExtensionChain;
use super::{Decode, DecodeError, Encode, Reader, StructureType, Writer};
use crate::handle::PersistenceContextHandle;
use crate::status::NativeResult;

/// Storage scope of a persistence context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PersistenceScope {
    /// Entities the system itself decided to persist.
    SystemManaged = 1,
    /// Anchors persisted locally by this application.
    LocalAnchors = 1000781000,
}

impl TryFrom<i32> for PersistenceScope {
    type Error = DecodeError;

    fn try_from(raw: i32) -> Result<Self, DecodeError> {
        match raw {
            1 => Ok(Self::SystemManaged),
            1000781000 => Ok(Self::LocalAnchors),
            _ => Err(DecodeError::InvalidValue {
                field: "PersistenceScope",
                value: raw as i64,
            }),
        }
    }
}

/// Outcome of the persistence work itself, distinct from the protocol-level
/// [`NativeResult`]. Sign semantics match it: negative is an error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContextResult(i32);

impl ContextResult {
    /// The persistence operation succeeded.
    pub const SUCCESS: Self = Self(0);
    /// The entity is not currently tracking and cannot be persisted.
    pub const ENTITY_NOT_TRACKING: Self = Self(-1000781001);
    /// No persisted entity with the given UUID exists in this scope.
    pub const UUID_NOT_FOUND: Self = Self(-1000781002);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_error(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for ContextResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SUCCESS => f.write_str("Success"),
            Self::ENTITY_NOT_TRACKING => f.write_str("EntityNotTracking"),
            Self::UUID_NOT_FOUND => f.write_str("UuidNotFound"),
            Self(raw) => write!(f, "ContextResult({raw})"),
        }
    }
}

/// Input record for initiating persistence-context creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceContextCreateInfo {
    pub scope: PersistenceScope,
    pub chain: ExtensionChain,
}

impl PersistenceContextCreateInfo {
    pub fn new(scope: PersistenceScope) -> Self {
        Self {
            scope,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for PersistenceContextCreateInfo {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::PersistenceContextCreateInfo);
        w.put_i32(self.scope as i32);
        self.chain.encode(w);
    }
}

impl Decode for PersistenceContextCreateInfo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::PersistenceContextCreateInfo)?;
        let scope = PersistenceScope::try_from(r.get_i32()?)?;
        let chain = ExtensionChain::decode(r)?;
        Ok(Self { scope, chain })
    }
}

/// Completion payload of persistence-context creation.
///
/// `create_result` and `context` are only meaningful when `future_result`
/// is a success. On success, ownership of `context` passes to the caller,
/// who must eventually destroy it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateContextCompletion {
    pub future_result: NativeResult,
    pub create_result: ContextResult,
    pub context: PersistenceContextHandle,
    pub chain: ExtensionChain,
}

impl CreateContextCompletion {
    pub fn new(
        future_result: NativeResult,
        create_result: ContextResult,
        context: PersistenceContextHandle,
    ) -> Self {
        Self {
            future_result,
            create_result,
            context,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for CreateContextCompletion {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::CreateContextCompletion);
        w.put_i32(self.future_result.raw());
        w.put_i32(self.create_result.raw());
        w.put_u64(self.context.raw());
        self.chain.encode(w);
    }
}

impl Decode for CreateContextCompletion {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::CreateContextCompletion)?;
        let future_result = NativeResult::from_raw(r.get_i32()?);
        let create_result = ContextResult::from_raw(r.get_i32()?);
        let context = PersistenceContextHandle::from_raw(r.get_u64()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self {
            future_result,
            create_result,
            context,
            chain,
        })
    }
}
