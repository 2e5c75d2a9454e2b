//! Future protocol records.
//!
//! A future has three logical states over its lifetime: *Pending* (issued,
//! not yet ready), *Ready* (a result is available, not yet consumed), and
//! *Invalid* (consumed by completion or terminated by cancel). Only the
//! first two are observable through [`FutureState`]; an invalid future
//! reports [`NativeResult::FUTURE_INVALID`](crate::status::NativeResult)
//! from every operation instead.

use serde::{Deserialize, Serialize};

use super::chain::ExtensionChain;
use super::{Decode, DecodeError, Encode, Reader, StructureType, Writer};
use crate::handle::FutureHandle;
use crate::status::NativeResult;

/// Observable state of a live future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FutureState {
    /// The async work has not finished; poll again later.
    Pending = 1,
    /// A result is available; complete the future to retrieve it.
    Ready = 2,
}

impl TryFrom<i32> for FutureState {
    type Error = DecodeError;

    fn try_from(raw: i32) -> Result<Self, DecodeError> {
        match raw {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Ready),
            _ => Err(DecodeError::InvalidValue {
                field: "FutureState",
                value: raw as i64,
            }),
        }
    }
}

/// Input record for a poll operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuturePollInfo {
    pub future: FutureHandle,
    pub chain: ExtensionChain,
}

impl FuturePollInfo {
    pub fn new(future: FutureHandle) -> Self {
        Self {
            future,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for FuturePollInfo {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::FuturePollInfo);
        w.put_u64(self.future.raw());
        self.chain.encode(w);
    }
}

impl Decode for FuturePollInfo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::FuturePollInfo)?;
        let future = FutureHandle::from_raw(r.get_u64()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self { future, chain })
    }
}

/// Output record of a poll operation.
///
/// `state` is only valid to read when the operation's returned status is a
/// success; the context-shaped API enforces this structurally.
#[derive(Debug, Clone, PartialEq)]
pub struct FuturePollResult {
    pub state: FutureState,
    pub chain: ExtensionChain,
}

impl FuturePollResult {
    pub fn new(state: FutureState) -> Self {
        Self {
            state,
            chain: ExtensionChain::new(),
        }
    }
}

impl Default for FuturePollResult {
    fn default() -> Self {
        Self::new(FutureState::Pending)
    }
}

impl Encode for FuturePollResult {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::FuturePollResult);
        w.put_i32(self.state as i32);
        self.chain.encode(w);
    }
}

impl Decode for FuturePollResult {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::FuturePollResult)?;
        let state = FutureState::try_from(r.get_i32()?)?;
        let chain = ExtensionChain::decode(r)?;
        Ok(Self { state, chain })
    }
}

/// Input record for a cancel operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FutureCancelInfo {
    pub future: FutureHandle,
    pub chain: ExtensionChain,
}

impl FutureCancelInfo {
    pub fn new(future: FutureHandle) -> Self {
        Self {
            future,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for FutureCancelInfo {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::FutureCancelInfo);
        w.put_u64(self.future.raw());
        self.chain.encode(w);
    }
}

impl Decode for FutureCancelInfo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::FutureCancelInfo)?;
        let future = FutureHandle::from_raw(r.get_u64()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self { future, chain })
    }
}

/// Generic completion record for async operations with no payload beyond
/// the outcome of the async work itself.
///
/// Operation-specific completion records embed the same leading
/// `future_result` field, giving every completion the double-status
/// layering: the operation's returned status covers retrieval, while
/// `future_result` covers the async work.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FutureCompletion {
    pub future_result: NativeResult,
    pub chain: ExtensionChain,
}

impl FutureCompletion {
    pub fn new(future_result: NativeResult) -> Self {
        Self {
            future_result,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for FutureCompletion {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::FutureCompletion);
        w.put_i32(self.future_result.raw());
        self.chain.encode(w);
    }
}

impl Decode for FutureCompletion {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::FutureCompletion)?;
        let future_result = NativeResult::from_raw(r.get_i32()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self {
            future_result,
            chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{decode_from_slice, encode_to_vec};

    #[test]
    fn test_poll_info_roundtrip() {
        let info = FuturePollInfo::new(FutureHandle::from_raw(123456));
        let buf = encode_to_vec(&info);
        let decoded: FuturePollInfo = decode_from_slice(&buf).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn test_poll_result_layout() {
        let result = FuturePollResult::new(FutureState::Ready);
        let buf = encode_to_vec(&result);
        // tag(4) + state(4) + chain count(4)
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[0..4], &2i32.to_le_bytes());
        assert_eq!(&buf[4..8], &2i32.to_le_bytes());
    }

    #[test]
    fn test_poll_result_rejects_unknown_state() {
        let mut w = Writer::new();
        w.put_tag(StructureType::FuturePollResult);
        w.put_i32(3);
        w.put_u32(0);
        let buf = w.into_vec();
        assert!(matches!(
            decode_from_slice::<FuturePollResult>(&buf),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_cancel_info_tag_is_checked() {
        let info = FutureCancelInfo::new(FutureHandle::from_raw(7));
        let buf = encode_to_vec(&info);
        assert!(decode_from_slice::<FuturePollInfo>(&buf).is_err());
        assert_eq!(decode_from_slice::<FutureCancelInfo>(&buf).unwrap(), info);
    }

    #[test]
    fn test_completion_carries_future_result() {
        let completion = FutureCompletion::new(NativeResult::LOSS_PENDING);
        let buf = encode_to_vec(&completion);
        let decoded: FutureCompletion = decode_from_slice(&buf).unwrap();
        assert_eq!(decoded.future_result, NativeResult::LOSS_PENDING);
    }
}
