//! Boundary records and their wire layout.
//!
//! Every record that crosses the native shim has a stable, explicit layout:
//! fixed field order, fixed-width little-endian integers, and a leading
//! [`StructureType`] tag identifying the record. The tag is always written
//! by the record's constructors; there is no zero-initialized path that
//! could leave it unset.
//!
//! Records that participate in an extension chain carry an
//! [`ExtensionChain`](chain::ExtensionChain) of typed blocks, serialized
//! after the base fields. Raw successor references never appear in the
//! public API.

pub mod chain;
pub mod entity;
pub mod future;
pub mod persistence;

mod anchor;

pub use anchor::{AnchorCreateInfo, Posef, Quaternionf, Time, Vector3f};

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

/// Tag identifying the concrete type of a boundary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StructureType {
    FuturePollInfo = 1,
    FuturePollResult = 2,
    FutureCancelInfo = 3,
    FutureCompletion = 4,
    PersistenceContextCreateInfo = 5,
    CreateContextCompletion = 6,
    EntityPersistInfo = 7,
    PersistEntityCompletion = 8,
    EntityUnpersistInfo = 9,
    UnpersistEntityCompletion = 10,
    AnchorCreateInfo = 11,
}

impl StructureType {
    /// The raw tag value written on the wire.
    pub const fn raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for StructureType {
    type Error = DecodeError;

    fn try_from(raw: i32) -> Result<Self, DecodeError> {
        Ok(match raw {
            1 => Self::FuturePollInfo,
            2 => Self::FuturePollResult,
            3 => Self::FutureCancelInfo,
            4 => Self::FutureCompletion,
            5 => Self::PersistenceContextCreateInfo,
            6 => Self::CreateContextCompletion,
            7 => Self::EntityPersistInfo,
            8 => Self::PersistEntityCompletion,
            9 => Self::EntityUnpersistInfo,
            10 => Self::UnpersistEntityCompletion,
            11 => Self::AnchorCreateInfo,
            _ => return Err(DecodeError::UnknownTag(raw)),
        })
    }
}

/// Error while decoding a boundary record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before the record did.
    #[error("record truncated: needed {needed} more bytes")]
    Truncated { needed: usize },

    /// The leading tag does not name a known record type.
    #[error("unknown structure tag {0}")]
    UnknownTag(i32),

    /// The leading tag names a different record type than expected.
    #[error("expected {expected:?} record, found tag {found}")]
    UnexpectedTag { expected: StructureType, found: i32 },

    /// A field held a value outside its closed set.
    #[error("invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: i64 },
}

/// Serialize a record into an outgoing request or response buffer.
pub trait Encode {
    fn encode(&self, w: &mut Writer);
}

/// Deserialize a record from an incoming buffer.
pub trait Decode: Sized {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError>;
}

/// Encode a single record into a fresh buffer.
pub fn encode_to_vec<T: Encode>(record: &T) -> Vec<u8> {
    let mut w = Writer::new();
    record.encode(&mut w);
    w.into_vec()
}

/// Decode a single record occupying an entire buffer.
pub fn decode_from_slice<T: Decode>(buf: &[u8]) -> Result<T, DecodeError> {
    let mut r = Reader::new(buf);
    T::decode(&mut r)
}

/// Little-endian record writer.
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(64),
        }
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    pub fn put_i64(&mut self, v: i64) {
        self.buf.put_i64_le(v);
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    pub fn put_bytes(&mut self, v: &[u8]) {
        self.buf.put_slice(v);
    }

    /// Write a record's tag. Every `Encode` impl starts with this.
    pub fn put_tag(&mut self, tag: StructureType) {
        self.put_i32(tag.raw());
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.freeze().to_vec()
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Little-endian record reader with checked access.
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn ensure(&self, len: usize) -> Result<(), DecodeError> {
        if self.buf.len() < len {
            Err(DecodeError::Truncated {
                needed: len - self.buf.len(),
            })
        } else {
            Ok(())
        }
    }

    pub fn get_i32(&mut self) -> Result<i32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    pub fn get_u32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn get_i64(&mut self) -> Result<i64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64_le())
    }

    pub fn get_u64(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn get_f32(&mut self) -> Result<f32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    pub fn get_bytes(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        let out = head.to_vec();
        self.buf = tail;
        Ok(out)
    }

    /// Read and check a record's tag against the expected type.
    pub fn expect_tag(&mut self, expected: StructureType) -> Result<(), DecodeError> {
        let found = self.get_i32()?;
        if found != expected.raw() {
            return Err(DecodeError::UnexpectedTag { expected, found });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_reader_roundtrip() {
        let mut w = Writer::new();
        w.put_i32(-5);
        w.put_u32(7);
        w.put_u64(0x0102_0304_0506_0708);
        w.put_i64(-9);
        w.put_f32(1.5);
        let buf = w.into_vec();

        let mut r = Reader::new(&buf);
        assert_eq!(r.get_i32().unwrap(), -5);
        assert_eq!(r.get_u32().unwrap(), 7);
        assert_eq!(r.get_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.get_i64().unwrap(), -9);
        assert_eq!(r.get_f32().unwrap(), 1.5);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_integers_are_little_endian() {
        let mut w = Writer::new();
        w.put_u32(0x0102_0304);
        assert_eq!(w.into_vec(), [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_truncated_read_reports_missing_bytes() {
        let mut r = Reader::new(&[0x01, 0x02]);
        assert_eq!(r.get_u64(), Err(DecodeError::Truncated { needed: 6 }));
    }

    #[test]
    fn test_tag_mismatch() {
        let mut w = Writer::new();
        w.put_tag(StructureType::FutureCancelInfo);
        let buf = w.into_vec();

        let mut r = Reader::new(&buf);
        let err = r.expect_tag(StructureType::FuturePollInfo).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedTag {
                expected: StructureType::FuturePollInfo,
                found: StructureType::FutureCancelInfo.raw(),
            }
        );
    }

    #[test]
    fn test_structure_type_raw_roundtrip() {
        for tag in [
            StructureType::FuturePollInfo,
            StructureType::FuturePollResult,
            StructureType::FutureCancelInfo,
            StructureType::FutureCompletion,
            StructureType::PersistenceContextCreateInfo,
            StructureType::CreateContextCompletion,
            StructureType::EntityPersistInfo,
            StructureType::PersistEntityCompletion,
            StructureType::EntityUnpersistInfo,
            StructureType::UnpersistEntityCompletion,
            StructureType::AnchorCreateInfo,
        ] {
            assert_eq!(StructureType::try_from(tag.raw()).unwrap(), tag);
        }
        assert!(StructureType::try_from(0).is_err());
    }
}
