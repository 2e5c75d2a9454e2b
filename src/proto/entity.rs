//! Entity persist and unpersist records.

use super::chain::ExtensionChain;
use super::{Decode, DecodeError, Encode, Reader, StructureType, Writer};
use crate::handle::{EntityId, SpatialContextHandle, Uuid};
use crate::proto::persistence::ContextResult;
use crate::status::NativeResult;

/// Input record for initiating the persist of a spatial entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityPersistInfo {
    pub spatial_context: SpatialContextHandle,
    pub entity_id: EntityId,
    pub chain: ExtensionChain,
}

impl EntityPersistInfo {
    pub fn new(spatial_context: SpatialContextHandle, entity_id: EntityId) -> Self {
        Self {
            spatial_context,
            entity_id,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for EntityPersistInfo {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::EntityPersistInfo);
        w.put_u64(self.spatial_context.raw());
        w.put_u64(self.entity_id.0);
        self.chain.encode(w);
    }
}

impl Decode for EntityPersistInfo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::EntityPersistInfo)?;
        let spatial_context = SpatialContextHandle::from_raw(r.get_u64()?);
        let entity_id = EntityId(r.get_u64()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self {
            spatial_context,
            entity_id,
            chain,
        })
    }
}

/// Completion payload of an entity persist.
///
/// `persist_result` and `uuid` are only meaningful when `future_result` is
/// a success.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersistEntityCompletion {
    pub future_result: NativeResult,
    pub persist_result: ContextResult,
    pub uuid: Uuid,
    pub chain: ExtensionChain,
}

impl PersistEntityCompletion {
    pub fn new(future_result: NativeResult, persist_result: ContextResult, uuid: Uuid) -> Self {
        Self {
            future_result,
            persist_result,
            uuid,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for PersistEntityCompletion {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::PersistEntityCompletion);
        w.put_i32(self.future_result.raw());
        w.put_i32(self.persist_result.raw());
        w.put_u64(self.uuid.data_part_1);
        w.put_u64(self.uuid.data_part_2);
        self.chain.encode(w);
    }
}

impl Decode for PersistEntityCompletion {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::PersistEntityCompletion)?;
        let future_result = NativeResult::from_raw(r.get_i32()?);
        let persist_result = ContextResult::from_raw(r.get_i32()?);
        let uuid = Uuid::new(r.get_u64()?, r.get_u64()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self {
            future_result,
            persist_result,
            uuid,
            chain,
        })
    }
}

/// Input record for initiating the unpersist of a previously persisted
/// entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityUnpersistInfo {
    pub uuid: Uuid,
    pub chain: ExtensionChain,
}

impl EntityUnpersistInfo {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for EntityUnpersistInfo {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::EntityUnpersistInfo);
        w.put_u64(self.uuid.data_part_1);
        w.put_u64(self.uuid.data_part_2);
        self.chain.encode(w);
    }
}

impl Decode for EntityUnpersistInfo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::EntityUnpersistInfo)?;
        let uuid = Uuid::new(r.get_u64()?, r.get_u64()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self { uuid, chain })
    }
}

/// Completion payload of an entity unpersist.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnpersistEntityCompletion {
    pub future_result: NativeResult,
    pub unpersist_result: ContextResult,
    pub chain: ExtensionChain,
}

impl UnpersistEntityCompletion {
    pub fn new(future_result: NativeResult, unpersist_result: ContextResult) -> Self {
        Self {
            future_result,
            unpersist_result,
            chain: ExtensionChain::new(),
        }
    }
}

impl Encode for UnpersistEntityCompletion {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::UnpersistEntityCompletion);
        w.put_i32(self.future_result.raw());
        w.put_i32(self.unpersist_result.raw());
        self.chain.encode(w);
    }
}

impl Decode for UnpersistEntityCompletion {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::UnpersistEntityCompletion)?;
        let future_result = NativeResult::from_raw(r.get_i32()?);
        let unpersist_result = ContextResult::from_raw(r.get_i32()?);
        let chain = ExtensionChain::decode(r)?;
        Ok(Self {
            future_result,
            unpersist_result,
            chain,
        })
    }
}
