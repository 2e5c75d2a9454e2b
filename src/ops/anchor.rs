//! Spatial anchor creation.
//!
//! Anchor creation is synchronous: the runtime tracks the anchor at the
//! requested pose and returns its entity immediately, with no future
//! involved. The anchor can then be persisted through the entity ops.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::handle::{EntityHandle, EntityId, SpatialContextHandle};
use crate::proto::{AnchorCreateInfo, Posef};
use crate::proto::{Encode, Writer};
use crate::shim::entry;
use crate::status::{NativeResult, ResultStatus};

/// An anchor freshly created in a spatial context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAnchor {
    /// Stable id of the entity representing the anchor.
    pub entity_id: EntityId,
    /// Handle to the entity, owned by the caller.
    pub entity: EntityHandle,
}

impl Client {
    /// Create a spatial anchor at the pose described by `info`.
    ///
    /// Explicit-scope form: returns the raw native code. The two outputs
    /// are only valid to read when the code is a success.
    pub fn create_anchor_raw(
        &self,
        spatial_context: SpatialContextHandle,
        info: &AnchorCreateInfo,
        out_entity_id: &mut EntityId,
        out_entity: &mut EntityHandle,
    ) -> NativeResult {
        if spatial_context.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let mut w = Writer::new();
        w.put_u64(spatial_context.raw());
        info.encode(&mut w);
        let mut response = Vec::new();
        let code = self.invoke(entry::CREATE_ANCHOR, &w.into_vec(), &mut response);
        if code.is_error() {
            return code;
        }
        let mut r = crate::proto::Reader::new(&response);
        match (r.get_u64(), r.get_u64()) {
            (Ok(id), Ok(entity)) => {
                *out_entity_id = EntityId(id);
                *out_entity = EntityHandle::from_raw(entity);
                code
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(%err, "malformed anchor creation response");
                NativeResult::RUNTIME_FAILURE
            }
        }
    }

    /// Create a spatial anchor with a caller-built info record.
    pub fn create_anchor_with(
        &self,
        spatial_context: SpatialContextHandle,
        info: &AnchorCreateInfo,
    ) -> Result<(ResultStatus, CreatedAnchor)> {
        if spatial_context.is_null() {
            return Err(Error::InvalidArgument {
                reason: "anchor creation requires a non-null spatial context".to_owned(),
            });
        }
        let mut entity_id = EntityId(0);
        let mut entity = EntityHandle::NULL;
        let status = self.wrap(self.create_anchor_raw(
            spatial_context,
            info,
            &mut entity_id,
            &mut entity,
        ))?;
        Ok((status, CreatedAnchor { entity_id, entity }))
    }

    /// Create a spatial anchor at the given pose, relative to the default
    /// reference space at the current time.
    pub fn create_anchor(
        &self,
        spatial_context: SpatialContextHandle,
        pose: Posef,
    ) -> Result<(ResultStatus, CreatedAnchor)> {
        self.create_anchor_with(spatial_context, &AnchorCreateInfo::default_at(pose))
    }
}
