//! Persist and unpersist operations on spatial entities.
//!
//! Both families follow the same two-phase protocol as context creation:
//! the async call returns a future scoped to a persistence context, and the
//! matching completion call consumes that future once Ready. A persist
//! completion yields the UUID under which the entity was stored; an
//! unpersist takes such a UUID and removes the stored entity.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::handle::{EntityId, FutureHandle, PersistenceContextHandle, SpatialContextHandle, Uuid};
use crate::proto::entity::{
    EntityPersistInfo, EntityUnpersistInfo, PersistEntityCompletion, UnpersistEntityCompletion,
};
use crate::proto::{Encode, Writer};
use crate::shim::entry;
use crate::status::{NativeResult, ResultStatus};

fn context_request<T: Encode>(context: PersistenceContextHandle, info: &T) -> Vec<u8> {
    let mut w = Writer::new();
    w.put_u64(context.raw());
    info.encode(&mut w);
    w.into_vec()
}

fn completion_request(context: PersistenceContextHandle, future: FutureHandle) -> Vec<u8> {
    let mut w = Writer::new();
    w.put_u64(context.raw());
    w.put_u64(future.raw());
    w.into_vec()
}

impl Client {
    /// Begin persisting a spatial entity under the given persistence
    /// context.
    ///
    /// Explicit-scope form: returns the raw native code, and `out` holds a
    /// valid future only when the code is a success.
    pub fn persist_entity_async_raw(
        &self,
        context: PersistenceContextHandle,
        info: &EntityPersistInfo,
        out: &mut FutureHandle,
    ) -> NativeResult {
        if context.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let mut raw = 0u64;
        let code = self.invoke_u64(
            entry::PERSIST_ENTITY_ASYNC,
            &context_request(context, info),
            &mut raw,
        );
        if code.is_success() {
            *out = FutureHandle::from_raw(raw);
        }
        code
    }

    /// Begin persisting a spatial entity, with a caller-built info record.
    pub fn persist_entity_async_with(
        &self,
        context: PersistenceContextHandle,
        info: &EntityPersistInfo,
    ) -> Result<(ResultStatus, FutureHandle)> {
        if context.is_null() {
            return Err(Error::InvalidArgument {
                reason: "persist requires a non-null persistence context".to_owned(),
            });
        }
        let mut future = FutureHandle::NULL;
        let status = self.wrap(self.persist_entity_async_raw(context, info, &mut future))?;
        Ok((status, future))
    }

    /// Begin persisting the entity with the given id, discovered through
    /// the given spatial context.
    pub fn persist_entity_async(
        &self,
        context: PersistenceContextHandle,
        spatial_context: SpatialContextHandle,
        entity_id: EntityId,
    ) -> Result<(ResultStatus, FutureHandle)> {
        self.persist_entity_async_with(context, &EntityPersistInfo::new(spatial_context, entity_id))
    }

    /// Complete an in-flight entity persist, consuming its future.
    ///
    /// Explicit-scope form. A future-pending code leaves the future live;
    /// any other outcome consumes it.
    pub fn persist_entity_complete_raw(
        &self,
        context: PersistenceContextHandle,
        future: FutureHandle,
        out: &mut PersistEntityCompletion,
    ) -> NativeResult {
        if context.is_null() || future.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        self.invoke_decoding(
            entry::PERSIST_ENTITY_COMPLETE,
            &completion_request(context, future),
            out,
        )
    }

    /// Complete an in-flight entity persist.
    ///
    /// On success the completion's `uuid` identifies the stored entity and
    /// can later be handed to [`Client::unpersist_entity_async`].
    pub fn persist_entity_complete(
        &self,
        context: PersistenceContextHandle,
        future: FutureHandle,
    ) -> Result<(ResultStatus, PersistEntityCompletion)> {
        if context.is_null() || future.is_null() {
            return Err(Error::InvalidArgument {
                reason: "persist completion requires non-null context and future".to_owned(),
            });
        }
        let mut out = PersistEntityCompletion::default();
        let status = self.wrap(self.persist_entity_complete_raw(context, future, &mut out))?;
        Ok((status, out))
    }

    /// Begin removing a previously persisted entity.
    ///
    /// Explicit-scope form: returns the raw native code.
    pub fn unpersist_entity_async_raw(
        &self,
        context: PersistenceContextHandle,
        info: &EntityUnpersistInfo,
        out: &mut FutureHandle,
    ) -> NativeResult {
        if context.is_null() || info.uuid.is_empty() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let mut raw = 0u64;
        let code = self.invoke_u64(
            entry::UNPERSIST_ENTITY_ASYNC,
            &context_request(context, info),
            &mut raw,
        );
        if code.is_success() {
            *out = FutureHandle::from_raw(raw);
        }
        code
    }

    /// Begin removing a previously persisted entity, with a caller-built
    /// info record.
    pub fn unpersist_entity_async_with(
        &self,
        context: PersistenceContextHandle,
        info: &EntityUnpersistInfo,
    ) -> Result<(ResultStatus, FutureHandle)> {
        if context.is_null() {
            return Err(Error::InvalidArgument {
                reason: "unpersist requires a non-null persistence context".to_owned(),
            });
        }
        if info.uuid.is_empty() {
            return Err(Error::InvalidArgument {
                reason: "unpersist requires a non-empty uuid".to_owned(),
            });
        }
        let mut future = FutureHandle::NULL;
        let status = self.wrap(self.unpersist_entity_async_raw(context, info, &mut future))?;
        Ok((status, future))
    }

    /// Begin removing the persisted entity stored under the given UUID.
    pub fn unpersist_entity_async(
        &self,
        context: PersistenceContextHandle,
        uuid: Uuid,
    ) -> Result<(ResultStatus, FutureHandle)> {
        self.unpersist_entity_async_with(context, &EntityUnpersistInfo::new(uuid))
    }

    /// Complete an in-flight entity unpersist, consuming its future.
    ///
    /// Explicit-scope form. A future-pending code leaves the future live;
    /// any other outcome consumes it.
    pub fn unpersist_entity_complete_raw(
        &self,
        context: PersistenceContextHandle,
        future: FutureHandle,
        out: &mut UnpersistEntityCompletion,
    ) -> NativeResult {
        if context.is_null() || future.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        self.invoke_decoding(
            entry::UNPERSIST_ENTITY_COMPLETE,
            &completion_request(context, future),
            out,
        )
    }

    /// Complete an in-flight entity unpersist.
    pub fn unpersist_entity_complete(
        &self,
        context: PersistenceContextHandle,
        future: FutureHandle,
    ) -> Result<(ResultStatus, UnpersistEntityCompletion)> {
        if context.is_null() || future.is_null() {
            return Err(Error::InvalidArgument {
                reason: "unpersist completion requires non-null context and future".to_owned(),
            });
        }
        let mut out = UnpersistEntityCompletion::default();
        let status = self.wrap(self.unpersist_entity_complete_raw(context, future, &mut out))?;
        Ok((status, out))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::MockRuntime;
    use crate::proto::future::FutureState;
    use crate::proto::persistence::{ContextResult, PersistenceScope};

    fn client_with(mock: MockRuntime) -> Client {
        Client::builder()
            .shim(Arc::new(mock))
            .ambient_scopes(1, 1, 1)
            .build()
            .unwrap()
    }

    fn ready_context(client: &Client) -> PersistenceContextHandle {
        let (_, future) = client
            .create_persistence_context_async(PersistenceScope::LocalAnchors)
            .unwrap();
        client.poll_future(future).unwrap();
        let (_, completion) = client.create_persistence_context_complete(future).unwrap();
        completion.context
    }

    #[test]
    fn test_persist_then_unpersist_round_trip() {
        let client = client_with(MockRuntime::builder().ready_after(1).build());
        let context = ready_context(&client);

        let (_, future) = client
            .persist_entity_async(context, SpatialContextHandle::from_raw(5), EntityId(42))
            .unwrap();
        let (_, poll) = client.poll_future(future).unwrap();
        assert_eq!(poll.state, FutureState::Ready);

        let (status, persisted) = client.persist_entity_complete(context, future).unwrap();
        assert!(status.is_success());
        assert!(persisted.future_result.is_success());
        assert_eq!(persisted.persist_result, ContextResult::SUCCESS);
        assert!(!persisted.uuid.is_empty());

        let (_, future) = client.unpersist_entity_async(context, persisted.uuid).unwrap();
        client.poll_future(future).unwrap();
        let (_, removed) = client.unpersist_entity_complete(context, future).unwrap();
        assert!(removed.future_result.is_success());
        assert_eq!(removed.unpersist_result, ContextResult::SUCCESS);
    }

    #[test]
    fn test_unpersist_unknown_uuid_reports_in_completion() {
        let client = client_with(MockRuntime::builder().ready_after(1).build());
        let context = ready_context(&client);

        let (_, future) = client
            .unpersist_entity_async(context, Uuid::new(0xDEAD, 0xBEEF))
            .unwrap();
        client.poll_future(future).unwrap();
        let (status, removed) = client.unpersist_entity_complete(context, future).unwrap();

        // The protocol call succeeds; the failure lives in the op result.
        assert!(status.is_success());
        assert!(removed.future_result.is_success());
        assert_eq!(removed.unpersist_result, ContextResult::UUID_NOT_FOUND);
    }

    #[test]
    fn test_empty_uuid_rejected_locally() {
        let client = client_with(MockRuntime::builder().build());
        let context = PersistenceContextHandle::from_raw(1);

        let err = client.unpersist_entity_async(context, Uuid::EMPTY).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        let mut future = FutureHandle::NULL;
        let code = client.unpersist_entity_async_raw(
            context,
            &EntityUnpersistInfo::new(Uuid::EMPTY),
            &mut future,
        );
        assert_eq!(code, NativeResult::VALIDATION_FAILURE);
    }

    #[test]
    fn test_persist_with_unknown_context() {
        let client = client_with(MockRuntime::builder().build());
        let err = client
            .persist_entity_async(
                PersistenceContextHandle::from_raw(404),
                SpatialContextHandle::from_raw(5),
                EntityId(42),
            )
            .unwrap_err();
        assert!(matches!(err, Error::HandleInvalid(_)));
    }

    #[test]
    fn test_persist_future_consumed_by_completion() {
        let client = client_with(MockRuntime::builder().ready_after(1).build());
        let context = ready_context(&client);

        let (_, future) = client
            .persist_entity_async(context, SpatialContextHandle::from_raw(5), EntityId(7))
            .unwrap();
        client.poll_future(future).unwrap();
        client.persist_entity_complete(context, future).unwrap();

        let err = client.persist_entity_complete(context, future).unwrap_err();
        assert!(matches!(err, Error::HandleInvalid(_)));
    }
}
