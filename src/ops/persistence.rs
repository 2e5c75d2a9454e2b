//! Persistence context lifecycle and scope discovery.
//!
//! Creating a context is a two-phase async operation: the async call returns
//! a future, and once a poll reports Ready the completion call consumes the
//! future and yields the completion record. The completion carries its own
//! two result codes beyond the call's status: `future_result` for the async
//! work as a whole and `create_result` for the context-specific outcome, and
//! the context handle is only meaningful when both report success.
//!
//! Scope discovery uses the two-call capacity idiom: call once with zero
//! capacity to learn the count, then again with a buffer of that size.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::handle::{FutureHandle, InstanceHandle, PersistenceContextHandle, SessionHandle, SystemId};
use crate::proto::persistence::{
    CreateContextCompletion, PersistenceContextCreateInfo, PersistenceScope,
};
use crate::proto::{Encode, Writer};
use crate::shim::entry;
use crate::status::{NativeResult, ResultStatus};

impl Client {
    /// Begin creating a persistence context for the given session.
    ///
    /// Explicit-scope form: returns the raw native code, and `out` holds a
    /// valid future only when the code is a success.
    pub fn create_persistence_context_async_raw(
        &self,
        session: SessionHandle,
        info: &PersistenceContextCreateInfo,
        out: &mut FutureHandle,
    ) -> NativeResult {
        let mut w = Writer::new();
        w.put_u64(session.raw());
        info.encode(&mut w);
        let mut raw = 0u64;
        let code = self.invoke_u64(entry::CREATE_CONTEXT_ASYNC, &w.into_vec(), &mut raw);
        if code.is_success() {
            *out = FutureHandle::from_raw(raw);
        }
        code
    }

    /// Begin creating a persistence context for the current session.
    pub fn create_persistence_context_async_with(
        &self,
        info: &PersistenceContextCreateInfo,
    ) -> Result<(ResultStatus, FutureHandle)> {
        let session = self.session_scope()?;
        let mut future = FutureHandle::NULL;
        let status = self.wrap(self.create_persistence_context_async_raw(session, info, &mut future))?;
        Ok((status, future))
    }

    /// Begin creating a persistence context of the given scope for the
    /// current session.
    pub fn create_persistence_context_async(
        &self,
        scope: PersistenceScope,
    ) -> Result<(ResultStatus, FutureHandle)> {
        self.create_persistence_context_async_with(&PersistenceContextCreateInfo::new(scope))
    }

    /// Complete an in-flight context creation, consuming its future.
    ///
    /// Explicit-scope form. Completing a future that has not yet been polled
    /// Ready fails with the future-pending code and leaves the future live;
    /// any success or any other error consumes the future permanently.
    pub fn create_persistence_context_complete_raw(
        &self,
        session: SessionHandle,
        future: FutureHandle,
        out: &mut CreateContextCompletion,
    ) -> NativeResult {
        if future.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let mut w = Writer::new();
        w.put_u64(session.raw());
        w.put_u64(future.raw());
        self.invoke_decoding(entry::CREATE_CONTEXT_COMPLETE, &w.into_vec(), out)
    }

    /// Complete an in-flight context creation for the current session.
    pub fn create_persistence_context_complete(
        &self,
        future: FutureHandle,
    ) -> Result<(ResultStatus, CreateContextCompletion)> {
        if future.is_null() {
            return Err(Error::InvalidArgument {
                reason: "completion requires a non-null future handle".to_owned(),
            });
        }
        let session = self.session_scope()?;
        let mut out = CreateContextCompletion::default();
        let status =
            self.wrap(self.create_persistence_context_complete_raw(session, future, &mut out))?;
        Ok((status, out))
    }

    /// Destroy a persistence context and release its runtime resources.
    ///
    /// Explicit-scope form: returns the raw native code.
    pub fn destroy_persistence_context_raw(
        &self,
        context: PersistenceContextHandle,
    ) -> NativeResult {
        if context.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let mut w = Writer::new();
        w.put_u64(context.raw());
        let mut response = Vec::new();
        self.invoke(entry::DESTROY_CONTEXT, &w.into_vec(), &mut response)
    }

    /// Destroy a persistence context and release its runtime resources.
    pub fn destroy_persistence_context(
        &self,
        context: PersistenceContextHandle,
    ) -> Result<ResultStatus> {
        if context.is_null() {
            return Err(Error::InvalidArgument {
                reason: "destroy requires a non-null context handle".to_owned(),
            });
        }
        self.wrap(self.destroy_persistence_context_raw(context))
    }

    /// Enumerate the persistence scopes the system supports.
    ///
    /// Explicit-scope form using the two-call capacity idiom: `count` is
    /// always written on success, and at most `min(count, out.len())` scope
    /// values are stored. Pass an empty buffer to query the count alone.
    pub fn enumerate_persistence_scopes_raw(
        &self,
        instance: InstanceHandle,
        system: SystemId,
        out: &mut [PersistenceScope],
        count: &mut u32,
    ) -> NativeResult {
        let mut w = Writer::new();
        w.put_u64(instance.raw());
        w.put_u64(system.0);
        w.put_u32(out.len() as u32);
        let mut response = Vec::new();
        let code = self.invoke(entry::ENUMERATE_SCOPES, &w.into_vec(), &mut response);
        if code.is_error() {
            return code;
        }
        let mut r = crate::proto::Reader::new(&response);
        let total = match r.get_u32() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(%err, "malformed scope enumeration response");
                return NativeResult::RUNTIME_FAILURE;
            }
        };
        let stored = total.min(out.len() as u32) as usize;
        for slot in out.iter_mut().take(stored) {
            let raw = match r.get_i32() {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(%err, "malformed scope enumeration response");
                    return NativeResult::RUNTIME_FAILURE;
                }
            };
            *slot = match PersistenceScope::try_from(raw) {
                Ok(scope) => scope,
                Err(_) => {
                    tracing::warn!(value = raw, "runtime reported an unknown persistence scope");
                    return NativeResult::RUNTIME_FAILURE;
                }
            };
        }
        *count = total;
        code
    }

    /// Enumerate the persistence scopes the current system supports.
    ///
    /// Performs both calls of the capacity idiom and returns the full list.
    pub fn enumerate_persistence_scopes(
        &self,
    ) -> Result<(ResultStatus, Vec<PersistenceScope>)> {
        let instance = self.instance_scope()?;
        let system = self.system_scope()?;

        let mut count = 0u32;
        self.wrap(self.enumerate_persistence_scopes_raw(instance, system, &mut [], &mut count))?;

        let mut scopes = vec![PersistenceScope::SystemManaged; count as usize];
        let status = self.wrap(self.enumerate_persistence_scopes_raw(
            instance,
            system,
            &mut scopes,
            &mut count,
        ))?;
        scopes.truncate(count as usize);
        Ok((status, scopes))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::MockRuntime;
    use crate::proto::future::FutureState;

    fn client_with(mock: MockRuntime) -> Client {
        Client::builder()
            .shim(Arc::new(mock))
            .ambient_scopes(1, 1, 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_context_round_trip() {
        let client = client_with(MockRuntime::builder().ready_after(1).build());

        let (status, future) = client
            .create_persistence_context_async(PersistenceScope::SystemManaged)
            .unwrap();
        assert!(status.is_unqualified_success());
        assert!(!future.is_null());

        let (_, poll) = client.poll_future(future).unwrap();
        assert_eq!(poll.state, FutureState::Ready);

        let (status, completion) = client.create_persistence_context_complete(future).unwrap();
        assert!(status.is_success());
        assert!(completion.future_result.is_success());
        assert!(completion.create_result.is_success());
        assert!(!completion.context.is_null());
    }

    #[test]
    fn test_complete_before_ready_keeps_future_live() {
        let client = client_with(MockRuntime::builder().ready_after(2).build());
        let (_, future) = client
            .create_persistence_context_async(PersistenceScope::LocalAnchors)
            .unwrap();

        let err = client.create_persistence_context_complete(future).unwrap_err();
        assert!(matches!(err, Error::FuturePending(_)));
        assert!(err.is_recoverable());

        // The early completion did not consume the handle or its progress.
        let (_, poll) = client.poll_future(future).unwrap();
        assert_eq!(poll.state, FutureState::Pending);
        let (_, poll) = client.poll_future(future).unwrap();
        assert_eq!(poll.state, FutureState::Ready);
        let (_, completion) = client.create_persistence_context_complete(future).unwrap();
        assert!(completion.future_result.is_success());
    }

    #[test]
    fn test_completed_future_is_consumed() {
        let client = client_with(MockRuntime::builder().ready_after(1).build());
        let (_, future) = client
            .create_persistence_context_async(PersistenceScope::SystemManaged)
            .unwrap();
        client.poll_future(future).unwrap();
        client.create_persistence_context_complete(future).unwrap();

        let err = client.create_persistence_context_complete(future).unwrap_err();
        assert!(matches!(err, Error::HandleInvalid(_)));
    }

    #[test]
    fn test_destroy_context() {
        let client = client_with(MockRuntime::builder().ready_after(1).build());
        let (_, future) = client
            .create_persistence_context_async(PersistenceScope::SystemManaged)
            .unwrap();
        client.poll_future(future).unwrap();
        let (_, completion) = client.create_persistence_context_complete(future).unwrap();

        let status = client.destroy_persistence_context(completion.context).unwrap();
        assert!(status.is_success());

        let err = client
            .destroy_persistence_context(completion.context)
            .unwrap_err();
        assert!(matches!(err, Error::HandleInvalid(_)));
    }

    #[test]
    fn test_destroy_null_context_is_local_error() {
        let client = client_with(MockRuntime::builder().build());
        let err = client
            .destroy_persistence_context(PersistenceContextHandle::NULL)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(
            client.destroy_persistence_context_raw(PersistenceContextHandle::NULL),
            NativeResult::VALIDATION_FAILURE
        );
    }

    #[test]
    fn test_enumerate_scopes() {
        let client = client_with(
            MockRuntime::builder()
                .scopes(vec![PersistenceScope::SystemManaged, PersistenceScope::LocalAnchors])
                .build(),
        );
        let (status, scopes) = client.enumerate_persistence_scopes().unwrap();
        assert!(status.is_success());
        assert_eq!(
            scopes,
            vec![PersistenceScope::SystemManaged, PersistenceScope::LocalAnchors]
        );
    }

    #[test]
    fn test_enumerate_scopes_capacity_query() {
        let client = client_with(MockRuntime::builder().build());
        let mut count = 0u32;
        let code = client.enumerate_persistence_scopes_raw(
            InstanceHandle::from_raw(1),
            SystemId(1),
            &mut [],
            &mut count,
        );
        assert!(code.is_success());
        assert_eq!(count, 2);
    }
}
