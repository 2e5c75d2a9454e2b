//! Client builder and call machinery.
//!
//! The [`ClientBuilder`] provides a fluent API for wiring a client to a
//! native shim and an ambient-context resolver. The [`Client`] then exposes
//! every protocol operation in two call shapes:
//!
//! - an *explicit-scope* form taking the owning instance or session and
//!   returning the raw native code with a C-style out record, and
//! - a *context* form that resolves the ambient scope, calls the explicit
//!   form, and wraps the raw code into a [`ResultStatus`], with payloads
//!   reachable only through the success arm.
//!
//! The per-operation methods live in the [`ops`](crate::ops) modules; this
//! module holds the shared dispatch and wrapping logic.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spatialrt_client::mock::MockRuntime;
//! use spatialrt_client::proto::future::FutureState;
//! use spatialrt_client::proto::persistence::PersistenceScope;
//! use spatialrt_client::Client;
//!
//! let client = Client::builder()
//!     .shim(Arc::new(MockRuntime::builder().ready_after(2).build()))
//!     .ambient_scopes(1, 1, 1)
//!     .build()
//!     .unwrap();
//!
//! let (_, future) = client
//!     .create_persistence_context_async(PersistenceScope::LocalAnchors)
//!     .unwrap();
//! let (_, poll) = client.poll_future(future).unwrap();
//! assert_eq!(poll.state, FutureState::Pending);
//! let (_, poll) = client.poll_future(future).unwrap();
//! assert_eq!(poll.state, FutureState::Ready);
//!
//! let (_, completion) = client.create_persistence_context_complete(future).unwrap();
//! assert!(completion.future_result.is_success());
//! ```

use std::sync::Arc;

use crate::context::{AmbientContext, ContextResolver};
use crate::error::{Error, Result};
use crate::handle::{InstanceHandle, SessionHandle, SystemId};
use crate::proto::{decode_from_slice, Decode};
use crate::shim::NativeShim;
use crate::status::{NativeResult, ResultStatus};

/// Builder for configuring and creating a protocol client.
pub struct ClientBuilder {
    shim: Option<Arc<dyn NativeShim>>,
    resolver: Option<Arc<dyn ContextResolver>>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            shim: None,
            resolver: None,
        }
    }

    /// Set the native shim the client dispatches through. Required.
    pub fn shim(mut self, shim: Arc<dyn NativeShim>) -> Self {
        self.shim = Some(shim);
        self
    }

    /// Inject a resolver for context-shaped calls.
    ///
    /// Defaults to an empty [`AmbientContext`], in which case context calls
    /// fail with [`Error::ProviderUninitialized`] until scopes are set.
    pub fn resolver(mut self, resolver: Arc<dyn ContextResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Convenience for single-runtime hosts: install an [`AmbientContext`]
    /// with the given raw instance, session, and system already live.
    pub fn ambient_scopes(self, instance: u64, session: u64, system: u64) -> Self {
        self.resolver(Arc::new(AmbientContext::with_scopes(
            InstanceHandle::from_raw(instance),
            SessionHandle::from_raw(session),
            SystemId(system),
        )))
    }

    /// Build the client.
    ///
    /// Fails with [`Error::InvalidArgument`] if no shim was provided.
    pub fn build(self) -> Result<Client> {
        let shim = self.shim.ok_or_else(|| Error::InvalidArgument {
            reason: "a native shim is required to build a client".to_owned(),
        })?;
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(AmbientContext::new()));
        Ok(Client { shim, resolver })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A client for one native runtime.
///
/// Cheap to clone; clones share the same shim and resolver.
#[derive(Clone)]
pub struct Client {
    shim: Arc<dyn NativeShim>,
    resolver: Arc<dyn ContextResolver>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The resolver used by context-shaped calls.
    pub fn resolver(&self) -> &dyn ContextResolver {
        self.resolver.as_ref()
    }

    /// Resolve the ambient instance or fail before any native call.
    pub(crate) fn instance_scope(&self) -> Result<InstanceHandle> {
        self.resolver
            .current_instance()
            .ok_or(Error::ProviderUninitialized { scope: "instance" })
    }

    /// Resolve the ambient session or fail before any native call.
    pub(crate) fn session_scope(&self) -> Result<SessionHandle> {
        self.resolver
            .current_session()
            .ok_or(Error::ProviderUninitialized { scope: "session" })
    }

    /// Resolve the ambient system id or fail before any native call.
    pub(crate) fn system_scope(&self) -> Result<SystemId> {
        self.resolver
            .current_system()
            .ok_or(Error::ProviderUninitialized { scope: "system" })
    }

    /// Dispatch one encoded operation through the shim.
    pub(crate) fn invoke(
        &self,
        entry: &'static str,
        request: &[u8],
        response: &mut Vec<u8>,
    ) -> NativeResult {
        response.clear();
        let code = self.shim.invoke(entry, request, response);
        if code.is_error() {
            tracing::debug!(entry, %code, "native call failed");
        }
        code
    }

    /// Dispatch and decode a single output record on success.
    ///
    /// A response the runtime claims succeeded but that fails to decode is
    /// reported as [`NativeResult::RUNTIME_FAILURE`], matching the stance
    /// that out records must not be read on error.
    pub(crate) fn invoke_decoding<T: Decode>(
        &self,
        entry: &'static str,
        request: &[u8],
        out: &mut T,
    ) -> NativeResult {
        let mut response = Vec::new();
        let code = self.invoke(entry, request, &mut response);
        if code.is_error() {
            return code;
        }
        match decode_from_slice::<T>(&response) {
            Ok(decoded) => {
                *out = decoded;
                code
            }
            Err(err) => {
                tracing::warn!(entry, %err, "malformed response record from runtime");
                NativeResult::RUNTIME_FAILURE
            }
        }
    }

    /// Dispatch an operation whose response is a single raw handle.
    pub(crate) fn invoke_u64(
        &self,
        entry: &'static str,
        request: &[u8],
        out: &mut u64,
    ) -> NativeResult {
        let mut response = Vec::new();
        let code = self.invoke(entry, request, &mut response);
        if code.is_error() {
            return code;
        }
        match crate::proto::Reader::new(&response).get_u64() {
            Ok(value) => {
                *out = value;
                code
            }
            Err(err) => {
                tracing::warn!(entry, %err, "malformed response record from runtime");
                NativeResult::RUNTIME_FAILURE
            }
        }
    }

    /// Wrap a raw native code into the two-tier status, classifying errors.
    pub(crate) fn wrap(&self, code: NativeResult) -> Result<ResultStatus> {
        if code.is_error() {
            Err(Error::from_native(code))
        } else {
            Ok(ResultStatus::from_native(code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRuntime;

    #[test]
    fn test_builder_requires_shim() {
        let err = Client::builder().build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_builder_with_defaults() {
        let client = Client::builder()
            .shim(Arc::new(MockRuntime::builder().build()))
            .build()
            .unwrap();

        // No ambient scopes yet: context resolution fails cleanly.
        let err = client.instance_scope().unwrap_err();
        assert!(matches!(
            err,
            Error::ProviderUninitialized { scope: "instance" }
        ));
    }

    #[test]
    fn test_ambient_scopes_shortcut() {
        let client = Client::builder()
            .shim(Arc::new(MockRuntime::builder().build()))
            .ambient_scopes(1, 2, 3)
            .build()
            .unwrap();

        assert_eq!(client.instance_scope().unwrap(), InstanceHandle::from_raw(1));
        assert_eq!(client.session_scope().unwrap(), SessionHandle::from_raw(2));
        assert_eq!(client.system_scope().unwrap(), SystemId(3));
    }

    #[test]
    fn test_wrap_classifies_errors() {
        let client = Client::builder()
            .shim(Arc::new(MockRuntime::builder().build()))
            .build()
            .unwrap();

        assert!(client.wrap(NativeResult::SUCCESS).is_ok());
        let status = client.wrap(NativeResult::LOSS_PENDING).unwrap();
        assert!(status.is_success());
        assert!(!status.is_unqualified_success());

        let err = client.wrap(NativeResult::FUTURE_INVALID).unwrap_err();
        assert!(matches!(err, Error::HandleInvalid(_)));
    }
}
