//! The native call boundary.
//!
//! Every protocol operation reaches the runtime through [`NativeShim`]: a
//! single dispatch point keyed by entry-point name, taking an encoded
//! request record and filling an encoded response record. Calls are direct,
//! synchronous, and non-blocking; the runtime advances pending work through
//! its own mechanisms, never through this boundary.
//!
//! Production deployments implement [`NativeShim`] over the platform
//! loader; tests use [`MockRuntime`](crate::mock::MockRuntime). Because the
//! shim is an explicit object rather than process-global state, independent
//! runtimes can coexist in one process.

use crate::status::NativeResult;

/// Entry-point names understood by a conforming runtime.
///
/// The `_async` suffix marks initiation operations that return a future;
/// each has a matching `_complete` entry that consumes a ready future.
pub mod entry {
    /// Poll the state of a future.
    pub const POLL_FUTURE: &str = "future.poll";
    /// Cancel a future and signal the async work is not required.
    pub const CANCEL_FUTURE: &str = "future.cancel";
    /// Begin creating a persistence context.
    pub const CREATE_CONTEXT_ASYNC: &str = "persistence.create_context_async";
    /// Retrieve the result of persistence-context creation.
    pub const CREATE_CONTEXT_COMPLETE: &str = "persistence.create_context_complete";
    /// Destroy a persistence context returned by a completion payload.
    pub const DESTROY_CONTEXT: &str = "persistence.destroy_context";
    /// Enumerate the persistence scopes the system supports.
    pub const ENUMERATE_SCOPES: &str = "persistence.enumerate_scopes";
    /// Begin persisting a spatial entity.
    pub const PERSIST_ENTITY_ASYNC: &str = "entity.persist_async";
    /// Retrieve the result of an entity persist.
    pub const PERSIST_ENTITY_COMPLETE: &str = "entity.persist_complete";
    /// Begin unpersisting a previously persisted entity.
    pub const UNPERSIST_ENTITY_ASYNC: &str = "entity.unpersist_async";
    /// Retrieve the result of an entity unpersist.
    pub const UNPERSIST_ENTITY_COMPLETE: &str = "entity.unpersist_complete";
    /// Create a spatial anchor (synchronous).
    pub const CREATE_ANCHOR: &str = "anchor.create";
}

/// A connection to a native runtime.
///
/// `invoke` dispatches one operation: `request` holds the encoded input
/// records for `entry`, and on a successful return code `response` holds
/// the encoded output records. On an error code the response contents are
/// unspecified and must not be decoded.
pub trait NativeShim: Send + Sync {
    fn invoke(&self, entry: &str, request: &[u8], response: &mut Vec<u8>) -> NativeResult;
}
