//! # spatialrt-client
//!
//! Rust client SDK for the spatial runtime's asynchronous operation
//! protocol.
//!
//! The runtime exposes long-running operations through opaque future
//! handles: an async call returns a future, the caller polls it until
//! Ready, then a completion call consumes it and yields the payload.
//! This crate wraps that protocol behind a typed [`Client`] that talks to
//! the runtime through a pluggable [`NativeShim`](shim::NativeShim).
//!
//! ## Call shapes
//!
//! Every operation comes in two shapes:
//!
//! - **Explicit-scope** (`*_raw`): takes the scope handle and out-params,
//!   returns the raw [`NativeResult`] code. Out-params are only valid to
//!   read on success.
//! - **Context-shaped**: resolves the scope from the client's ambient
//!   context and returns `Result<(ResultStatus, T)>`, so payloads are
//!   structurally unreadable on error.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use spatialrt_client::{Client, MockRuntime, PersistenceScope};
//!
//! # fn main() -> spatialrt_client::Result<()> {
//! let client = Client::builder()
//!     .shim(Arc::new(MockRuntime::builder().build()))
//!     .ambient_scopes(1, 1, 1)
//!     .build()?;
//!
//! let (_, future) = client.create_persistence_context_async(PersistenceScope::LocalAnchors)?;
//! client.poll_future(future)?;
//! let (_, completion) = client.create_persistence_context_complete(future)?;
//! assert!(completion.future_result.is_success());
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod handle;
pub mod mock;
pub mod ops;
pub mod proto;
pub mod shim;
pub mod status;
pub mod wait;

mod client;

pub use client::{Client, ClientBuilder};
pub use context::{AmbientContext, ContextResolver};
pub use error::{Error, Result};
pub use handle::{
    EntityHandle, EntityId, FutureHandle, InstanceHandle, PersistenceContextHandle, SessionHandle,
    SpaceHandle, SpatialContextHandle, SystemId, Uuid,
};
pub use mock::MockRuntime;
pub use ops::CreatedAnchor;
pub use proto::future::FutureState;
pub use proto::persistence::{ContextResult, PersistenceScope};
pub use shim::NativeShim;
pub use status::{NativeResult, ResultStatus, StatusCode};
pub use wait::{wait_ready, PollOptions};
