//! Ambient scope resolution.
//!
//! Context-shaped operations omit the instance or session parameter and
//! resolve it from the caller's ambient context instead. Resolution is a
//! capability injected into the client, not a process-wide global, so tests
//! and multi-runtime hosts can each carry their own.

use std::sync::RwLock;

use crate::handle::{InstanceHandle, SessionHandle, SystemId};

/// Resolves the "current" runtime scope for context-shaped calls.
pub trait ContextResolver: Send + Sync {
    /// The instance futures and scope queries are directed at, if any.
    fn current_instance(&self) -> Option<InstanceHandle>;

    /// The session async initiations are directed at, if any.
    fn current_session(&self) -> Option<SessionHandle>;

    /// The hardware system the instance is bound to, if known.
    fn current_system(&self) -> Option<SystemId>;
}

#[derive(Debug, Default, Clone, Copy)]
struct Scopes {
    instance: Option<InstanceHandle>,
    session: Option<SessionHandle>,
    system: Option<SystemId>,
}

/// Default resolver for hosts with a single active runtime.
///
/// Starts empty; the host sets the scopes as the runtime comes up and
/// clears them when it is lost.
#[derive(Debug, Default)]
pub struct AmbientContext {
    scopes: RwLock<Scopes>,
}

impl AmbientContext {
    /// Create an empty context with no live scopes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with instance, session, and system already live.
    pub fn with_scopes(instance: InstanceHandle, session: SessionHandle, system: SystemId) -> Self {
        Self {
            scopes: RwLock::new(Scopes {
                instance: Some(instance),
                session: Some(session),
                system: Some(system),
            }),
        }
    }

    /// Record the current instance. `None` marks it lost.
    pub fn set_instance(&self, instance: Option<InstanceHandle>) {
        self.write().instance = instance;
    }

    /// Record the current session. `None` marks it lost.
    pub fn set_session(&self, session: Option<SessionHandle>) {
        self.write().session = session;
    }

    /// Record the current system id.
    pub fn set_system(&self, system: Option<SystemId>) {
        self.write().system = system;
    }

    /// Clear every scope, as on runtime shutdown.
    pub fn clear(&self) {
        *self.write() = Scopes::default();
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Scopes> {
        // Lock poisoning only occurs if a writer panicked; the scope data
        // is still coherent, so recover the guard.
        self.scopes.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> Scopes {
        *self.scopes.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl ContextResolver for AmbientContext {
    fn current_instance(&self) -> Option<InstanceHandle> {
        self.read().instance
    }

    fn current_session(&self) -> Option<SessionHandle> {
        self.read().session
    }

    fn current_system(&self) -> Option<SystemId> {
        self.read().system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let ctx = AmbientContext::new();
        assert_eq!(ctx.current_instance(), None);
        assert_eq!(ctx.current_session(), None);
        assert_eq!(ctx.current_system(), None);
    }

    #[test]
    fn test_set_and_clear() {
        let ctx = AmbientContext::new();
        ctx.set_instance(Some(InstanceHandle::from_raw(1)));
        ctx.set_session(Some(SessionHandle::from_raw(2)));
        ctx.set_system(Some(SystemId(3)));

        assert_eq!(ctx.current_instance(), Some(InstanceHandle::from_raw(1)));
        assert_eq!(ctx.current_session(), Some(SessionHandle::from_raw(2)));
        assert_eq!(ctx.current_system(), Some(SystemId(3)));

        ctx.clear();
        assert_eq!(ctx.current_instance(), None);
        assert_eq!(ctx.current_session(), None);
    }

    #[test]
    fn test_with_scopes() {
        let ctx = AmbientContext::with_scopes(
            InstanceHandle::from_raw(10),
            SessionHandle::from_raw(20),
            SystemId(30),
        );
        assert_eq!(ctx.current_instance(), Some(InstanceHandle::from_raw(10)));
    }
}
