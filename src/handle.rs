//! Opaque runtime handles.
//!
//! Every object owned by the native runtime is addressed through an opaque
//! 64-bit handle. Handles carry no payload and are meaningful only within
//! the instance or session that issued them. The zero value is the null
//! handle and never refers to a live object.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The null handle.
            pub const NULL: Self = Self(0);

            /// Wrap a raw handle value issued by the runtime.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw handle value.
            pub const fn raw(self) -> u64 {
                self.0
            }

            /// `true` if this is the null handle.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.0)
            }
        }
    };
}

handle_type! {
    /// A runtime instance: the root object all other handles are scoped to.
    InstanceHandle
}

handle_type! {
    /// A running session within an instance.
    SessionHandle
}

handle_type! {
    /// A pending or completed asynchronous operation.
    ///
    /// A future is created only by an initiation operation and invalidated
    /// only by a successful cancel or a successful completion. Exactly one
    /// logical owner is responsible for eventually doing one of the two;
    /// a handle left untouched forever leaks resources on the native side.
    /// The handle is not safe for unsynchronized concurrent use: if it is
    /// shared across threads, the caller must provide mutual exclusion.
    FutureHandle
}

handle_type! {
    /// A persistence context, through which entities are persisted across
    /// sessions. Returned by the create-context completion payload; the
    /// caller owns it and must eventually destroy it.
    PersistenceContextHandle
}

handle_type! {
    /// A spatial context tracking entities in the user's surroundings.
    SpatialContextHandle
}

handle_type! {
    /// A spatial entity, such as an anchor, within a spatial context.
    EntityHandle
}

handle_type! {
    /// A reference space that poses are expressed relative to.
    SpaceHandle
}

/// Identifier of a spatial entity, stable within its spatial context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

/// Identifier of the hardware system an instance is bound to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SystemId(pub u64);

/// A 128-bit identifier assigned to a persisted entity.
///
/// Stable across sessions and devices within a persistence scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Uuid {
    pub data_part_1: u64,
    pub data_part_2: u64,
}

impl Uuid {
    /// The all-zero UUID, never assigned to a persisted entity.
    pub const EMPTY: Self = Self {
        data_part_1: 0,
        data_part_2: 0,
    };

    /// Construct from the two 64-bit halves.
    pub const fn new(data_part_1: u64, data_part_2: u64) -> Self {
        Self {
            data_part_1,
            data_part_2,
        }
    }

    /// `true` if this is the all-zero UUID.
    pub const fn is_empty(self) -> bool {
        self.data_part_1 == 0 && self.data_part_2 == 0
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}-{:016X}", self.data_part_1, self.data_part_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(FutureHandle::NULL.is_null());
        assert!(!FutureHandle::from_raw(1).is_null());
        assert_eq!(FutureHandle::default(), FutureHandle::NULL);
    }

    #[test]
    fn test_raw_roundtrip() {
        let handle = PersistenceContextHandle::from_raw(0xDEAD_BEEF);
        assert_eq!(handle.raw(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(
            FutureHandle::from_raw(0xAB).to_string(),
            "FutureHandle(0xab)"
        );
    }

    #[test]
    fn test_uuid_display_and_empty() {
        assert!(Uuid::EMPTY.is_empty());
        let uuid = Uuid::new(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210);
        assert!(!uuid.is_empty());
        assert_eq!(uuid.to_string(), "0123456789ABCDEF-FEDCBA9876543210");
    }
}
