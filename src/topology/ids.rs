//! Strong index handles for mesh entities.
//!
//! Nodes, elements and faces are stored in contiguous arrays and addressed by
//! position. Each kind gets its own `repr(transparent)` newtype so that an
//! element index cannot be passed where a face index is expected. Absent
//! references (a boundary neighbour, an unset face side) are `Option<Id>`.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wraps a raw array index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Returns the raw array index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }

        /// Prints only the raw index.
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl EntityId for $name {
            #[inline]
            fn index(self) -> usize {
                self.0
            }
        }
    };
}

/// Common view over the entity handles, used by code that walks any kind of
/// entity array (removal stacks, incidence maps).
pub trait EntityId: Copy + Ord + fmt::Display + From<usize> {
    /// Raw array index of the handle.
    fn index(self) -> usize;
}

entity_id!(
    /// Index of a node in the mesh coordinate array.
    NodeId
);
entity_id!(
    /// Index of an element in the mesh element array.
    ElementId
);
entity_id!(
    /// Index of a face in the mesh face array.
    FaceId
);
