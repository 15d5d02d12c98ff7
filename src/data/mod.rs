//! Data module: ordered containers, coordinates and fallible allocation
#![warn(missing_docs)]

pub mod alloc;
pub mod coordinates;
pub mod ordered_list;
pub mod ordered_set;

pub use crate::debug_invariants::DebugInvariants;

pub use coordinates::Coordinates;
pub use ordered_list::OrderedDataList;
pub use ordered_set::OrderedSet;
