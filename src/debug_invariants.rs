//! Invariant checking shared by the ordered containers and the mesh.

use std::fmt::Display;

use crate::mesh_error::MeshError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshError>;
}

/// Run a fallible check and panic with context when invariant checking is
/// enabled (debug builds, `check-invariants` or `strict-invariants`).
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

/// Check that `values` is sorted ascending, strictly unless `allow_repeat`.
///
/// `what` names the container in the error message.
pub fn ensure_sorted<T>(values: &[T], allow_repeat: bool, what: &str) -> Result<(), MeshError>
where
    T: Ord + Display,
{
    for (rank, pair) in values.windows(2).enumerate() {
        let ordered = if allow_repeat {
            pair[0] <= pair[1]
        } else {
            pair[0] < pair[1]
        };
        if !ordered {
            return Err(MeshError::Logic(format!(
                "{what} out of order at rank {rank}: {} then {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_and_repeat_modes() {
        assert!(ensure_sorted(&[1, 2, 5], false, "set").is_ok());
        assert!(ensure_sorted(&[1, 2, 2], false, "set").is_err());
        assert!(ensure_sorted(&[1, 2, 2], true, "set").is_ok());
        let err = ensure_sorted(&[3, 1], true, "stack").unwrap_err();
        assert_eq!(err.to_string(), "logic error: stack out of order at rank 0: 3 then 1");
    }

    #[test]
    fn empty_and_single_are_sorted() {
        let empty: [i64; 0] = [];
        assert!(ensure_sorted(&empty, false, "set").is_ok());
        assert!(ensure_sorted(&[9], false, "set").is_ok());
    }
}
