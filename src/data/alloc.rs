//! Fallible buffer allocation.
//!
//! Mesh containers grow one entry at a time and are sized from counts that come
//! from external input. These helpers translate allocation failure into
//! [`MeshError::Allocation`] instead of aborting, so callers can tell a memory
//! problem apart from a logic error.

use crate::mesh_error::MeshError;

/// Allocate a vector of `count` copies of `value`.
///
/// A zero count yields an empty vector without allocating. A negative count is
/// tolerated with a warning and treated as zero.
pub fn try_filled<T: Clone>(
    what: &'static str,
    count: isize,
    value: T,
) -> Result<Vec<T>, MeshError> {
    if count < 0 {
        log::warn!("{what}: requested allocation of negative size {count}, treating as zero");
        return Ok(Vec::new());
    }
    let count = count as usize;
    let mut out = Vec::new();
    if count == 0 {
        return Ok(out);
    }
    out.try_reserve_exact(count)
        .map_err(|_| MeshError::Allocation {
            what,
            requested: count,
        })?;
    out.resize(count, value);
    Ok(out)
}

/// Reserve room for `additional` more entries in `buf`.
#[inline]
pub fn try_grow<T>(
    what: &'static str,
    buf: &mut Vec<T>,
    additional: usize,
) -> Result<(), MeshError> {
    buf.try_reserve_exact(additional)
        .map_err(|_| MeshError::Allocation {
            what,
            requested: buf.len().saturating_add(additional),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_are_empty() {
        assert!(try_filled("test", 0, 1.0).unwrap().is_empty());
        assert!(try_filled("test", -4, 1.0).unwrap().is_empty());
    }

    #[test]
    fn filled_has_requested_len() {
        let v = try_filled("test", 3, 7u8).unwrap();
        assert_eq!(v, vec![7, 7, 7]);
    }

    #[test]
    fn impossible_request_is_allocation_error() {
        let mut buf: Vec<u64> = Vec::new();
        let err = try_grow("test", &mut buf, usize::MAX).unwrap_err();
        assert!(matches!(err, MeshError::Allocation { what: "test", .. }));
    }
}
