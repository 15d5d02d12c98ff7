//! Cache invalidation for derived mesh data.

/// Anything that caches geometry derived from node coordinates (face normals,
/// centroids, lengths) implements this so a mesh edit can force recomputation.
pub trait InvalidateCache {
    /// Mark every cached value stale so the next query recomputes it.
    fn invalidate_cache(&mut self);
}

impl<T: InvalidateCache> InvalidateCache for [T] {
    fn invalidate_cache(&mut self) {
        for item in self {
            item.invalidate_cache();
        }
    }
}
