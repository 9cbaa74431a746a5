use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide unique id generator.
static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A resource wrapper carrying a unique identity.
///
/// wgpu resources compare by opaque internals, so the bind-group cache keys
/// on these ids instead: two `Tracked` values never share an id, and a
/// rebuilt texture view (e.g. after a scratch reallocation) gets a fresh id,
/// which is exactly what invalidates stale bind groups.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    inner: T,
    id: u64,
}

impl<T> Tracked<T> {
    /// Wraps a resource and assigns it a new id.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            id: next_id(),
        }
    }

    /// Unique id, used as a cache key.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

// Direct access to the wrapped resource's methods (e.g. `view.format()`).
impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
