use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// The voxel world hands its chunks out as `MtResource<Chunk>` so that
/// obstruction queries on several worker threads can read the same chunk
/// at once while world edits take the write side.
///
/// A panic on a worker while a guard is held poisons the lock; the guard
/// accessors recover the inner value instead of propagating the poison,
/// because the data a path job reads is never left half-written by a reader.
///
/// # Examples
///
/// ```
/// use voxel_pathfinder::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(*counter.get(), 1);
/// ```
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Wraps `resource` for shared access.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard. Any number of readers may hold one concurrently.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an exclusive write guard.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `self` and `other` share the same underlying value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
