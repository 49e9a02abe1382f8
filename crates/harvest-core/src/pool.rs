//! Allocation-amortizing pools for hot-path objects.
//!
//! A [`Pooled`] guard hands the object back to its pool on drop, reset and
//! ready for the next borrower. Consumers must not stash references past the
//! guard's lifetime; the borrow checker enforces that for us.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

/// An object that can be recycled through an [`ObjectPool`].
pub trait Poolable: Send {
    /// Clear all state, preparing the instance for reuse.
    fn reset(&mut self);
}

/// A process-wide pool of reusable instances, safe for parallel get/release.
pub struct ObjectPool<T: Poolable> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Poolable> Clone for ObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: Poolable + Default> ObjectPool<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Borrow an instance, creating a fresh one when the pool is empty.
    pub fn get(&self) -> Pooled<T> {
        let item = self.lock().pop().unwrap_or_default();
        Pooled {
            item: Some(item),
            items: Arc::clone(&self.items),
        }
    }

    /// Number of idle instances currently held.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Poolable + Default> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard over a pooled instance; returns it reset on drop.
pub struct Pooled<T: Poolable> {
    item: Option<T>,
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Poolable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect("pooled item already released")
    }
}

impl<T: Poolable> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pooled item already released")
    }
}

impl<T: Poolable> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(mut item) = self.item.take() {
            item.reset();
            let mut items = self
                .items
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            items.push(item);
        }
    }
}
