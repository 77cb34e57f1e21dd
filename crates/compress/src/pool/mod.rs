//! Lending and reclaiming reusable buffers.
//!
//! A [`Pool`] keeps a bounded number of idle objects. [`Pool::rent`] hands one out wrapped in
//! a [`Pooled`] guard, and dropping the guard recycles the object and gives it back, so every
//! rented object is returned exactly once on every exit path, including errors and unwinding.
//!
//! The pool is a best-effort cache: when it is empty a new object is created, and when it is
//! full a returned object is simply dropped. A pool with `max_idle == 0` caches nothing.

mod config;

pub use config::PoolConfig;

use crate::buffer::SegmentedWriter;
use crossbeam::queue::ArrayQueue;
use once_cell::sync::Lazy;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::trace;

/// Objects that can be cleared before going back into a [`Pool`].
pub trait Recycle {
    fn recycle(&mut self);
}

impl Recycle for SegmentedWriter {
    fn recycle(&mut self) {
        self.reset();
    }
}

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
    }
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A thread-safe pool of idle `T`s.
pub struct Pool<T> {
    // `None` when nothing may be cached, `ArrayQueue` has no zero capacity
    idle: Option<ArrayQueue<T>>,
    factory: Factory<T>,
}

impl<T: Recycle> Pool<T> {
    /// Creates a pool keeping at most `max_idle` idle objects, `factory` builds new ones on demand.
    pub fn new<F>(max_idle: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let idle = (max_idle > 0).then(|| ArrayQueue::new(max_idle));
        Self { idle, factory: Box::new(factory) }
    }

    /// Takes an idle object, or creates one if the pool is empty.
    ///
    /// Concurrent callers never receive the same object: an object popped from the idle queue
    /// is moved into the returned guard.
    pub fn rent(self: &Arc<Self>) -> Pooled<T> {
        let item = match self.idle.as_ref().and_then(ArrayQueue::pop) {
            Some(item) => item,
            None => {
                trace!("pool is empty, create a new item");
                (self.factory)()
            }
        };
        Pooled { item: Some(item), pool: Arc::clone(self) }
    }

    /// Number of objects currently waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.as_ref().map_or(0, ArrayQueue::len)
    }

    pub fn max_idle(&self) -> usize {
        self.idle.as_ref().map_or(0, ArrayQueue::capacity)
    }

    fn give_back(&self, mut item: T) {
        let Some(idle) = &self.idle else {
            trace!("pool caches nothing, drop the returned item");
            return;
        };
        item.recycle();
        if idle.push(item).is_err() {
            trace!(max_idle = idle.capacity(), "pool is full, drop the returned item");
        }
    }
}

impl Pool<SegmentedWriter> {
    /// Creates a writer pool from `config`.
    pub fn from_config(config: &PoolConfig) -> Self {
        let initial_segment_size = config.initial_segment_size;
        let max_segment_size = config.max_segment_size;
        Self::new(config.max_idle, move || SegmentedWriter::with_segment_sizes(initial_segment_size, max_segment_size))
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle.as_ref().map_or(0, ArrayQueue::len))
            .field("max_idle", &self.idle.as_ref().map_or(0, ArrayQueue::capacity))
            .finish()
    }
}

/// An object rented from a [`Pool`], given back when dropped.
pub struct Pooled<T: Recycle> {
    item: Option<T>,
    pool: Arc<Pool<T>>,
}

impl<T: Recycle> Pooled<T> {
    /// Takes the object out of the guard, it will never go back to the pool.
    pub fn detach(mut self) -> T {
        // the item is only taken here or in drop
        self.item.take().unwrap_or_else(|| unreachable!("pooled item already taken"))
    }
}

impl<T: Recycle> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.item.as_ref().unwrap_or_else(|| unreachable!("pooled item already taken"))
    }
}

impl<T: Recycle> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().unwrap_or_else(|| unreachable!("pooled item already taken"))
    }
}

impl<T: Recycle> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.give_back(item);
        }
    }
}

impl<T: Recycle + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled").field("item", &self.item).finish_non_exhaustive()
    }
}

static WRITER_POOL: Lazy<Arc<Pool<SegmentedWriter>>> =
    Lazy::new(|| Arc::new(Pool::from_config(&PoolConfig::default())));

static BUFFER_POOL: Lazy<Arc<Pool<Vec<u8>>>> = Lazy::new(|| Arc::new(Pool::new(PoolConfig::default().max_idle, Vec::new)));

/// The process-wide writer pool, created on first use.
pub fn writer_pool() -> Arc<Pool<SegmentedWriter>> {
    Arc::clone(&WRITER_POOL)
}

/// The process-wide pool of contiguous destination buffers, created on first use.
pub fn buffer_pool() -> Arc<Pool<Vec<u8>>> {
    Arc::clone(&BUFFER_POOL)
}
