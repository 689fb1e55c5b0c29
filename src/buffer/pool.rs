//! Bounded free-list pool used when the embedding stack supplies none.

use std::{collections::HashMap, sync::PoisonError};
#[cfg(not(loom))]
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use bytes::BytesMut;
#[cfg(loom)]
use loom::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{BufferPool, NetworkBuffer};

type BucketKey = (usize, bool);

/// Snapshot of pool accounting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers handed out by [`BufferPool::acquire`].
    pub acquired: usize,
    /// Buffers given back through [`BufferPool::release`].
    pub released: usize,
    /// Released buffers that were retained and therefore not recycled.
    pub discarded: usize,
    /// Idle buffers currently held for reuse.
    pub idle: usize,
}

impl PoolStats {
    /// Buffers acquired and not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize { self.acquired.saturating_sub(self.released) }
}

/// Pool keeping up to `max_idle_per_bucket` idle buffers per
/// `(capacity, direct)` pair.
///
/// # Examples
///
/// ```
/// use h3pump::buffer::{BufferPool, DefaultBufferPool};
///
/// let pool = DefaultBufferPool::new(4);
/// let buffer = pool.acquire(1024, true);
/// assert_eq!(buffer.capacity(), 1024);
/// pool.release(buffer);
///
/// let stats = pool.stats();
/// assert_eq!(stats.outstanding(), 0);
/// assert_eq!(stats.idle, 1);
/// ```
#[derive(Debug)]
pub struct DefaultBufferPool {
    max_idle_per_bucket: usize,
    buckets: Mutex<HashMap<BucketKey, Vec<BytesMut>>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    discarded: AtomicUsize,
}

impl DefaultBufferPool {
    /// Create a pool that keeps at most `max_idle_per_bucket` idle buffers of
    /// each size.
    #[must_use]
    pub fn new(max_idle_per_bucket: usize) -> Self {
        Self {
            max_idle_per_bucket,
            buckets: Mutex::new(HashMap::new()),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    /// Current accounting snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let idle = self
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum();
        PoolStats {
            acquired: self.acquired.load(Ordering::Acquire),
            released: self.released.load(Ordering::Acquire),
            discarded: self.discarded.load(Ordering::Acquire),
            idle,
        }
    }
}

impl Default for DefaultBufferPool {
    fn default() -> Self { Self::new(64) }
}

impl BufferPool for DefaultBufferPool {
    fn acquire(&self, size: usize, direct: bool) -> NetworkBuffer {
        let recycled = self
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&(size, direct))
            .and_then(Vec::pop);
        self.acquired.fetch_add(1, Ordering::AcqRel);
        match recycled {
            Some(storage) => NetworkBuffer::from_storage(storage, size, direct),
            None => NetworkBuffer::new(size, direct),
        }
    }

    fn release(&self, buffer: NetworkBuffer) {
        let key = (buffer.capacity(), buffer.is_direct());
        self.released.fetch_add(1, Ordering::AcqRel);
        let Some(storage) = buffer.recycle() else {
            self.discarded.fetch_add(1, Ordering::AcqRel);
            return;
        };
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets.entry(key).or_default();
        if bucket.len() < self.max_idle_per_bucket {
            bucket.push(storage);
        }
    }
}
