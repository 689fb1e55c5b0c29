//! Pooled network buffers and the zero-copy slices carved from them.
//!
//! A [`NetworkBuffer`] holds bytes read from the transport that the parser
//! has not consumed yet. When the parser hands part of those bytes to the
//! application it splits them off as a [`BufferSlice`], which shares the
//! allocation through `bytes` reference counting and holds a lease on the
//! buffer. While any lease is alive the buffer reports itself as
//! [retained](NetworkBuffer::is_retained) and pools must not recycle it.

use std::{fmt, io, ops::Deref, sync::Arc};

use bytes::{Buf, Bytes, BytesMut};

mod pool;

pub use pool::{DefaultBufferPool, PoolStats};

/// Source of network buffers shared by every stream of a connection.
///
/// Implementations must be internally synchronised: streams acquire and
/// release buffers concurrently.
pub trait BufferPool: Send + Sync {
    /// Obtain an empty buffer able to hold `size` bytes.
    fn acquire(&self, size: usize, direct: bool) -> NetworkBuffer;

    /// Return a buffer to the pool.
    ///
    /// Retained buffers must not be handed out again; their storage is freed
    /// once the last outstanding [`BufferSlice`] drops.
    fn release(&self, buffer: NetworkBuffer);
}

#[derive(Debug)]
struct Lease;

/// Buffer of received, not yet parsed bytes.
pub struct NetworkBuffer {
    bytes: BytesMut,
    capacity: usize,
    direct: bool,
    lease: Arc<Lease>,
}

impl NetworkBuffer {
    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize, direct: bool) -> Self {
        Self::from_storage(BytesMut::with_capacity(capacity), capacity, direct)
    }

    /// Wrap recycled storage, discarding whatever it contained.
    #[must_use]
    pub fn from_storage(mut storage: BytesMut, capacity: usize, direct: bool) -> Self {
        storage.clear();
        Self {
            bytes: storage,
            capacity,
            direct,
            lease: Arc::new(Lease),
        }
    }

    /// Create a buffer outside any pool that already holds `content`.
    #[must_use]
    pub fn unpooled(content: &[u8]) -> Self {
        let mut buffer = Self::new(content.len(), false);
        buffer.bytes.extend_from_slice(content);
        buffer
    }

    /// Nominal capacity requested from the pool.
    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Whether the buffer came from the direct bucket.
    #[must_use]
    pub fn is_direct(&self) -> bool { self.direct }

    /// Number of unconsumed bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Whether no unconsumed bytes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Whether unconsumed bytes remain.
    #[must_use]
    pub fn has_remaining(&self) -> bool { !self.bytes.is_empty() }

    /// Room left for the next fill.
    #[must_use]
    pub fn space(&self) -> usize { self.capacity.saturating_sub(self.bytes.len()) }

    /// Whether slices carved from this buffer are still alive.
    #[must_use]
    pub fn is_retained(&self) -> bool { Arc::strong_count(&self.lease) > 1 }

    /// Discard all unconsumed bytes.
    pub fn clear(&mut self) { self.bytes.clear(); }

    /// Copy as much of `src` as fits, returning the number of bytes copied.
    pub fn fill_from(&mut self, src: &[u8]) -> usize {
        let count = src.len().min(self.space());
        self.bytes.extend_from_slice(&src[..count]);
        count
    }

    /// Let `read` write directly into the free space.
    ///
    /// `read` receives a zeroed slice of [`space`](Self::space) bytes and
    /// returns how many it filled.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `read`; the buffer is left unchanged.
    pub fn fill_with<F>(&mut self, read: F) -> io::Result<usize>
    where
        F: FnOnce(&mut [u8]) -> io::Result<usize>,
    {
        let start = self.bytes.len();
        let space = self.space();
        self.bytes.resize(start + space, 0);
        let result = read(&mut self.bytes[start..]);
        let filled = match &result {
            Ok(count) => (*count).min(space),
            Err(_) => 0,
        };
        self.bytes.truncate(start + filled);
        result.map(|_| filled)
    }

    /// Consume the first `len` bytes as a slice that keeps this buffer
    /// retained for as long as it lives.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`len`](Self::len).
    #[must_use]
    pub fn split_slice(&mut self, len: usize) -> BufferSlice {
        BufferSlice {
            bytes: self.bytes.split_to(len).freeze(),
            lease: Some(Arc::clone(&self.lease)),
        }
    }

    /// Take back the storage for reuse.
    ///
    /// Returns `None` when the buffer is retained, in which case the storage
    /// must not be handed to another stream.
    #[must_use]
    pub fn recycle(self) -> Option<BytesMut> {
        if self.is_retained() {
            return None;
        }
        let mut storage = self.bytes;
        storage.clear();
        Some(storage)
    }
}

impl Buf for NetworkBuffer {
    fn remaining(&self) -> usize { self.bytes.len() }

    fn chunk(&self) -> &[u8] { &self.bytes }

    fn advance(&mut self, cnt: usize) { self.bytes.advance(cnt); }
}

impl fmt::Debug for NetworkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkBuffer")
            .field("remaining", &self.bytes.len())
            .field("capacity", &self.capacity)
            .field("direct", &self.direct)
            .field("retained", &self.is_retained())
            .finish()
    }
}

/// Zero-copy view of bytes that were received into a [`NetworkBuffer`].
///
/// Cloning a slice retains the originating buffer again; dropping the last
/// clone releases it.
#[derive(Clone)]
pub struct BufferSlice {
    bytes: Bytes,
    lease: Option<Arc<Lease>>,
}

impl BufferSlice {
    /// Wrap bytes that are not tied to any network buffer.
    #[must_use]
    pub fn detached(bytes: Bytes) -> Self { Self { bytes, lease: None } }

    /// An empty slice.
    #[must_use]
    pub fn empty() -> Self { Self::detached(Bytes::new()) }

    /// Borrow the underlying bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes { &self.bytes }

    /// Whether this slice keeps a network buffer retained.
    #[must_use]
    pub fn is_leased(&self) -> bool { self.lease.is_some() }

    /// Consume the slice, keeping only the shared bytes.
    ///
    /// The originating buffer stops counting as retained, but the bytes stay
    /// valid for as long as the returned value lives.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.bytes }
}

impl Deref for BufferSlice {
    type Target = [u8];

    fn deref(&self) -> &Self::Target { &self.bytes }
}

impl AsRef<[u8]> for BufferSlice {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

impl PartialEq for BufferSlice {
    fn eq(&self, other: &Self) -> bool { self.bytes == other.bytes }
}

impl Eq for BufferSlice {}

impl fmt::Debug for BufferSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSlice")
            .field("len", &self.bytes.len())
            .field("leased", &self.lease.is_some())
            .finish()
    }
}
