//! The single network buffer a pump may hold.

use std::sync::Arc;

use tracing::trace;

use crate::{
    buffer::{BufferPool, NetworkBuffer},
    metrics,
};

pub(super) struct BufferSlot {
    pool: Arc<dyn BufferPool>,
    size: usize,
    direct: bool,
    buffer: Option<NetworkBuffer>,
}

impl BufferSlot {
    pub(super) fn new(pool: Arc<dyn BufferPool>, size: usize, direct: bool) -> Self {
        Self {
            pool,
            size,
            direct,
            buffer: None,
        }
    }

    /// The held buffer, acquiring one first if none is held.
    pub(super) fn held(&mut self) -> &mut NetworkBuffer {
        let Self {
            pool,
            size,
            direct,
            buffer,
        } = self;
        buffer.get_or_insert_with(|| {
            let acquired = pool.acquire(*size, *direct);
            metrics::inc_buffers_held();
            trace!(buffer = ?acquired, "acquired network buffer");
            acquired
        })
    }

    pub(super) fn acquire(&mut self) { self.held(); }

    /// Return the buffer to the pool once it is drained.
    ///
    /// `force` discards unconsumed bytes first.
    pub(super) fn release(&mut self, force: bool) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        if force && buffer.has_remaining() {
            buffer.clear();
        }
        if buffer.has_remaining() {
            return;
        }
        if let Some(buffer) = self.buffer.take() {
            self.give_back(buffer);
        }
    }

    /// Swap a retained buffer for a fresh one.
    ///
    /// Only called once the parser has consumed every byte, so nothing is
    /// lost by the swap.
    pub(super) fn replace_if_retained(&mut self) {
        if !self.buffer.as_ref().is_some_and(NetworkBuffer::is_retained) {
            return;
        }
        if let Some(retained) = self.buffer.take() {
            trace!(buffer = ?retained, "replacing retained network buffer");
            self.give_back(retained);
        }
        self.acquire();
    }

    pub(super) fn is_held(&self) -> bool { self.buffer.is_some() }

    pub(super) fn has_remaining(&self) -> bool {
        self.buffer.as_ref().is_some_and(NetworkBuffer::has_remaining)
    }

    fn give_back(&self, buffer: NetworkBuffer) {
        trace!(buffer = ?buffer, "released network buffer");
        self.pool.release(buffer);
        metrics::dec_buffers_held();
    }
}

impl Drop for BufferSlot {
    fn drop(&mut self) { self.release(true); }
}
