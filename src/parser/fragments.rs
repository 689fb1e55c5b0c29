//! Reassembly of header blocks split across reads.

use bytes::{Bytes, BytesMut};

/// Accumulates the fragments of one encoded header block.
///
/// Storage is sized to the first fragment: exactly its length when it
/// completes the block, twice its length otherwise. When a later fragment
/// does not fit, storage is replaced by one of capacity `position + space`,
/// where `space` follows the same rule, and the stored bytes are carried
/// over.
///
/// # Examples
///
/// ```
/// use h3pump::parser::HeaderBlock;
///
/// let mut block = HeaderBlock::default();
/// block.append(b"abc", false);
/// assert_eq!(block.capacity(), 6);
/// block.append(b"de", true);
/// assert_eq!(&block.take()[..], b"abcde");
/// ```
#[derive(Debug, Default)]
pub struct HeaderBlock {
    storage: BytesMut,
    capacity: usize,
}

impl HeaderBlock {
    /// Store `fragment`; `last` marks the fragment that completes the block.
    pub fn append(&mut self, fragment: &[u8], last: bool) {
        let length = fragment.len();
        let space = if last { length } else { length.saturating_mul(2) };
        if self.capacity == 0 {
            self.storage = BytesMut::with_capacity(space);
            self.capacity = space;
        } else if self.capacity - self.storage.len() < length {
            let position = self.storage.len();
            let mut grown = BytesMut::with_capacity(position + space);
            grown.extend_from_slice(&self.storage);
            self.storage = grown;
            self.capacity = position + space;
        }
        self.storage.extend_from_slice(fragment);
    }

    /// Bytes stored so far.
    #[must_use]
    pub fn len(&self) -> usize { self.storage.len() }

    /// Whether no fragment is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.storage.is_empty() }

    /// Capacity chosen by the growth policy.
    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Hand over the reassembled block and reset for the next one.
    pub fn take(&mut self) -> Bytes {
        self.capacity = 0;
        std::mem::take(&mut self.storage).freeze()
    }
}
