//! Per-stream pump configuration.

/// Smallest input buffer the pump will request from the pool.
///
/// Values passed to [`StreamConfig::input_buffer_size`] are clamped to at
/// least this so a frame header always fits.
pub const MIN_INPUT_BUFFER_SIZE: usize = 64;

/// Largest input buffer the pump will request from the pool (1 MiB).
pub const MAX_INPUT_BUFFER_SIZE: usize = 1024 * 1024;

const DEFAULT_INPUT_BUFFER_SIZE: usize = 16 * 1024;
const DEFAULT_MAX_HEADER_BLOCK_SIZE: usize = 64 * 1024;

/// Settings applied to every [`StreamConnection`](crate::connection::StreamConnection).
///
/// # Examples
///
/// ```
/// use h3pump::config::StreamConfig;
///
/// let config = StreamConfig::default()
///     .input_buffer_size(4096)
///     .use_input_direct_buffers(false)
///     .max_header_block_size(8192);
///
/// assert_eq!(config.input_buffer_size, 4096);
/// assert!(!config.use_input_direct_buffers);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Capacity of each network buffer acquired from the pool.
    ///
    /// Default: 16 KiB.
    pub input_buffer_size: usize,

    /// Whether network buffers should come from the pool's direct bucket.
    ///
    /// Default: true.
    pub use_input_direct_buffers: bool,

    /// Largest encoded header block accepted in a single HEADERS frame.
    ///
    /// Default: 64 KiB.
    pub max_header_block_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            input_buffer_size: DEFAULT_INPUT_BUFFER_SIZE,
            use_input_direct_buffers: true,
            max_header_block_size: DEFAULT_MAX_HEADER_BLOCK_SIZE,
        }
    }
}

impl StreamConfig {
    /// Set the network buffer capacity, clamped to
    /// [`MIN_INPUT_BUFFER_SIZE`]..=[`MAX_INPUT_BUFFER_SIZE`].
    #[must_use]
    pub fn input_buffer_size(mut self, size: usize) -> Self {
        self.input_buffer_size = size.clamp(MIN_INPUT_BUFFER_SIZE, MAX_INPUT_BUFFER_SIZE);
        self
    }

    /// Choose direct or heap network buffers.
    #[must_use]
    pub fn use_input_direct_buffers(mut self, enabled: bool) -> Self {
        self.use_input_direct_buffers = enabled;
        self
    }

    /// Set the largest accepted header block.
    #[must_use]
    pub fn max_header_block_size(mut self, size: usize) -> Self {
        self.max_header_block_size = size;
        self
    }
}
