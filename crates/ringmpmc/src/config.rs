/// Configuration for a [`RingBuffer`](crate::RingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Requested slot count; rounded up to the next power of two (minimum 1)
    pub capacity: usize,
    /// Bytes per payload chunk
    pub chunk_size: usize,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(capacity: usize, chunk_size: usize, enable_metrics: bool) -> Self {
        Self {
            capacity,
            chunk_size,
            enable_metrics,
        }
    }

    /// Returns the effective slot count: the smallest power of two ≥ `capacity`.
    ///
    /// Requesting 0 or 1 slot yields 1. `None` if that power of two does not
    /// fit in `usize`.
    #[inline]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity.checked_next_power_of_two()
    }

    /// Returns the mask for index wrapping, `None` when
    /// [`capacity`](Self::capacity) is.
    #[inline]
    pub const fn mask(&self) -> Option<usize> {
        match self.capacity() {
            Some(capacity) => Some(capacity - 1),
            None => None,
        }
    }

    /// Returns the number of `i16` lanes in each slot's secondary view.
    ///
    /// A chunk smaller than one lane still gets a single lane.
    #[inline]
    pub const fn lanes_per_chunk(&self) -> usize {
        let lanes = self.chunk_size / std::mem::size_of::<i16>();
        if lanes == 0 {
            1
        } else {
            lanes
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 8,
            chunk_size: 64,
            enable_metrics: false,
        }
    }
}

/// Low latency configuration (64 slots of one cache line each)
pub const LOW_LATENCY_CONFIG: Config = Config::new(64, 64, false);

/// High throughput configuration (4K slots of 4 KiB pages)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(4096, 4096, false);
