//! Lazily grown output buffer backing transcoded views.

use log::debug;

/// Bytes added on top of a request before rounding.
pub const HEADROOM: usize = 257;

/// Allocation granularity of the scratch buffer.
pub const QUANTUM: usize = 256;

/// Capacity allocated for a request of `len` bytes.
///
/// Always a multiple of [`QUANTUM`] and strictly larger than `len`.
pub fn aligned_capacity(len: usize) -> usize {
    let padded = len.saturating_add(HEADROOM);
    padded - padded % QUANTUM
}

/// Reusable scratch memory owned by a single transcoder.
///
/// The buffer only ever grows. Growing discards the previous contents, so
/// bytes handed out by one call are never visible through the next.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
    reallocations: usize,
}

impl ScratchBuffer {
    /// Empty buffer; nothing is allocated until the first request
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer with room for `len` bytes already reserved
    pub fn with_capacity(len: usize) -> Self {
        let mut scratch = Self::new();
        if len > 0 {
            scratch.reserve(len);
        }
        scratch
    }

    /// Current usable size in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// How many times the buffer has been (re)allocated
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Make room for `len` bytes and hand back exactly that many.
    pub fn reserve(&mut self, len: usize) -> &mut [u8] {
        if len > self.buf.len() {
            let capacity = aligned_capacity(len);
            debug!(
                "growing scratch buffer from {} to {} bytes for a {} byte request",
                self.buf.len(),
                capacity,
                len
            );
            // Replace rather than resize: old contents must not be carried over.
            self.buf = vec![0; capacity];
            self.reallocations += 1;
        }
        &mut self.buf[..len]
    }
}
