// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A growable byte buffer with explicit read/write cursors and a reserved
//! prepend region, for accumulating socket data and staging writes.

use alloc::vec::Vec;
use bytes::Bytes;
use core::fmt;
use tracing::trace;

#[cfg(all(feature = "std", unix))]
mod fd;


#[cfg(all(feature = "std", unix))]
pub use fd::SCRATCH_LEN;

/// Default size of the reserved prepend region
///
/// Eight bytes is enough for a length prefix or small framing header written
/// after the body.
pub const DEFAULT_HEAD_RESERVE: usize = 8;

/// Default initial size of the body region
pub const DEFAULT_BODY_SIZE: usize = 1024;

/// A growable byte buffer backed by one contiguous region
///
/// The region is split into three parts by two cursors and a fixed head
/// reservation:
///
/// ```text
/// | head_reserve | readable            | writable          |
/// 0          read_index           write_index          capacity
/// ```
///
/// Bytes are appended at `write_index` and consumed at `read_index`. Space
/// consumed by reads accumulates in front of `read_index` and is reclaimed
/// by compaction before the buffer ever reallocates. The head reservation is
/// kept free for [`prepend`](Self::prepend), so a header can be written after
/// the body without relocating it.
///
/// Invariant: `head_reserve <= read_index <= write_index <= capacity`,
/// where only [`prepend`](Self::prepend) may move `read_index` into the
/// head reservation.
pub struct GrowableBuffer {
    storage: Vec<u8>,
    head_reserve: usize,
    read_index: usize,
    write_index: usize,
}

impl fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("readable", &self.readable_bytes())
            .field("writable", &self.writable_bytes())
            .field("prependable", &self.prependable_bytes())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HEAD_RESERVE, DEFAULT_BODY_SIZE)
    }
}

impl GrowableBuffer {
    /// Creates a buffer with `head_reserve` bytes of prepend space and
    /// `body_size` bytes of initial body capacity
    ///
    /// Both cursors start at `head_reserve`: the buffer is empty and the
    /// full prepend region is available.
    #[inline]
    pub fn new(head_reserve: usize, body_size: usize) -> Self {
        let capacity = head_reserve + body_size;
        let mut storage = Vec::new();
        storage.resize(capacity, 0);

        Self {
            storage,
            head_reserve,
            read_index: head_reserve,
            write_index: head_reserve,
        }
    }

    /// Total allocated size of the backing region
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Size of the reserved prepend prefix
    #[inline]
    pub fn head_reserve(&self) -> usize {
        self.head_reserve
    }

    /// Bytes available for consumption, between the two cursors
    #[inline]
    pub fn readable_bytes(&self) -> usize {
        self.write_index - self.read_index
    }

    /// Bytes available for appending, after `write_index`
    #[inline]
    pub fn writable_bytes(&self) -> usize {
        self.capacity() - self.write_index
    }

    /// Reclaimed space between the head reservation and `read_index`
    ///
    /// Saturates at zero while a [`prepend`](Self::prepend) has pushed
    /// `read_index` into the head reservation.
    #[inline]
    pub fn prependable_bytes(&self) -> usize {
        self.read_index.saturating_sub(self.head_reserve)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read_index == self.write_index
    }

    /// Returns the readable region without consuming it
    ///
    /// Protocol layers peek at this slice to find a complete message before
    /// calling [`retrieve`](Self::retrieve).
    #[inline]
    pub fn readable(&self) -> &[u8] {
        &self.storage[self.read_index..self.write_index]
    }

    /// Discards everything readable and resets both cursors to the head
    /// reservation
    #[inline]
    pub fn clear(&mut self) {
        self.read_index = self.head_reserve;
        self.write_index = self.head_reserve;
    }

    /// Guarantees at least `n` writable bytes
    ///
    /// Prefers compacting in place: when the reclaimed prepend space plus the
    /// current writable space can hold `n` bytes, the readable region is
    /// shifted down to the head reservation and no allocation happens.
    /// Otherwise the backing region grows by the shortfall, preserving every
    /// existing byte at its offset.
    ///
    /// Growth goes through the global allocator, which aborts the process if
    /// memory cannot be obtained; there is no recoverable out-of-memory
    /// result.
    #[inline]
    pub fn ensure_writable(&mut self, n: usize) {
        if self.prependable_bytes() + self.writable_bytes() < n {
            // compaction cannot satisfy the request
            let grow = n - self.writable_bytes();
            let capacity = self.capacity() + grow;
            trace!(grow, capacity, "grow");
            self.storage.resize(capacity, 0);
        } else if self.read_index > self.head_reserve {
            let readable = self.readable_bytes();
            trace!(reclaimed = self.prependable_bytes(), "compact");
            self.storage
                .copy_within(self.read_index..self.write_index, self.head_reserve);
            self.read_index = self.head_reserve;
            self.write_index = self.head_reserve + readable;
        }

        debug_assert!(self.writable_bytes() >= n);
        self.postconditions();
    }

    /// Copies `data` into the buffer at `write_index`
    ///
    /// Compacts or grows as needed via [`ensure_writable`](Self::ensure_writable).
    #[inline]
    pub fn append(&mut self, data: &[u8]) {
        self.ensure_writable(data.len());

        self.storage[self.write_index..self.write_index + data.len()].copy_from_slice(data);
        self.write_index += data.len();

        self.postconditions();
    }

    /// Writes `data` into the space immediately before the readable region
    ///
    /// This is the one operation allowed to consume the head reservation:
    /// a header can be written after its body without relocating anything,
    /// pushing `read_index` below [`head_reserve`](Self::head_reserve) until
    /// the combined region is consumed. Fails without mutating the buffer
    /// when `data` does not fit in front of `read_index`.
    #[inline]
    pub fn prepend(&mut self, data: &[u8]) -> Result<(), PrependError> {
        if data.len() > self.read_index {
            return Err(PrependError(()));
        }

        let start = self.read_index - data.len();
        self.storage[start..self.read_index].copy_from_slice(data);
        self.read_index = start;

        Ok(())
    }

    /// Consumes up to `n` readable bytes
    ///
    /// Over-consumption is clamped: retrieving `n >= readable_bytes` resets
    /// both cursors to the head reservation, reclaiming the full region.
    #[inline]
    pub fn retrieve(&mut self, n: usize) {
        if n >= self.readable_bytes() {
            self.clear();
        } else {
            self.read_index += n;
        }

        self.postconditions();
    }

    /// Copies up to `n` readable bytes out as an owned snapshot, then
    /// consumes them
    ///
    /// The returned bytes are independent of any later buffer mutation.
    #[inline]
    pub fn retrieve_as_bytes(&mut self, n: usize) -> Bytes {
        let amount = n.min(self.readable_bytes());
        let bytes = Bytes::copy_from_slice(&self.readable()[..amount]);
        self.retrieve(n);
        bytes
    }

    /// Copies the entire readable region out as an owned snapshot, then
    /// clears the buffer
    #[inline]
    pub fn retrieve_all_as_bytes(&mut self) -> Bytes {
        self.retrieve_as_bytes(self.readable_bytes())
    }

    // `head_reserve <= read_index` additionally holds everywhere except
    // between a `prepend` and the retrieve that consumes it
    #[inline(always)]
    fn postconditions(&self) {
        debug_assert!(self.read_index <= self.write_index);
        debug_assert!(self.write_index <= self.capacity());
    }
}

/// The prepend region could not hold the provided bytes
#[derive(Clone, Copy, Debug, Default)]
pub struct PrependError(());

impl fmt::Display for PrependError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the buffer does not have enough prepend space for the provided bytes"
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PrependError {}

#[cfg(feature = "std")]
impl From<PrependError> for std::io::Error {
    #[inline]
    fn from(value: PrependError) -> Self {
        Self::new(std::io::ErrorKind::InvalidInput, value)
    }
}
