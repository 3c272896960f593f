// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Descriptor I/O for [`GrowableBuffer`]: scatter reads that can exceed the
//! current capacity, and single-shot writes of the readable region.

use super::GrowableBuffer;
use crate::syscall;
use libc::iovec;
use std::{io, os::unix::io::AsRawFd};
use tracing::trace;

#[cfg(test)]
mod tests;

/// Size of the stack scratch region used as the second scatter-read target
///
/// One read can deliver up to `writable_bytes + SCRATCH_LEN` bytes without
/// the buffer having been grown in advance.
pub const SCRATCH_LEN: usize = 65536;

impl GrowableBuffer {
    /// Fills the buffer from a readable descriptor with a single `readv`
    ///
    /// The call scatters into the buffer's writable region first and a
    /// fixed-size stack scratch region second, so data beyond the current
    /// writable capacity is absorbed in the same system call and then
    /// appended (growing or compacting the buffer as needed).
    ///
    /// Short reads are returned as-is; retrying on `WouldBlock` or
    /// `Interrupted` is the caller's responsibility. A result of `<= 0`
    /// from the kernel is surfaced as an error (`UnexpectedEof` for end of
    /// file) and leaves the cursors untouched.
    pub fn read_from<Fd: AsRawFd>(&mut self, fd: &Fd) -> io::Result<usize> {
        let mut scratch = [0u8; SCRATCH_LEN];
        let writable = self.writable_bytes();
        let write_index = self.write_index;

        let iov = [
            iovec {
                iov_base: self.storage[write_index..].as_mut_ptr() as *mut _,
                iov_len: writable,
            },
            iovec {
                iov_base: scratch.as_mut_ptr() as *mut _,
                iov_len: SCRATCH_LEN,
            },
        ];
        // the scratch target adds nothing once the writable region alone is
        // at least as large
        let iov_cnt = if writable >= SCRATCH_LEN { 1 } else { 2 };

        let len = syscall::readv(fd, &iov[..iov_cnt])?;
        if len == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        if len <= writable {
            self.write_index += len;
        } else {
            // the writable region was filled exactly; the remainder landed
            // in scratch and becomes part of permanent storage
            self.write_index = self.capacity();
            self.append(&scratch[..len - writable]);
        }

        trace!(len, "rx");
        self.postconditions();
        Ok(len)
    }

    /// Writes the entire readable region to a descriptor in one call
    ///
    /// On success the bytes actually written are consumed; a partial write
    /// leaves the remainder readable for a later call. A result of `<= 0`
    /// is surfaced as an error (`WriteZero` for a zero-length write) and
    /// leaves the cursors untouched.
    pub fn write_to<Fd: AsRawFd>(&mut self, fd: &Fd) -> io::Result<usize> {
        let len = syscall::write(fd, self.readable())?;
        if len == 0 {
            return Err(io::ErrorKind::WriteZero.into());
        }

        self.retrieve(len);

        trace!(len, "tx");
        Ok(len)
    }
}
