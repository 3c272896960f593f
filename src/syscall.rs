// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Thin wrappers over the descriptor read/write primitives the buffer
//! consumes.

use core::ffi::c_void;
use libc::iovec;
use std::{io, os::unix::io::AsRawFd};

/// Calls the given libc function and wraps the result in an `io::Result`.
macro_rules! libc {
    ($fn: ident ( $($arg: expr),* $(,)* ) ) => {{
        let res = libc::$fn($($arg, )*);
        if res < 0 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
}

/// Reads from `fd` into the provided destinations, in order
///
/// See [readv(2)](https://man7.org/linux/man-pages/man2/readv.2.html).
///
/// > The readv() system call reads iovcnt buffers from the file associated
/// > with the file descriptor fd into the buffers described by iov
/// > ("scatter input").
///
/// Returns the total number of bytes read; `Ok(0)` indicates end of file.
#[inline]
pub fn readv<Fd: AsRawFd>(fd: &Fd, iov: &[iovec]) -> io::Result<usize> {
    // Safety: every iovec entry points at writable memory owned by the
    // caller for the duration of the call
    let len = unsafe { libc!(readv(fd.as_raw_fd(), iov.as_ptr(), iov.len() as _))? };
    Ok(len as usize)
}

/// Writes `buf` to `fd`
///
/// See [write(2)](https://man7.org/linux/man-pages/man2/write.2.html).
///
/// > write() writes up to count bytes from the buffer starting at buf to
/// > the file referred to by the file descriptor fd.
///
/// Returns the number of bytes written, which may be short.
#[inline]
pub fn write<Fd: AsRawFd>(fd: &Fd, buf: &[u8]) -> io::Result<usize> {
    // Safety: the pointer and length come from a live slice
    let len = unsafe {
        libc!(write(
            fd.as_raw_fd(),
            buf.as_ptr() as *const c_void,
            buf.len()
        ))?
    };
    Ok(len as usize)
}
