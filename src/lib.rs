// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A dynamically growable byte buffer for non-blocking socket I/O.
//!
//! [`GrowableBuffer`] accumulates bytes read from a descriptor, lets a
//! protocol layer parse and consume prefixes of those bytes, and stages
//! bytes for writing back to a descriptor.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod buffer;
#[cfg(all(feature = "std", unix))]
pub mod syscall;

pub use buffer::GrowableBuffer;
