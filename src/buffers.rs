// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Aligned shard buffers
//!
//! The coding primitive walks its rows with vectorized loads, so every shard
//! lives in its own 64-byte-aligned allocation, released on drop.

use crate::{EcPerfError, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment required by the coding primitive's vectorized access.
pub const BUFFER_ALIGN: usize = 64;

/// Zero-initialised heap buffer with 64-byte alignment.
pub struct AlignedBuf {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl AlignedBuf {
    /// Allocate `len` zeroed bytes. `len` must be non-zero.
    pub fn zeroed(len: usize) -> Result<Self> {
        let fail = EcPerfError::AllocationFailure { size: len };
        if len == 0 {
            return Err(fail);
        }
        let layout = Layout::from_size_align(len, BUFFER_ALIGN).map_err(|_| fail)?;
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(EcPerfError::AllocationFailure { size: len })?;
        Ok(Self { ptr, layout })
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }
}

impl Deref for AlignedBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: ptr covers layout.size() initialised bytes for self's lifetime.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: exclusive borrow of an exclusively owned allocation.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// SAFETY: AlignedBuf exclusively owns its allocation.
unsafe impl Send for AlignedBuf {}
unsafe impl Sync for AlignedBuf {}

impl fmt::Debug for AlignedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlignedBuf({} bytes)", self.len())
    }
}

/// A group of equally sized aligned shard buffers.
#[derive(Debug)]
pub struct ShardSet {
    bufs: Vec<AlignedBuf>,
    shard_size: usize,
}

impl ShardSet {
    /// Allocate `count` zeroed buffers of `shard_size` bytes each.
    pub fn allocate(count: usize, shard_size: usize) -> Result<Self> {
        let mut bufs = Vec::with_capacity(count);
        for _ in 0..count {
            bufs.push(AlignedBuf::zeroed(shard_size)?);
        }
        Ok(Self { bufs, shard_size })
    }

    pub fn len(&self) -> usize {
        self.bufs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bufs.is_empty()
    }

    pub fn shard_size(&self) -> usize {
        self.shard_size
    }

    pub fn shard(&self, index: usize) -> &[u8] {
        &self.bufs[index]
    }

    /// Fill the first `count` shards from a seeded PRNG.
    pub fn fill_random(&mut self, count: usize, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for buf in &mut self.bufs[..count] {
            rng.fill_bytes(&mut buf[..]);
        }
    }

    /// Split into two mutable shard ranges, e.g. data vs parity.
    pub fn split_at_mut(&mut self, mid: usize) -> (&mut [AlignedBuf], &mut [AlignedBuf]) {
        self.bufs.split_at_mut(mid)
    }
}
