//! Transient buffer for unescaping query text.
//!
//! The unescaped form of a query is never longer than its escaped form, so a
//! buffer sized exactly to the raw span always fits. Small queries live in a
//! fixed inline region on the stack; larger ones borrow a vector from a
//! thread-local pool so repeated requests do not reallocate. The buffer is
//! zeroed before its storage is released on every exit path, so a reused pool
//! slot never carries a previous request's query text.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Spans at or below this many bytes stay on the stack.
pub const INLINE_THRESHOLD: usize = 256;

thread_local! {
    static SCRATCH_POOL: RefCell<Option<Vec<u8>>> = const { RefCell::new(None) };
}

pub(crate) fn take_pooled() -> Vec<u8> {
    SCRATCH_POOL
        .with(|pool| pool.borrow_mut().take())
        .unwrap_or_default()
}

pub(crate) fn put_pooled(vec: Vec<u8>) {
    SCRATCH_POOL.with(|pool| *pool.borrow_mut() = Some(vec));
}

enum Storage {
    Inline([u8; INLINE_THRESHOLD]),
    Pooled(Vec<u8>),
}

/// A zero-initialized byte region of exactly the requested length, released
/// back to its stack frame or pool slot on drop.
pub struct ScratchBuffer {
    storage: Storage,
    len: usize,
}

impl ScratchBuffer {
    pub fn acquire(len: usize) -> Self {
        let storage = if len <= INLINE_THRESHOLD {
            Storage::Inline([0; INLINE_THRESHOLD])
        } else {
            let mut vec = take_pooled();
            vec.clear();
            vec.resize(len, 0);
            Storage::Pooled(vec)
        };
        Self { storage, len }
    }
}

impl Deref for ScratchBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.storage {
            Storage::Inline(buf) => &buf[..self.len],
            Storage::Pooled(vec) => &vec[..self.len],
        }
    }
}

impl DerefMut for ScratchBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Inline(buf) => &mut buf[..self.len],
            Storage::Pooled(vec) => &mut vec[..self.len],
        }
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        match &mut self.storage {
            Storage::Inline(buf) => buf.fill(0),
            Storage::Pooled(vec) => {
                vec.fill(0);
                put_pooled(std::mem::take(vec));
            }
        }
    }
}
