#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::RefCell;
use std::ptr::{self, NonNull};

/// Size of a freshly allocated buffer when a small request finds no slack.
const BASE_ALLOC: usize = 4096;

/// Requests at or above this size get a dedicated buffer sized exactly to
/// the request instead of a fresh base-sized buffer.
const LARGE_REQUEST: usize = BASE_ALLOC / 2;

/// A fixed-capacity byte buffer. The allocation never moves or grows, so
/// pointers into `..len` stay stable for the arena's lifetime even while the
/// surrounding `Vec<Buf>` reallocates around it.
struct Buf {
    ptr: NonNull<u8>,
    cap: usize,
    len: usize,
}

impl Buf {
    fn with_capacity(cap: usize) -> Self {
        debug_assert!(cap > 0);
        let layout = Layout::from_size_align(cap, 1).expect("buffer layout overflow");
        // Safety: cap is non-zero, so the layout has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            std::alloc::handle_alloc_error(layout);
        };
        Buf { ptr, cap, len: 0 }
    }

    #[inline]
    fn slack(&self) -> usize {
        self.cap - self.len
    }
}

impl Drop for Buf {
    fn drop(&mut self) {
        // Safety: ptr was returned by alloc with this exact layout.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.cap, 1);
            std::alloc::dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

/// A pool of growable byte buffers that token text is appended into.
///
/// Tokens are short-lived consumers of long-lived backing storage: instead of
/// one heap allocation per token, text is copied into whichever buffer has
/// enough remaining slack, and a new buffer is allocated only when none
/// qualifies. Returned slices stay valid until the arena is dropped; nothing
/// is freed individually.
pub struct Arena {
    bufs: RefCell<Vec<Buf>>,
}

impl Arena {
    /// Creates an empty arena. No buffer is allocated until the first append.
    pub fn new() -> Self {
        Arena {
            bufs: RefCell::new(Vec::new()),
        }
    }

    /// Copies `bytes` into a buffer with sufficient capacity and returns the
    /// stored slice.
    ///
    /// Placement policy: the first existing buffer with slack of at least
    /// `bytes.len() + 1` wins; otherwise a new buffer is allocated, sized to
    /// [`BASE_ALLOC`] for small requests and sized exactly to the request
    /// for large ones.
    pub fn append<'a>(&'a self, bytes: &[u8]) -> &'a [u8] {
        let mut bufs = self.bufs.borrow_mut();

        let idx = match bufs.iter().position(|b| b.slack() >= bytes.len() + 1) {
            Some(idx) => idx,
            None => {
                let cap = if bytes.len() >= LARGE_REQUEST {
                    bytes.len()
                } else {
                    BASE_ALLOC
                };
                bufs.push(Buf::with_capacity(cap));
                bufs.len() - 1
            }
        };

        let buf = &mut bufs[idx];
        let start = buf.len;
        // Safety: the slack check guarantees start + bytes.len() <= cap, and
        // committed bytes (`..len`) are never written again, so previously
        // returned slices stay untouched and valid as long as the arena.
        unsafe {
            let dst = buf.ptr.as_ptr().add(start);
            ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
            buf.len = start + bytes.len();
            std::slice::from_raw_parts(dst, bytes.len())
        }
    }

    /// Like [`append`](Self::append), but for text.
    pub fn append_str<'a>(&'a self, text: &str) -> &'a str {
        let stored = self.append(text.as_bytes());
        // Safety: `stored` is a byte-for-byte copy of a valid `&str`.
        unsafe { std::str::from_utf8_unchecked(stored) }
    }

    /// Number of backing buffers currently allocated.
    pub(crate) fn buffer_count(&self) -> usize {
        self.bufs.borrow().len()
    }

    /// Total bytes committed across all buffers.
    pub(crate) fn committed(&self) -> usize {
        self.bufs.borrow().iter().map(|b| b.len).sum()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "./arena_tests.rs"]
mod tests;
