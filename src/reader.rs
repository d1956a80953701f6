use std::io::Read;

use crate::error::{Error, ErrorKind, Span};

/// Size of the input chunk buffer.
pub(crate) const CHUNK_SIZE: usize = 4096;

/// Sentinel byte returned forever after true end-of-file. An embedded NUL
/// therefore ends the input early, as the format forbids it anyway.
pub(crate) const EOF_BYTE: u8 = 0;

/// Buffered chunked input with single-byte lookahead.
///
/// Reads from the underlying source in fixed-size chunks, refilling with a
/// blocking read whenever the active chunk is exhausted. The refill policy
/// lives entirely here; the lexer only ever sees `peek`/`bump`/`at_end` and
/// the absolute byte offset of the cursor.
pub(crate) struct ChunkReader<R> {
    src: R,
    chunk: Vec<u8>,
    /// Valid bytes in `chunk`.
    len: usize,
    /// Cursor within `chunk`.
    pos: usize,
    /// Absolute offset of `chunk[0]` in the input.
    base: u32,
    eof: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(src: R) -> Self {
        Self::with_chunk_size(src, CHUNK_SIZE)
    }

    /// Chunk size override, so tests can exercise refills with short inputs.
    pub fn with_chunk_size(src: R, size: usize) -> Self {
        debug_assert!(size >= 2);
        ChunkReader {
            src,
            chunk: vec![0u8; size],
            len: 0,
            pos: 0,
            base: 0,
            eof: false,
        }
    }

    /// Absolute byte offset of the cursor.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.base + self.pos as u32
    }

    /// Current byte without consuming it, or [`EOF_BYTE`] at end of input.
    #[inline]
    pub fn peek(&mut self) -> Result<u8, Error> {
        if self.pos < self.len {
            return Ok(self.chunk[self.pos]);
        }
        self.ensure(1)?;
        Ok(if self.pos < self.len {
            self.chunk[self.pos]
        } else {
            EOF_BYTE
        })
    }

    /// The byte after the current one, or [`EOF_BYTE`].
    pub fn peek_second(&mut self) -> Result<u8, Error> {
        self.ensure(2)?;
        Ok(if self.pos + 1 < self.len {
            self.chunk[self.pos + 1]
        } else {
            EOF_BYTE
        })
    }

    /// Consumes one byte. Past end of input this is a no-op, so callers may
    /// keep peeking the EOF sentinel without bounds bookkeeping.
    #[inline]
    pub fn bump(&mut self) {
        if self.pos < self.len {
            self.pos += 1;
        }
    }

    /// True once the cursor has consumed the final byte of the input.
    pub fn at_end(&mut self) -> Result<bool, Error> {
        self.ensure(1)?;
        Ok(self.eof && self.pos >= self.len)
    }

    /// Makes at least `want` bytes visible past the cursor, refilling the
    /// chunk as needed, unless the input ends first.
    fn ensure(&mut self, want: usize) -> Result<(), Error> {
        debug_assert!(want <= self.chunk.len());
        while self.len - self.pos < want && !self.eof {
            if self.pos > 0 {
                self.chunk.copy_within(self.pos..self.len, 0);
                self.base += self.pos as u32;
                self.len -= self.pos;
                self.pos = 0;
            }
            match self.src.read(&mut self.chunk[self.len..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.len += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    let at = self.offset();
                    return Err(Error {
                        kind: ErrorKind::ReadFailed(err.kind()),
                        span: Span::new(at, at + 1),
                        line_info: None,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "./reader_tests.rs"]
mod tests;
