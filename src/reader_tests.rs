use super::*;
use crate::error::ErrorKind;

// -- Chunked traversal ------------------------------------------------------

#[test]
fn peek_and_bump_reproduce_input() {
    let data: Vec<u8> = (0u8..=255).cycle().take(100).collect();
    let mut reader = ChunkReader::with_chunk_size(&data[..], 8);

    let mut seen = Vec::new();
    loop {
        if reader.at_end().unwrap() {
            break;
        }
        seen.push(reader.peek().unwrap());
        reader.bump();
    }
    assert_eq!(seen, data);
}

#[test]
fn offset_tracks_consumed_bytes() {
    let data = b"abcdefghij";
    let mut reader = ChunkReader::with_chunk_size(&data[..], 4);
    assert_eq!(reader.offset(), 0);
    for expected in 0..10u32 {
        assert_eq!(reader.offset(), expected);
        reader.peek().unwrap();
        reader.bump();
    }
    assert_eq!(reader.offset(), 10);
}

#[test]
fn peek_second_across_chunk_boundary() {
    let data = b"abcdefgh";
    let mut reader = ChunkReader::with_chunk_size(&data[..], 4);
    // Walk to the last byte of the first chunk.
    for _ in 0..3 {
        reader.peek().unwrap();
        reader.bump();
    }
    assert_eq!(reader.peek().unwrap(), b'd');
    // 'e' lives in the next chunk; the refill shifts and reads transparently.
    assert_eq!(reader.peek_second().unwrap(), b'e');
    assert_eq!(reader.peek().unwrap(), b'd');
    assert_eq!(reader.offset(), 3);
}

// -- End of input -----------------------------------------------------------

#[test]
fn eof_sentinel_repeats_forever() {
    let mut reader = ChunkReader::with_chunk_size(&b"ab"[..], 4);
    assert_eq!(reader.peek().unwrap(), b'a');
    reader.bump();
    assert_eq!(reader.peek().unwrap(), b'b');
    reader.bump();
    assert!(reader.at_end().unwrap());
    for _ in 0..5 {
        assert_eq!(reader.peek().unwrap(), EOF_BYTE);
        assert_eq!(reader.peek_second().unwrap(), EOF_BYTE);
        reader.bump();
    }
    assert!(reader.at_end().unwrap());
    assert_eq!(reader.offset(), 2);
}

#[test]
fn empty_input_is_immediately_at_end() {
    let mut reader = ChunkReader::with_chunk_size(&b""[..], 4);
    assert!(reader.at_end().unwrap());
    assert_eq!(reader.peek().unwrap(), EOF_BYTE);
}

// -- Failure path -----------------------------------------------------------

struct FailingReader {
    remaining: usize,
}

impl std::io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "source went away",
            ));
        }
        let n = self.remaining.min(buf.len());
        buf[..n].fill(b'x');
        self.remaining -= n;
        Ok(n)
    }
}

#[test]
fn read_failure_surfaces_as_error() {
    let mut reader = ChunkReader::with_chunk_size(FailingReader { remaining: 4 }, 4);
    for _ in 0..4 {
        assert_eq!(reader.peek().unwrap(), b'x');
        reader.bump();
    }
    let err = reader.peek().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ReadFailed(std::io::ErrorKind::BrokenPipe)
    ));
}
