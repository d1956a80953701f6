use std::io::Read;

use crate::arena::Arena;
use crate::error::{Error, ErrorKind, MAX_KEY_LEN, MAX_NUMBER_LEN, Span};
use crate::reader::{ChunkReader, EOF_BYTE};

/// Token types produced by the lexer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum TokenKind {
    /// A bare key (also carries anchor/alias names and merge sentinels).
    Key,
    /// Double-quoted text, escapes already resolved.
    Str,
    /// Single-quoted text, no escape processing.
    StrLit,
    /// A numeric value, underscores still present.
    Number,
    /// The literal text `true` or `false`.
    Boolean,
    /// An anchor name (`&name`, prefix consumed invisibly).
    Anchor,
    /// An alias name (`*name`, prefix consumed invisibly).
    Alias,
    Colon,
    Comma,
    /// One or more consecutive line breaks, collapsed to a single boundary.
    Newline,
    OpenMap,
    CloseMap,
    OpenSeq,
    CloseSeq,
    Eof,
}

/// Human description of a token kind, for error messages.
pub(crate) fn describe(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Key => "a key",
        TokenKind::Str | TokenKind::StrLit => "a string",
        TokenKind::Number => "a number",
        TokenKind::Boolean => "a boolean",
        TokenKind::Anchor => "an anchor",
        TokenKind::Alias => "an alias",
        TokenKind::Colon => "a colon",
        TokenKind::Comma => "a comma",
        TokenKind::Newline => "a newline",
        TokenKind::OpenMap => "a `{`",
        TokenKind::CloseMap => "a `}`",
        TokenKind::OpenSeq => "a `[`",
        TokenKind::CloseSeq => "a `]`",
        TokenKind::Eof => "end of file",
    }
}

/// A single lexed token. `text` points into the parse arena; the token itself
/// is consumed by the parser and discarded.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
    /// 1-based line of the token's first byte.
    pub line: u32,
    /// 1-based column of the token's first byte.
    pub column: u32,
}

/// Streaming tokenizer over chunked input.
///
/// Exactly one token of lookahead: [`peek_token`](Lexer::peek_token) scans and
/// holds it, [`next_token`](Lexer::next_token) consumes it.
pub(crate) struct Lexer<'a, R> {
    reader: ChunkReader<R>,
    arena: &'a Arena,
    /// Reusable token-assembly buffer; finished runs are committed to the
    /// arena so tokens only ever hold arena slices.
    scratch: Vec<u8>,
    line: u32,
    column: u32,
    peeked: Option<Token<'a>>,
}

impl<'a, R: Read> Lexer<'a, R> {
    pub fn new(src: R, arena: &'a Arena) -> Self {
        Lexer {
            reader: ChunkReader::new(src),
            arena,
            scratch: Vec::new(),
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    /// Current token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token<'a>, Error> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.scan()?;
        self.peeked = Some(token);
        Ok(token)
    }

    /// Consumes and returns the current token.
    pub fn next_token(&mut self) -> Result<Token<'a>, Error> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    // -- byte-level helpers -------------------------------------------------

    /// Consumes one byte, updating line/column tracking.
    fn advance(&mut self) -> Result<(), Error> {
        let byte = self.reader.peek()?;
        self.reader.bump();
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Ok(())
    }

    fn error(&self, kind: ErrorKind, start: u32, line: u32, column: u32) -> Error {
        let end = self.reader.offset().max(start + 1);
        Error {
            kind,
            span: Span::new(start, end),
            line_info: Some((line, column)),
        }
    }

    /// Commits the scratch buffer to the arena and hands back the stored text.
    fn commit(&mut self, start: u32, line: u32, column: u32) -> Result<&'a str, Error> {
        let stored = self.arena.append(&self.scratch);
        match std::str::from_utf8(stored) {
            Ok(text) => Ok(text),
            Err(_) => Err(self.error(ErrorKind::InvalidUtf8, start, line, column)),
        }
    }

    // -- token dispatch -----------------------------------------------------

    fn scan(&mut self) -> Result<Token<'a>, Error> {
        // `&`/`*` are transparent prefixes: they flag the name that follows
        // and the dispatch loops back without emitting a token of their own.
        let mut tag: Option<TokenKind> = None;
        loop {
            while self.reader.peek()? == b' ' {
                self.advance()?;
            }
            if self.reader.peek()? == b'\t' {
                let at = self.reader.offset();
                return Err(self.error(ErrorKind::TabIndentation, at, self.line, self.column));
            }

            let start = self.reader.offset();
            let line = self.line;
            let column = self.column;

            let byte = self.reader.peek()?;
            match byte {
                EOF_BYTE => {
                    return Ok(Token {
                        kind: TokenKind::Eof,
                        text: "",
                        span: Span::new(start, start),
                        line,
                        column,
                    });
                }

                b'\n' | b'\r' => {
                    while matches!(self.reader.peek()?, b'\n' | b'\r') {
                        self.advance()?;
                    }
                    return Ok(Token {
                        kind: TokenKind::Newline,
                        text: "",
                        span: Span::new(start, self.reader.offset()),
                        line,
                        column,
                    });
                }

                b'#' => {
                    loop {
                        let c = self.reader.peek()?;
                        if c == b'\n' || c == EOF_BYTE {
                            break;
                        }
                        self.advance()?;
                    }
                    continue;
                }

                b'&' => {
                    self.advance()?;
                    tag = Some(TokenKind::Anchor);
                    continue;
                }

                b'*' => {
                    self.advance()?;
                    tag = Some(TokenKind::Alias);
                    continue;
                }

                b':' => return self.single(TokenKind::Colon, start, line, column),
                b',' => return self.single(TokenKind::Comma, start, line, column),
                b'{' => return self.single(TokenKind::OpenMap, start, line, column),
                b'}' => return self.single(TokenKind::CloseMap, start, line, column),
                b'[' => return self.single(TokenKind::OpenSeq, start, line, column),
                b']' => return self.single(TokenKind::CloseSeq, start, line, column),

                b'"' => return self.scan_quoted(start, line, column),
                b'\'' => return self.scan_literal(start, line, column),

                b'0'..=b'9' | b'.' | b'-' | b'+' => {
                    return self.scan_number(start, line, column, tag);
                }

                _ => {
                    self.scratch.clear();
                    return self.scan_key(start, line, column, tag);
                }
            }
        }
    }

    fn single(
        &mut self,
        kind: TokenKind,
        start: u32,
        line: u32,
        column: u32,
    ) -> Result<Token<'a>, Error> {
        self.advance()?;
        Ok(Token {
            kind,
            text: "",
            span: Span::new(start, start + 1),
            line,
            column,
        })
    }

    // -- strings ------------------------------------------------------------

    /// Double-quoted text; `\`-escapes are resolved while scanning.
    fn scan_quoted(&mut self, start: u32, line: u32, column: u32) -> Result<Token<'a>, Error> {
        self.advance()?;
        self.scratch.clear();
        loop {
            let c = self.reader.peek()?;
            match c {
                b'"' => {
                    self.advance()?;
                    break;
                }
                b'\n' | EOF_BYTE => {
                    return Err(self.error(ErrorKind::UnclosedQuote, start, line, column));
                }
                b'\\' => {
                    self.advance()?;
                    let escaped = self.reader.peek()?;
                    if escaped == b'\n' || escaped == EOF_BYTE {
                        return Err(self.error(ErrorKind::UnclosedQuote, start, line, column));
                    }
                    self.advance()?;
                    self.scratch.push(unescape(escaped));
                }
                _ => {
                    self.scratch.push(c);
                    self.advance()?;
                }
            }
        }
        let text = self.commit(start, line, column)?;
        Ok(Token {
            kind: TokenKind::Str,
            text,
            span: Span::new(start, self.reader.offset()),
            line,
            column,
        })
    }

    /// Single-quoted text; a doubled `''` is one literal quote and the token
    /// continues, otherwise no escape processing at all.
    fn scan_literal(&mut self, start: u32, line: u32, column: u32) -> Result<Token<'a>, Error> {
        self.advance()?;
        self.scratch.clear();
        loop {
            let c = self.reader.peek()?;
            match c {
                b'\'' => {
                    self.advance()?;
                    if self.reader.peek()? == b'\'' {
                        self.advance()?;
                        self.scratch.push(b'\'');
                        continue;
                    }
                    break;
                }
                b'\n' | EOF_BYTE => {
                    return Err(self.error(ErrorKind::UnclosedQuote, start, line, column));
                }
                _ => {
                    self.scratch.push(c);
                    self.advance()?;
                }
            }
        }
        let text = self.commit(start, line, column)?;
        Ok(Token {
            kind: TokenKind::StrLit,
            text,
            span: Span::new(start, self.reader.offset()),
            line,
            column,
        })
    }

    // -- numbers, booleans, keys --------------------------------------------

    /// Attempts a number scan. If the byte after the run is not a recognized
    /// delimiter, the run is re-interpreted as the head of a bare key.
    fn scan_number(
        &mut self,
        start: u32,
        line: u32,
        column: u32,
        tag: Option<TokenKind>,
    ) -> Result<Token<'a>, Error> {
        self.scratch.clear();
        let first = self.reader.peek()?;
        self.scratch.push(first);
        self.advance()?;

        loop {
            let c = self.reader.peek()?;
            match c {
                b'0'..=b'9' | b'.' | b'e' | b'E' | b'-' | b'+' | b'_' => {
                    self.scratch.push(c);
                    self.advance()?;
                }
                _ => break,
            }
        }

        let next = self.reader.peek()?;
        if matches!(next, b' ' | b'\n' | b'\r' | b',' | b'}' | b']' | EOF_BYTE) {
            if self.scratch.len() > MAX_NUMBER_LEN {
                return Err(self.error(ErrorKind::NumberTooLong, start, line, column));
            }
            let text = self.commit(start, line, column)?;
            return Ok(Token {
                kind: TokenKind::Number,
                text,
                span: Span::new(start, self.reader.offset()),
                line,
                column,
            });
        }

        self.scan_key(start, line, column, tag)
    }

    /// Bare key lexing. An embedded `:` stays part of the key unless it is
    /// immediately followed by a space, newline, or EOF, in which case it
    /// terminates the key and is not included in it.
    fn scan_key(
        &mut self,
        start: u32,
        line: u32,
        column: u32,
        tag: Option<TokenKind>,
    ) -> Result<Token<'a>, Error> {
        loop {
            let c = self.reader.peek()?;
            match c {
                b' ' | b'\t' | b'\n' | b'\r' | b',' | b'{' | b'}' | b'[' | b']' | b'#'
                | EOF_BYTE => break,
                b':' => {
                    let after = self.reader.peek_second()?;
                    if matches!(after, b' ' | b'\n' | b'\r' | EOF_BYTE) {
                        break;
                    }
                    self.scratch.push(c);
                    self.advance()?;
                }
                _ => {
                    self.scratch.push(c);
                    self.advance()?;
                }
            }
        }

        if self.scratch.len() > MAX_KEY_LEN {
            return Err(self.error(ErrorKind::KeyTooLong, start, line, column));
        }

        // `true`/`false` followed by anything but a key-separating colon is a
        // boolean; on mismatch the run stays a key.
        let terminator = self.reader.peek()?;
        let run = self.scratch.as_slice();
        if terminator != b':' && (run == b"true" || run == b"false") {
            let text = self.commit(start, line, column)?;
            return Ok(Token {
                kind: TokenKind::Boolean,
                text,
                span: Span::new(start, self.reader.offset()),
                line,
                column,
            });
        }

        let kind = tag.unwrap_or(TokenKind::Key);
        let text = self.commit(start, line, column)?;
        Ok(Token {
            kind,
            text,
            span: Span::new(start, self.reader.offset()),
            line,
            column,
        })
    }
}

fn unescape(byte: u8) -> u8 {
    match byte {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'b' => 0x08,
        b'f' => 0x0C,
        b'e' => 0x1B,
        b'0' => 0x00,
        // `\\`, `\"`, `\'` and anything unrecognized keep the escaped byte.
        other => other,
    }
}

#[cfg(test)]
#[path = "./lexer_tests.rs"]
mod tests;
