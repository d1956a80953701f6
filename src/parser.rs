use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use crate::arena::Arena;
use crate::error::{Error, ErrorKind, MAX_NESTING_DEPTH, Span};
use crate::lexer::{Lexer, Token, TokenKind, describe};
use crate::node::{Map, Node, NodeRef};

/// Map key that splats another map's entries into the enclosing one.
const MERGE_KEY: &str = "<<";

/// Recursive-descent consumer of the token stream.
///
/// Owns the alias table for the lifetime of one parse. The table is dropped
/// when the parse ends; with shared handles that releases only the table's
/// own references, so nodes reachable from the tree are unaffected.
struct Parser<'a, R> {
    lexer: Lexer<'a, R>,
    aliases: foldhash::HashMap<&'a str, NodeRef<'a>>,
    /// Current `{`/`[` nesting depth below the root map. Commas are mandatory
    /// separators at depth > 0 and forbidden at depth 0, where entries are
    /// newline-separated instead.
    depth: u32,
}

impl<'a, R: Read> Parser<'a, R> {
    fn new(src: R, arena: &'a Arena) -> Self {
        Parser {
            lexer: Lexer::new(src, arena),
            aliases: foldhash::HashMap::default(),
            depth: 0,
        }
    }

    // -- error helpers ------------------------------------------------------

    fn error_at(&self, token: &Token<'a>, kind: ErrorKind) -> Error {
        Error {
            kind,
            span: token.span,
            line_info: Some((token.line, token.column)),
        }
    }

    fn expected(&self, token: &Token<'a>, expected: &'static str) -> Error {
        self.error_at(
            token,
            ErrorKind::UnexpectedToken {
                expected,
                found: describe(token.kind),
            },
        )
    }

    // -- token helpers ------------------------------------------------------

    fn skip_newlines(&mut self) -> Result<(), Error> {
        while self.lexer.peek_token()?.kind == TokenKind::Newline {
            self.lexer.next_token()?;
        }
        Ok(())
    }

    // -- grammar ------------------------------------------------------------

    /// The document root: a brace-less map whose entries are separated by
    /// newlines rather than commas.
    fn parse_root(&mut self) -> Result<NodeRef<'a>, Error> {
        let mut map = Map::new();
        loop {
            let token = self.lexer.peek_token()?;
            match token.kind {
                TokenKind::Newline => {
                    self.lexer.next_token()?;
                }
                TokenKind::Eof => break,
                TokenKind::Key => {
                    self.parse_entry(&mut map)?;
                    let sep = self.lexer.peek_token()?;
                    match sep.kind {
                        TokenKind::Newline => {
                            self.lexer.next_token()?;
                        }
                        TokenKind::Eof => {}
                        _ => return Err(self.expected(&sep, "a newline")),
                    }
                }
                _ => return Err(self.expected(&token, "a key")),
            }
        }
        Ok(Rc::new(Node::Map(map)))
    }

    /// One `key: value` pair. The caller has already checked that the current
    /// token is a key.
    fn parse_entry(&mut self, map: &mut Map<'a>) -> Result<(), Error> {
        let key_token = self.lexer.next_token()?;
        debug_assert_eq!(key_token.kind, TokenKind::Key);
        let key = key_token.text;

        let colon = self.lexer.next_token()?;
        if colon.kind != TokenKind::Colon {
            return Err(self.expected(&colon, "a colon"));
        }

        if key == MERGE_KEY {
            return self.merge_entries(map, &key_token);
        }

        let next = self.lexer.peek_token()?;
        if !starts_value(next.kind) {
            return Err(self.error_at(&next, ErrorKind::MissingValue(key.into())));
        }
        let value = self.parse_value()?;
        map.insert(key, value);
        Ok(())
    }

    fn parse_value(&mut self) -> Result<NodeRef<'a>, Error> {
        let token = self.lexer.next_token()?;
        match token.kind {
            TokenKind::Anchor => {
                let name = token.text;
                if self.aliases.contains_key(name) {
                    return Err(self.error_at(&token, ErrorKind::RedefinedAlias(name.into())));
                }
                let value = self.parse_value()?;
                self.aliases.insert(name, Rc::clone(&value));
                Ok(value)
            }

            TokenKind::Alias => match self.aliases.get(token.text) {
                // The alias becomes one more owner of the anchored node.
                Some(node) => Ok(Rc::clone(node)),
                None => Err(self.error_at(&token, ErrorKind::UndefinedAlias(token.text.into()))),
            },

            TokenKind::Str | TokenKind::StrLit => Ok(Rc::new(Node::Str(token.text))),
            TokenKind::Number => self.number(&token),
            TokenKind::Boolean => Ok(Rc::new(Node::Boolean(token.text == "true"))),

            TokenKind::OpenMap => self.parse_flow_map(&token),
            TokenKind::OpenSeq => self.parse_flow_list(&token),

            _ => Err(self.expected(&token, "a value")),
        }
    }

    fn number(&self, token: &Token<'a>) -> Result<NodeRef<'a>, Error> {
        // Interior `_` separators are stripped before conversion; anything
        // beyond that is up to the float parser.
        let parsed = if token.text.contains('_') {
            let cleaned: String = token.text.chars().filter(|c| *c != '_').collect();
            cleaned.parse::<f64>()
        } else {
            token.text.parse::<f64>()
        };
        match parsed {
            Ok(value) => Ok(Rc::new(Node::Number(value))),
            Err(_) => Err(self.error_at(
                token,
                ErrorKind::UnexpectedToken {
                    expected: "a number",
                    found: "a malformed number",
                },
            )),
        }
    }

    /// A `{`-delimited map: comma-separated `key: value` pairs closed by `}`.
    /// Newlines inside are insignificant. The opening brace is consumed.
    fn parse_flow_map(&mut self, open: &Token<'a>) -> Result<NodeRef<'a>, Error> {
        self.enter(open)?;
        let mut map = Map::new();

        self.skip_newlines()?;
        if self.lexer.peek_token()?.kind == TokenKind::CloseMap {
            self.lexer.next_token()?;
            self.depth -= 1;
            return Ok(Rc::new(Node::Map(map)));
        }

        loop {
            let token = self.lexer.peek_token()?;
            if token.kind != TokenKind::Key {
                return Err(self.expected(&token, "a key"));
            }
            self.parse_entry(&mut map)?;

            self.skip_newlines()?;
            let sep = self.lexer.peek_token()?;
            match sep.kind {
                TokenKind::CloseMap => {
                    self.lexer.next_token()?;
                    break;
                }
                TokenKind::Comma => {
                    self.lexer.next_token()?;
                    self.skip_newlines()?;
                    // Trailing comma before the closing brace is tolerated.
                    if self.lexer.peek_token()?.kind == TokenKind::CloseMap {
                        self.lexer.next_token()?;
                        break;
                    }
                }
                TokenKind::Key => return Err(self.error_at(&sep, ErrorKind::MissingComma)),
                TokenKind::Eof => return Err(self.expected(&sep, "a `}`")),
                _ => return Err(self.expected(&sep, "a comma")),
            }
        }

        self.depth -= 1;
        Ok(Rc::new(Node::Map(map)))
    }

    /// A `[`-delimited list: comma-separated values closed by `]`. The
    /// opening bracket is consumed.
    fn parse_flow_list(&mut self, open: &Token<'a>) -> Result<NodeRef<'a>, Error> {
        self.enter(open)?;
        let mut items: Vec<NodeRef<'a>> = Vec::new();

        self.skip_newlines()?;
        if self.lexer.peek_token()?.kind == TokenKind::CloseSeq {
            self.lexer.next_token()?;
            self.depth -= 1;
            return Ok(Rc::new(Node::List(items)));
        }

        loop {
            let token = self.lexer.peek_token()?;
            if !starts_value(token.kind) {
                let expected = match token.kind {
                    TokenKind::Eof => "a `]`",
                    _ => "a value",
                };
                return Err(self.expected(&token, expected));
            }
            items.push(self.parse_value()?);

            self.skip_newlines()?;
            let sep = self.lexer.peek_token()?;
            match sep.kind {
                TokenKind::CloseSeq => {
                    self.lexer.next_token()?;
                    break;
                }
                TokenKind::Comma => {
                    self.lexer.next_token()?;
                    self.skip_newlines()?;
                    if self.lexer.peek_token()?.kind == TokenKind::CloseSeq {
                        self.lexer.next_token()?;
                        break;
                    }
                }
                k if starts_value(k) => {
                    return Err(self.error_at(&sep, ErrorKind::MissingComma));
                }
                TokenKind::Eof => return Err(self.expected(&sep, "a `]`")),
                _ => return Err(self.expected(&sep, "a comma")),
            }
        }

        self.depth -= 1;
        Ok(Rc::new(Node::List(items)))
    }

    /// Merge-key handling: the value after `<<:` must resolve (directly or
    /// through an alias) to a map, whose entries are appended to `map`.
    ///
    /// A uniquely-owned source map is consumed: its entries move out and the
    /// map itself is torn down right here. A shared (anchored) source map
    /// stays intact; its entries are cloned in, each gaining an owner.
    fn merge_entries(&mut self, map: &mut Map<'a>, at: &Token<'a>) -> Result<(), Error> {
        let next = self.lexer.peek_token()?;
        if !starts_value(next.kind) {
            return Err(self.error_at(&next, ErrorKind::MissingValue(MERGE_KEY.into())));
        }
        let source = self.parse_value()?;

        match Rc::try_unwrap(source) {
            Ok(Node::Map(entries)) => {
                map.extend(entries.into_entries());
                Ok(())
            }
            Ok(other) => Err(self.error_at(
                at,
                ErrorKind::UnexpectedToken {
                    expected: "a map",
                    found: other.type_name(),
                },
            )),
            Err(shared) => match &*shared {
                Node::Map(source_map) => {
                    for (key, value) in source_map.iter() {
                        map.insert(key, Rc::clone(value));
                    }
                    Ok(())
                }
                other => Err(self.error_at(
                    at,
                    ErrorKind::UnexpectedToken {
                        expected: "a map",
                        found: other.type_name(),
                    },
                )),
            },
        }
    }

    fn enter(&mut self, open: &Token<'a>) -> Result<(), Error> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_at(open, ErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        Ok(())
    }
}

fn starts_value(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Str
            | TokenKind::StrLit
            | TokenKind::Number
            | TokenKind::Boolean
            | TokenKind::Anchor
            | TokenKind::Alias
            | TokenKind::OpenMap
            | TokenKind::OpenSeq
    )
}

// ---------------------------------------------------------------------------
// Top-level parse entry points
// ---------------------------------------------------------------------------

/// Parses a document into its root [`Map`](crate::Map) node. Token text is
/// copied into `arena`, which must outlive the returned tree.
pub fn parse<'a>(input: &str, arena: &'a Arena) -> Result<NodeRef<'a>, Error> {
    Parser::new(input.as_bytes(), arena).parse_root()
}

/// Parses a document from a file, reading it in fixed-size chunks.
///
/// The path must name a non-empty regular file; anything else fails before
/// the first byte is lexed.
pub fn parse_path<'a>(path: &Path, arena: &'a Arena) -> Result<NodeRef<'a>, Error> {
    let file_error = |kind: ErrorKind| Error {
        kind,
        span: Span::default(),
        line_info: None,
    };

    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) => return Err(file_error(ErrorKind::ReadFailed(err.kind()))),
    };
    if !meta.is_file() {
        return Err(file_error(ErrorKind::NotAFile));
    }
    if meta.len() == 0 {
        return Err(file_error(ErrorKind::EmptyFile));
    }

    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) => return Err(file_error(ErrorKind::ReadFailed(err.kind()))),
    };
    Parser::new(file, arena).parse_root()
}

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;
