//! A streaming parser for the flow-only YAML subset used by forge build
//! manifests.
//!
//! The document root is a bare, brace-less map whose entries are separated by
//! newlines; maps and lists opened with `{`/`[` are flow collections with
//! comma-separated, `}`/`]`-closed elements. Anchors (`&name`), aliases
//! (`*name`), and merge keys (`<<`) are resolved during the parse by sharing
//! nodes instead of copying them. Token text lives in a caller-supplied
//! [`Arena`]; nodes only ever hold slices into it.
//!
//! Parsing is single-shot and fail-fast: the first grammar violation is
//! returned as an [`Error`], which [`diag`] can render as a caret-annotated
//! source excerpt. There is no recovery path.
//!
//! # Examples
//!
//! ```
//! use yaml_flow::{Arena, MapHelper};
//!
//! let content = "\
//! package: 'hammer'
//! version: '0.3.1'
//! defaults: &base {opt: 2, debug: false}
//! release: {<<: *base, lto: true}
//! ";
//!
//! let arena = Arena::new();
//! let root = yaml_flow::parse(content, &arena)?;
//!
//! let helper = MapHelper::new(&root)?;
//! let package: &str = helper.required("package")?;
//! assert_eq!(package, "hammer");
//!
//! let release = root.get("release").unwrap();
//! assert_eq!(release.get("opt").and_then(|n| n.as_number()), Some(2.0));
//! assert_eq!(release.get("lto").and_then(|n| n.as_bool()), Some(true));
//! # Ok::<(), yaml_flow::Error>(())
//! ```

mod arena;
mod de;
pub mod diag;
mod error;
mod lexer;
mod node;
mod parser;
mod reader;

pub use arena::Arena;
pub use de::{FromNode, MapHelper};
pub use error::{Error, ErrorKind, MAX_KEY_LEN, MAX_NESTING_DEPTH, MAX_NUMBER_LEN, Span};
pub use node::{Map, Node, NodeRef};
pub use parser::{parse, parse_path};
