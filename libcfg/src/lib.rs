//! Parser for mode-sectioned `key = value` configuration files.
//!
//! ```text
//! # applies everywhere
//! name = "app"
//!
//! [production]
//! http.port    = 8,080
//! http.timeout = 30s          # 30000 milliseconds
//! upload.limit = 10MB         # 10485760 bytes
//! started      = 2017-10-01 21:00:00
//! home         = $HOME
//! hosts        = ["a", "b"]
//! ```
//!
//! Values are typed by their literal form: integers (with optional thousands
//! separators), floats, octal and hex numbers, datetimes, durations, sizes,
//! quoted and triple-quoted strings, booleans, environment references, and
//! homogeneous arrays of these. Dotted keys build nested maps.
//!
//! # Parsing Pipeline
//!
//! 1. **Normalization**: the input is decoded lossily as UTF-8 and line
//!    endings are folded to `\n`.
//!
//! 2. **Document engine**: a byte-level state machine recognizes comments,
//!    `[mode]` headers, keys, and `=`.
//!
//! 3. **Recognizers**: each value is fed byte by byte to a small state
//!    machine chosen by its first byte, and the result is inserted into the
//!    tree under `mode.key`.
//!
//! [`parse`] puts keys that appear before any header into the catch-all
//! mode [`CATCH_ALL`]. [`parse_strict`] rejects them.

mod array;
mod boolean;
mod config;
mod engine;
mod environ;
mod error;
mod number;
mod path;
mod recognizer;
mod string;
mod value;

pub use config::{decode, load, load_modes, merge, Document};
pub use engine::CATCH_ALL;
pub use error::{ConfigError, ParseError, Result};
pub use value::{Map, Value, ValueKind};

/// Parse a configuration document, allowing keys before the first header.
///
/// # Example
///
/// ```
/// use libcfg::{parse, Value};
///
/// let doc = parse("port = 80\n[dev]\nport = 8080\n").unwrap();
/// assert_eq!(doc.catch_all().unwrap()["port"], Value::Integer(80));
/// assert_eq!(doc.mode("dev").unwrap()["port"], Value::Integer(8080));
/// ```
pub fn parse(input: impl AsRef<[u8]>) -> Result<Document> {
    Document::parse(input.as_ref(), Some(CATCH_ALL))
}

/// Parse a configuration document that must open with a `[mode]` header.
///
/// # Example
///
/// ```
/// use libcfg::parse_strict;
///
/// assert!(parse_strict("port = 80\n").is_err());
/// assert!(parse_strict("[dev]\nport = 80\n").is_ok());
/// ```
pub fn parse_strict(input: impl AsRef<[u8]>) -> Result<Document> {
    Document::parse(input.as_ref(), None)
}
