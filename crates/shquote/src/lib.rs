//! Escape strings so a POSIX-compatible shell reads them back verbatim —
//! the `%q` printf conversion as a streaming engine.
//!
//! Input is consumed one code point at a time from a pull source with
//! one-unit push-back ([`UnitSource`]); a classifier decides which code
//! points must be escaped under the active [`EscapePolicy`]; a quoting
//! state machine emits plain single-quoted or ANSI-C (`$'...'`) quoted
//! output, choosing among literal, named, octal, and `\u`/`\U` escape
//! forms greedily with one code point of lookahead.
//!
//! The guarantee is byte-for-byte round-tripping: feeding the output
//! through a compliant shell's word splitting and quote removal yields the
//! original input exactly, for every option combination — including inputs
//! that are not valid UTF-8, which the decoder recovers from locally
//! without losing or duplicating a single byte.
//!
//! ```
//! use shquote::{StreamOptions, escape_stream};
//!
//! let mut out = Vec::new();
//! escape_stream(&b"O'Brien"[..], &mut out, StreamOptions::default()).unwrap();
//! assert_eq!(out, b"O\\'Brien");
//! ```

mod classify;
mod engine;
mod error;
mod escape;
mod options;
mod source;

pub use classify::is_printable;
pub use engine::{Engine, escape_stream};
pub use error::EngineError;
pub use options::{Encoding, EscapeOptions, EscapePolicy, StreamOptions};
pub use source::{ByteSource, RawBytes, Unit, UnitSource, Utf8Source};
