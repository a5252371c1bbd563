//! Streaming YAML reading and writing without a document tree.
//!
//! [`Deserializer`] walks a YAML document through a cursor over the parser's event
//! stream, holding one current event and at most one lookahead event. Mappings and
//! sequences are traversed with caller supplied visitors that decode each value by
//! calling back into the deserializer.
//!
//! [`Serializer`] is the mirror image: the caller pushes the document structure one
//! call at a time and the YAML text is written to an [`OutputTarget`].
//!
//! ```rust
//! use saphyr_cursor::{Deserializer, Serializer, Visit};
//!
//! let mut ser = Serializer::new();
//! ser.start()?;
//! ser.map_start()?;
//! ser.map_key("enabled")?;
//! ser.emit_bool(true)?;
//! ser.map_end()?;
//! ser.end()?;
//! let yaml = ser.into_string();
//!
//! let mut enabled = None;
//! let mut de = Deserializer::from_str(&yaml)?;
//! de.deserialize_map(|de, key| match key {
//!     "enabled" => {
//!         enabled = de.deserialize_bool()?;
//!         Ok(Visit::Consumed)
//!     }
//!     _ => Ok(Visit::Skip),
//! })?;
//! de.finish()?;
//! assert_eq!(enabled, Some(true));
//! # Ok::<(), saphyr_cursor::Error>(())
//! ```
#![forbid(unsafe_code)]

mod cursor;
mod de;
mod emitter;
mod error;
mod event;
mod macros;
mod options;
mod output;
mod parse_scalars;
mod quoting;
mod reader_input;
mod ser;
mod source;

pub use de::{Deserializer, ListVisitor, MapVisitor, Visit};
pub use error::{message, Error, ErrorKind, Location};
pub use event::Event;
pub use options::{IntegerWhitespace, Options, SerializerOptions};
pub use output::{OutputTarget, StringTarget, WriterTarget};
pub use saphyr_parser::ScalarStyle;
pub use ser::{Integer, Serializer};
