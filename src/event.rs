//! Owned document events exchanged with the event source and the emitter.
//!
//! Read side: [`Event`] is the simplified, owned form of `saphyr_parser::Event`. Stream
//! and document markers are kept (the cursor strips the leading ones) so that the end
//! of a document is observable. Anchors and tags are dropped; aliases never reach
//! this type (the source rejects them).
//!
//! Write side: [`Emit`] is one emission command accepted by the [`crate::emitter::Emitter`].

use saphyr_parser::ScalarStyle;

use crate::error::Location;

/// One unit of document structure, as produced by the event source.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Start of the event stream.
    StreamStart { location: Location },
    /// End of the event stream. Once reached it is returned forever.
    StreamEnd { location: Location },
    /// Start of a document (`---` or implicit).
    DocumentStart { location: Location },
    /// End of a document (`...` or implicit).
    DocumentEnd { location: Location },
    /// Start of a mapping (`{` or block mapping).
    MapStart { location: Location },
    /// End of a mapping.
    MapEnd { location: Location },
    /// Start of a sequence (`[` / `-`-list).
    SeqStart { location: Location },
    /// End of a sequence.
    SeqEnd { location: Location },
    /// Scalar value with the style it was written in.
    Scalar {
        value: String,
        style: ScalarStyle,
        location: Location,
    },
}

impl Event {
    /// Get the source location attached to this event.
    pub fn location(&self) -> Location {
        match self {
            Event::StreamStart { location }
            | Event::StreamEnd { location }
            | Event::DocumentStart { location }
            | Event::DocumentEnd { location }
            | Event::MapStart { location }
            | Event::MapEnd { location }
            | Event::SeqStart { location }
            | Event::SeqEnd { location }
            | Event::Scalar { location, .. } => *location,
        }
    }

    /// Short human name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Event::StreamStart { .. } => "stream start",
            Event::StreamEnd { .. } => "stream end",
            Event::DocumentStart { .. } => "document start",
            Event::DocumentEnd { .. } => "document end",
            Event::MapStart { .. } => "mapping start",
            Event::MapEnd { .. } => "mapping end",
            Event::SeqStart { .. } => "sequence start",
            Event::SeqEnd { .. } => "sequence end",
            Event::Scalar { .. } => "scalar",
        }
    }

    /// Stream/document start framing that the cursor hides from traversal code.
    pub(crate) fn is_leading_framing(&self) -> bool {
        matches!(self, Event::StreamStart { .. } | Event::DocumentStart { .. })
    }

    /// True when no document content remains: the cursor is exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Event::StreamEnd { .. } | Event::DocumentEnd { .. })
    }

    /// Scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Event::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Emission command accepted by the emitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emit<'a> {
    StreamStart,
    StreamEnd,
    /// Document start with an explicit `%YAML major.minor` directive.
    DocumentStart { version: (u8, u8) },
    /// Explicit document end (`...`).
    DocumentEnd,
    MapStart,
    MapEnd,
    SeqStart,
    SeqEnd,
    /// Scalar with the requested style. The emitter may pick a stronger quoting style
    /// when the requested one cannot carry the text.
    Scalar { value: &'a str, style: ScalarStyle },
}

impl Emit<'_> {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Emit::StreamStart => "stream start",
            Emit::StreamEnd => "stream end",
            Emit::DocumentStart { .. } => "document start",
            Emit::DocumentEnd => "document end",
            Emit::MapStart => "mapping start",
            Emit::MapEnd => "mapping end",
            Emit::SeqStart => "sequence start",
            Emit::SeqEnd => "sequence end",
            Emit::Scalar { .. } => "scalar",
        }
    }
}
