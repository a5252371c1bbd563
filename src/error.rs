//! Defines the shared error taxonomy and source locations.
//!
//! Both directions (reading with [`crate::Deserializer`] and writing with
//! [`crate::Serializer`]) report failures through the same [`Error`] type. Every
//! error resolves to exactly one [`ErrorKind`], and [`message`] turns a kind into a
//! human-readable text.
use std::borrow::Cow;
use std::fmt;
use std::io;

use saphyr_parser::{ScanError, Span};
use serde::{Deserialize, Serialize};

/// Row/column location within the source YAML document (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) row: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used for errors raised on the serializer side and before the first event is read.
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    pub(crate) const fn new(row: usize, column: usize) -> Self {
        // Error reporting only; documents beyond 4G lines saturate.
        Self {
            row: if row > u32::MAX as usize { u32::MAX } else { row as u32 },
            column: if column > u32::MAX as usize { u32::MAX } else { column as u32 },
        }
    }

    /// 1-indexed line number (0 if unknown).
    pub fn line(&self) -> u64 {
        self.row as u64
    }

    /// 1-indexed column number (0 if unknown).
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    /// Whether this location points somewhere in the input.
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed `Location`.
pub(crate) fn location_from_span(span: &Span) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

/// Closed set of failure kinds shared by the deserializer and the serializer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No error is pending.
    NoError,
    /// The event source or sink failed; carries the engine's own diagnostic text.
    UnknownSourceOrSinkError,
    /// A platform level failure such as a failed numeric conversion or I/O.
    SystemError,
    /// An accessor was used on an instance configured for a different output target.
    WrongTarget,
    /// Structural mismatch between the requested operation and the next event.
    UnexpectedEvent,
    /// A scalar was decoded as boolean but is neither `true` nor `false`.
    InvalidBooleanToken,
    /// A map or list visitor reported failure.
    CallbackSignaledError,
}

/// Resolve an error kind to a human-readable message.
///
/// The two wrapping kinds (`UnknownSourceOrSinkError`, `SystemError`) return the
/// wrapped engine or platform text when one is supplied.
pub fn message(kind: ErrorKind, wrapped: Option<&str>) -> Cow<'_, str> {
    match (kind, wrapped) {
        (ErrorKind::UnknownSourceOrSinkError | ErrorKind::SystemError, Some(text)) => {
            Cow::Borrowed(text)
        }
        (ErrorKind::NoError, _) => Cow::Borrowed("no error"),
        (ErrorKind::UnknownSourceOrSinkError, None) => {
            Cow::Borrowed("unknown error in the YAML event source or sink")
        }
        (ErrorKind::SystemError, None) => Cow::Borrowed("system error"),
        (ErrorKind::WrongTarget, _) => {
            Cow::Borrowed("serializer is the wrong type for the operation")
        }
        (ErrorKind::UnexpectedEvent, _) => Cow::Borrowed("unexpected event"),
        (ErrorKind::InvalidBooleanToken, _) => {
            Cow::Borrowed("invalid boolean token, expected `true` or `false`")
        }
        (ErrorKind::CallbackSignaledError, _) => Cow::Borrowed("visitor signaled an error"),
    }
}

/// Error returned by every fallible operation of this crate.
///
/// The type is `Clone` so that an instance can keep a copy in its last-error slot
/// while the same error is returned to the caller.
#[derive(Clone, Debug)]
pub enum Error {
    /// The YAML parser or the emitter rejected the input or the emission command.
    Source { msg: String, location: Location },
    /// A platform failure: integer parse error, invalid UTF-8, I/O failure.
    System { msg: String, location: Location },
    /// The serializer writes to a different target than the accessor requires.
    WrongTarget { expected: &'static str },
    /// Structure mismatch: something other than the expected event was seen.
    Unexpected {
        expected: &'static str,
        found: &'static str,
        location: Location,
    },
    /// Scalar text is not an exact-case `true` or `false`.
    InvalidBoolean { token: String, location: Location },
    /// A visitor failed while handling the entry named by `entry`.
    Callback {
        entry: String,
        cause: Option<Box<Error>>,
        msg: Option<String>,
        location: Location,
    },
}

impl Error {
    /// Error a visitor returns to abort a traversal.
    ///
    /// The enclosing `deserialize_map`/`deserialize_list` call reports it as
    /// [`ErrorKind::CallbackSignaledError`].
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Callback {
            entry: String::new(),
            cause: None,
            msg: Some(msg.into()),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn source_msg<S: Into<String>>(msg: S) -> Self {
        Error::Source {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn system<S: Into<String>>(msg: S) -> Self {
        Error::System {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn unexpected(expected: &'static str, found: &'static str) -> Self {
        Error::Unexpected {
            expected,
            found,
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn invalid_boolean(token: &str) -> Self {
        Error::InvalidBoolean {
            token: token.to_string(),
            location: Location::UNKNOWN,
        }
    }

    /// Wrap a visitor failure for the entry `entry`. Errors that already went
    /// through a traversal are passed on unchanged so that nesting does not pile up
    /// wrappers.
    pub(crate) fn callback(entry: String, cause: Error, location: Location) -> Self {
        match cause {
            Error::Callback {
                entry: inner_entry,
                cause,
                msg,
                location: inner_location,
            } if inner_entry.is_empty() => Error::Callback {
                entry,
                cause,
                msg,
                location: if inner_location.is_known() {
                    inner_location
                } else {
                    location
                },
            },
            already @ Error::Callback { .. } => already,
            other => Error::Callback {
                entry,
                cause: Some(Box::new(other)),
                msg: None,
                location,
            },
        }
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        Error::Source {
            msg: err.info().to_owned(),
            location: Location::new(mark.line(), mark.col() + 1),
        }
    }

    /// Attach/override a concrete location to this error and return it.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Source { location, .. }
            | Error::System { location, .. }
            | Error::Unexpected { location, .. }
            | Error::InvalidBoolean { location, .. }
            | Error::Callback { location, .. } => {
                *location = set_location;
            }
            Error::WrongTarget { .. } => {}
        }
        self
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Source { .. } => ErrorKind::UnknownSourceOrSinkError,
            Error::System { .. } => ErrorKind::SystemError,
            Error::WrongTarget { .. } => ErrorKind::WrongTarget,
            Error::Unexpected { .. } => ErrorKind::UnexpectedEvent,
            Error::InvalidBoolean { .. } => ErrorKind::InvalidBooleanToken,
            Error::Callback { .. } => ErrorKind::CallbackSignaledError,
        }
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Source { location, .. }
            | Error::System { location, .. }
            | Error::Unexpected { location, .. }
            | Error::InvalidBoolean { location, .. }
            | Error::Callback { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::WrongTarget { .. } => None,
        }
    }

    /// The error a visitor originally returned, for callback-signaled errors.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Error::Callback { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }

    /// Human-readable message for the error kind; the wrapping kinds yield the
    /// engine or platform text.
    pub fn strerror(&self) -> Cow<'_, str> {
        match self {
            Error::Source { msg, .. } | Error::System { msg, .. } => {
                message(self.kind(), Some(msg.as_str()))
            }
            _ => message(self.kind(), None),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Source { msg, location } | Error::System { msg, location } => {
                fmt_with_location(f, msg, location)
            }
            Error::WrongTarget { expected } => write!(
                f,
                "{}: this operation requires {expected}",
                message(ErrorKind::WrongTarget, None)
            ),
            Error::Unexpected {
                expected,
                found,
                location,
            } => fmt_with_location(
                f,
                &format!("unexpected event: expected {expected}, found {found}"),
                location,
            ),
            Error::InvalidBoolean { token, location } => fmt_with_location(
                f,
                &format!("{}, found `{token}`", message(ErrorKind::InvalidBooleanToken, None)),
                location,
            ),
            Error::Callback {
                entry,
                cause,
                msg,
                location,
            } => {
                let mut text = message(ErrorKind::CallbackSignaledError, None).into_owned();
                if !entry.is_empty() {
                    text.push_str(&format!(" at {entry}"));
                }
                if let Some(msg) = msg {
                    text.push_str(": ");
                    text.push_str(msg);
                } else if let Some(cause) = cause {
                    text.push_str(&format!(": {cause}"));
                    // The cause already reports where it happened.
                    return f.write_str(&text);
                }
                fmt_with_location(f, &text, location)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Callback {
                cause: Some(cause), ..
            } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::system(format!("I/O error: {error}"))
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_known() {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.row, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}
