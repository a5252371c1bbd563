//! Push-based YAML serializer.
//!
//! The caller drives the document shape with explicit calls:
//! `start` -> values -> `end`, where a value is a scalar (`emit_bool`, `emit_int`,
//! `emit_string`), a mapping (`map_start`, then `map_key` + value pairs, then
//! `map_end`) or a sequence (`list_start`, values, `list_end`).
//!
//! ```rust
//! use saphyr_cursor::Serializer;
//!
//! let mut ser = Serializer::new();
//! ser.start()?;
//! ser.map_start()?;
//! ser.map_key("name")?;
//! ser.emit_string("demo")?;
//! ser.map_key("ports")?;
//! ser.list_start()?;
//! ser.emit_int(80)?;
//! ser.emit_int(443)?;
//! ser.list_end()?;
//! ser.map_end()?;
//! ser.end()?;
//! assert_eq!(
//!     ser.borrow_string()?,
//!     "%YAML 1.1\n---\nname: 'demo'\nports:\n- 80\n- 443\n...\n"
//! );
//! # Ok::<(), saphyr_cursor::Error>(())
//! ```
//!
//! The emitter rejects calls that break the structure (a value without a key, an
//! unbalanced end, a second root). Failures are returned and also kept in the
//! last-error slot; output already written is not rolled back.

use std::borrow::Cow;
use std::fmt;
use std::io;

use saphyr_parser::ScalarStyle;

use crate::emitter::Emitter;
use crate::error::{Error, ErrorKind};
use crate::event::Emit;
use crate::options::SerializerOptions;
use crate::output::{OutputTarget, StringTarget, WriterTarget};

mod sealed {
    pub trait Sealed {}
}

/// Primitive integer types accepted by [`Serializer::emit_int`].
pub trait Integer: fmt::Display + Copy + sealed::Sealed {}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Integer for $ty {}
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// YAML serializer writing to an [`OutputTarget`] (an in-memory string by default).
pub struct Serializer<T: OutputTarget = StringTarget> {
    emitter: Emitter<T>,
    options: SerializerOptions,
    last_error: Option<Error>,
}

impl Serializer<StringTarget> {
    /// Serializer writing to a growable string, with default options.
    pub fn new() -> Self {
        Self::build(StringTarget::new(), SerializerOptions::default())
    }

    pub fn with_options(options: SerializerOptions) -> Result<Self, Error> {
        Self::with_target_and_options(StringTarget::new(), options)
    }

    /// Take the accumulated YAML text.
    pub fn into_string(self) -> String {
        self.into_target().into_string()
    }
}

impl Default for Serializer<StringTarget> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: io::Write> Serializer<WriterTarget<W>> {
    /// Serializer streaming into `writer`.
    pub fn to_writer(writer: W) -> Self {
        Self::with_target(WriterTarget::new(writer))
    }

    pub fn to_writer_with_options(writer: W, options: SerializerOptions) -> Result<Self, Error> {
        Self::with_target_and_options(WriterTarget::new(writer), options)
    }
}

impl<T: OutputTarget> Serializer<T> {
    pub fn with_target(target: T) -> Self {
        Self::build(target, SerializerOptions::default())
    }

    /// Serializer over `target`. Fails if `options` are inconsistent.
    pub fn with_target_and_options(target: T, options: SerializerOptions) -> Result<Self, Error> {
        options.consistent()?;
        Ok(Self::build(target, options))
    }

    fn build(target: T, options: SerializerOptions) -> Self {
        Self {
            emitter: Emitter::new(target, &options),
            options,
            last_error: None,
        }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Output produced so far. Only string targets keep their output;
    /// any other target yields [`ErrorKind::WrongTarget`].
    pub fn borrow_string(&mut self) -> Result<&str, Error> {
        match self.emitter.target().as_str() {
            Some(text) => Ok(text),
            None => {
                let err = Error::WrongTarget {
                    expected: "a string output target",
                };
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Release the output target.
    pub fn into_target(self) -> T {
        self.emitter.into_target()
    }

    // -------- diagnostics --------

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Kind of the pending error, [`ErrorKind::NoError`] if there is none.
    pub fn error_kind(&self) -> ErrorKind {
        self.last_error
            .as_ref()
            .map_or(ErrorKind::NoError, Error::kind)
    }

    pub fn strerror(&self) -> Cow<'_, str> {
        match &self.last_error {
            Some(err) => err.strerror(),
            None => crate::error::message(ErrorKind::NoError, None),
        }
    }

    fn emit(&mut self, ev: Emit<'_>) -> Result<(), Error> {
        let result = self.emitter.emit(ev);
        if let Err(err) = &result {
            self.last_error = Some(err.clone());
        }
        result
    }

    // -------- framing --------

    /// Open the stream and the single document (`%YAML 1.1` directive and `---`).
    pub fn start(&mut self) -> Result<(), Error> {
        self.emit(Emit::StreamStart)?;
        self.emit(Emit::DocumentStart {
            version: self.options.version,
        })
    }

    /// Close the document (`...`) and the stream, then flush the target.
    pub fn end(&mut self) -> Result<(), Error> {
        self.emit(Emit::DocumentEnd)?;
        self.emit(Emit::StreamEnd)
    }

    // -------- containers --------

    pub fn map_start(&mut self) -> Result<(), Error> {
        self.emit(Emit::MapStart)
    }

    /// Write a mapping key. The next call must produce its value.
    pub fn map_key(&mut self, key: &str) -> Result<(), Error> {
        self.emit(Emit::Scalar {
            value: key,
            style: ScalarStyle::Plain,
        })
    }

    pub fn map_end(&mut self) -> Result<(), Error> {
        self.emit(Emit::MapEnd)
    }

    pub fn list_start(&mut self) -> Result<(), Error> {
        self.emit(Emit::SeqStart)
    }

    pub fn list_end(&mut self) -> Result<(), Error> {
        self.emit(Emit::SeqEnd)
    }

    // -------- scalars --------

    /// Plain `true` or `false`.
    pub fn emit_bool(&mut self, value: bool) -> Result<(), Error> {
        self.emit(Emit::Scalar {
            value: if value { "true" } else { "false" },
            style: ScalarStyle::Plain,
        })
    }

    /// Plain base-10 integer.
    pub fn emit_int<I: Integer>(&mut self, value: I) -> Result<(), Error> {
        let text = value.to_string();
        self.emit(Emit::Scalar {
            value: &text,
            style: ScalarStyle::Plain,
        })
    }

    /// Quoted string, so that the text never reads back as a number, bool or null.
    pub fn emit_string(&mut self, value: &str) -> Result<(), Error> {
        self.emit(Emit::Scalar {
            value,
            style: ScalarStyle::SingleQuoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn writes_the_reference_document() {
        let mut ser = Serializer::new();
        ser.start().unwrap();
        ser.map_start().unwrap();
        ser.map_key("test").unwrap();
        ser.emit_bool(true).unwrap();
        ser.map_key("a_number").unwrap();
        ser.emit_int(1).unwrap();
        ser.map_key("a_string").unwrap();
        ser.emit_string("test").unwrap();
        ser.map_key("list_of_four").unwrap();
        ser.list_start().unwrap();
        for i in 1..=4u8 {
            ser.emit_int(i).unwrap();
        }
        ser.list_end().unwrap();
        ser.map_end().unwrap();
        ser.end().unwrap();
        assert_eq!(ser.error_kind(), ErrorKind::NoError);
        assert_eq!(
            ser.into_string(),
            "%YAML 1.1\n---\ntest: true\na_number: 1\na_string: 'test'\nlist_of_four:\n- 1\n- 2\n- 3\n- 4\n...\n"
        );
    }

    #[test]
    fn borrow_string_requires_string_target() {
        let mut ser = Serializer::to_writer(Vec::new());
        ser.start().unwrap();
        ser.emit_string("x").unwrap();
        ser.end().unwrap();
        let err = ser.borrow_string().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongTarget);
        assert_eq!(ser.error_kind(), ErrorKind::WrongTarget);
        let bytes = ser.into_target().into_inner();
        assert_eq!(String::from_utf8(bytes).unwrap(), "%YAML 1.1\n--- 'x'\n...\n");
    }

    #[test]
    fn rejected_emission_is_recorded() {
        let mut ser = Serializer::new();
        ser.start().unwrap();
        ser.map_start().unwrap();
        ser.map_key("k").unwrap();
        let err = ser.map_end().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSourceOrSinkError);
        assert_eq!(ser.error_kind(), ErrorKind::UnknownSourceOrSinkError);
        assert!(ser.strerror().contains("no value"));
    }

    #[test]
    fn indent_step_applies_to_nested_maps() {
        let options = crate::serializer_options! { indent_step: 4 };
        let mut ser = Serializer::with_options(options).unwrap();
        ser.start().unwrap();
        ser.map_start().unwrap();
        ser.map_key("outer").unwrap();
        ser.map_start().unwrap();
        ser.map_key("inner").unwrap();
        ser.emit_int(-7i64).unwrap();
        ser.map_end().unwrap();
        ser.map_end().unwrap();
        ser.end().unwrap();
        assert_eq!(
            ser.borrow_string().unwrap(),
            "%YAML 1.1\n---\nouter:\n    inner: -7\n...\n"
        );
    }
}
