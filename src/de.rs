//! Visitor-driven YAML deserializer over the event cursor (no document tree).
//!
//! Maps and lists are traversed by handing each key (or index) to a caller visitor,
//! which decodes the paired value by calling back into the same [`Deserializer`]. The
//! recursion therefore follows the document's nesting exactly.
//!
//! Results:
//! - `Ok(Some(..))`: the value was decoded and the cursor moved past it.
//! - `Ok(None)`: no document content remains (benign, lets optional trailing fields be
//!   probed).
//! - `Err(..)`: failure; also kept in the last-error slot. The cursor position is
//!   undefined afterwards and the deserializer should be dropped.
//!
//! Scalars are handed out as owned values: `deserialize_string` moves the text out of
//! the current event, so the result stays valid after the cursor moves on.

use std::borrow::Cow;
use std::io::Read;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind};
use crate::event::Event;
use crate::options::{IntegerWhitespace, Options};
use crate::parse_scalars::{parse_decimal_int, parse_strict_bool};
use crate::source::EventSource;

/// What a visitor did with the value paired to its key or index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Exactly one value was consumed through the deserializer.
    Consumed,
    /// Nothing was consumed; the traversal skips the value (unknown keys).
    Skip,
}

/// Visitor for mapping entries.
///
/// Implementations must consume exactly one value per call (or return
/// [`Visit::Skip`] without consuming anything). Closures
/// `FnMut(&mut Deserializer, &str) -> Result<Visit, Error>` implement this trait.
pub trait MapVisitor<'input> {
    fn visit_entry(&mut self, de: &mut Deserializer<'input>, key: &str) -> Result<Visit, Error>;
}

/// Visitor for list items; `index` is zero-based and increases by one per item.
pub trait ListVisitor<'input> {
    fn visit_item(&mut self, de: &mut Deserializer<'input>, index: usize)
        -> Result<Visit, Error>;
}

impl<'input, F> MapVisitor<'input> for F
where
    F: FnMut(&mut Deserializer<'input>, &str) -> Result<Visit, Error>,
{
    fn visit_entry(&mut self, de: &mut Deserializer<'input>, key: &str) -> Result<Visit, Error> {
        self(de, key)
    }
}

impl<'input, F> ListVisitor<'input> for F
where
    F: FnMut(&mut Deserializer<'input>, usize) -> Result<Visit, Error>,
{
    fn visit_item(
        &mut self,
        de: &mut Deserializer<'input>,
        index: usize,
    ) -> Result<Visit, Error> {
        self(de, index)
    }
}

/// Pull-based YAML deserializer with one event of lookahead.
///
/// ```rust
/// use saphyr_cursor::{Deserializer, Visit};
///
/// let mut de = Deserializer::from_str("name: demo\nports: [80, 443]\n")?;
/// let mut name = String::new();
/// let mut ports: Vec<u16> = Vec::new();
/// de.deserialize_map(|de, key| match key {
///     "name" => {
///         name = de.deserialize_string()?.unwrap_or_default();
///         Ok(Visit::Consumed)
///     }
///     "ports" => {
///         de.deserialize_list(|de, _index| {
///             ports.extend(de.deserialize_int::<u16>()?);
///             Ok(Visit::Consumed)
///         })?;
///         Ok(Visit::Consumed)
///     }
///     _ => Ok(Visit::Skip),
/// })?;
/// de.finish()?;
/// assert_eq!(name, "demo");
/// assert_eq!(ports, vec![80, 443]);
/// # Ok::<(), saphyr_cursor::Error>(())
/// ```
pub struct Deserializer<'input> {
    cursor: Cursor<'input>,
    options: Options,
    /// Current map/list nesting.
    depth: usize,
    last_error: Option<Error>,
}

impl<'input> Deserializer<'input> {
    /// Deserializer over a YAML string.
    pub fn from_str(input: &'input str) -> Result<Self, Error> {
        Self::from_str_with_options(input, Options::default())
    }

    pub fn from_str_with_options(input: &'input str, options: Options) -> Result<Self, Error> {
        Self::new(EventSource::from_str(input), options)
    }

    /// Deserializer over UTF-8 bytes.
    pub fn from_slice(bytes: &'input [u8]) -> Result<Self, Error> {
        Self::from_slice_with_options(bytes, Options::default())
    }

    pub fn from_slice_with_options(bytes: &'input [u8], options: Options) -> Result<Self, Error> {
        let input = std::str::from_utf8(bytes)
            .map_err(|e| Error::system(format!("input is not valid UTF-8: {e}")))?;
        Self::from_str_with_options(input, options)
    }

    /// Deserializer over any reader. UTF-8 and UTF-16 (with BOM) are decoded on the fly.
    pub fn from_reader<R: Read + 'input>(reader: R) -> Result<Self, Error> {
        Self::from_reader_with_options(reader, Options::default())
    }

    pub fn from_reader_with_options<R: Read + 'input>(
        reader: R,
        options: Options,
    ) -> Result<Self, Error> {
        Self::new(EventSource::from_reader(reader), options)
    }

    fn new(source: EventSource<'input>, options: Options) -> Result<Self, Error> {
        let cursor = Cursor::new(source)?;
        Ok(Self {
            cursor,
            options,
            depth: 0,
            last_error: None,
        })
    }

    // -------- diagnostics --------

    /// The pending error, if an operation has failed.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Kind of the pending error, [`ErrorKind::NoError`] if there is none.
    pub fn error_kind(&self) -> ErrorKind {
        self.last_error
            .as_ref()
            .map_or(ErrorKind::NoError, Error::kind)
    }

    /// Message for the pending error.
    pub fn strerror(&self) -> Cow<'_, str> {
        match &self.last_error {
            Some(err) => err.strerror(),
            None => crate::error::message(ErrorKind::NoError, None),
        }
    }

    fn record<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(err) = &result {
            self.last_error = Some(err.clone());
        }
        result
    }

    // -------- cursor access --------

    /// The event the next decode call will inspect.
    pub fn current_event(&self) -> &Event {
        self.cursor.current()
    }

    /// The event after [`Self::current_event`], without consuming anything.
    pub fn peek_event(&mut self) -> Result<&Event, Error> {
        match self.cursor.peek() {
            Ok(ev) => Ok(ev),
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// True when no document content remains.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.current().is_exhausted()
    }

    // -------- traversal --------

    /// Traverse a mapping, calling `visit` once per key.
    ///
    /// Returns the number of entries visited, or `None` when the document is exhausted.
    /// Keys must be scalars. A visitor failure aborts the traversal with
    /// [`ErrorKind::CallbackSignaledError`]; later keys are not visited.
    pub fn deserialize_map<F>(&mut self, visit: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&mut Deserializer<'input>, &str) -> Result<Visit, Error>,
    {
        let result = self.map_impl(visit);
        self.record(result)
    }

    /// [`Self::deserialize_map`] with a visitor object.
    pub fn visit_map<V>(&mut self, visitor: &mut V) -> Result<Option<usize>, Error>
    where
        V: MapVisitor<'input> + ?Sized,
    {
        self.deserialize_map(|de, key| visitor.visit_entry(de, key))
    }

    /// Traverse a sequence, calling `visit` once per item with its zero-based index.
    ///
    /// Returns the number of items visited, or `None` when the document is exhausted.
    pub fn deserialize_list<F>(&mut self, visit: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&mut Deserializer<'input>, usize) -> Result<Visit, Error>,
    {
        let result = self.list_impl(visit);
        self.record(result)
    }

    /// [`Self::deserialize_list`] with a visitor object.
    pub fn visit_list<V>(&mut self, visitor: &mut V) -> Result<Option<usize>, Error>
    where
        V: ListVisitor<'input> + ?Sized,
    {
        self.deserialize_list(|de, index| visitor.visit_item(de, index))
    }

    fn map_impl<F>(&mut self, visit: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&mut Deserializer<'input>, &str) -> Result<Visit, Error>,
    {
        match self.cursor.current() {
            ev if ev.is_exhausted() => return Ok(None),
            Event::MapStart { .. } => {}
            other => {
                return Err(Error::unexpected("mapping start", other.describe())
                    .with_location(other.location()));
            }
        }
        self.enter()?;
        let result = self.map_entries(visit);
        self.leave();
        result
    }

    /// Walks the mapping the cursor sits on; depth accounting is done by the caller.
    fn map_entries<F>(&mut self, mut visit: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&mut Deserializer<'input>, &str) -> Result<Visit, Error>,
    {
        let start = self.cursor.location();
        log::debug!("mapping at {}:{}", start.row, start.column);
        self.cursor.advance()?;

        let mut entries = 0usize;
        loop {
            let key_location = self.cursor.location();
            let key = match self.cursor.current() {
                Event::MapEnd { .. } => break,
                Event::Scalar { .. } => self.cursor.take_scalar()?,
                other => {
                    return Err(Error::unexpected("scalar mapping key", other.describe())
                        .with_location(key_location));
                }
            };
            let position = self.cursor.position();
            match visit(self, &key) {
                Ok(Visit::Consumed) => {
                    if self.cursor.position() == position {
                        return Err(Error::unexpected(
                            "value consumed by the visitor",
                            self.cursor.current().describe(),
                        )
                        .with_location(self.cursor.location()));
                    }
                }
                Ok(Visit::Skip) => {
                    log::trace!("skipping value of key `{key}`");
                    self.skip_impl()?;
                }
                Err(err) => {
                    log::debug!("visitor failed on key `{key}`: {err}");
                    return Err(Error::callback(format!("key `{key}`"), err, key_location));
                }
            }
            entries += 1;
        }

        self.cursor.advance()?;
        log::debug!("mapping at {}:{} done, {entries} entries", start.row, start.column);
        Ok(Some(entries))
    }

    fn list_impl<F>(&mut self, visit: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&mut Deserializer<'input>, usize) -> Result<Visit, Error>,
    {
        match self.cursor.current() {
            ev if ev.is_exhausted() => return Ok(None),
            Event::SeqStart { .. } => {}
            other => {
                return Err(Error::unexpected("sequence start", other.describe())
                    .with_location(other.location()));
            }
        }
        self.enter()?;
        let result = self.list_items(visit);
        self.leave();
        result
    }

    /// Walks the sequence the cursor sits on; depth accounting is done by the caller.
    fn list_items<F>(&mut self, mut visit: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&mut Deserializer<'input>, usize) -> Result<Visit, Error>,
    {
        let start = self.cursor.location();
        log::debug!("sequence at {}:{}", start.row, start.column);
        self.cursor.advance()?;

        let mut index = 0usize;
        while !matches!(self.cursor.current(), Event::SeqEnd { .. }) {
            if self.cursor.current().is_exhausted() {
                return Err(Error::unexpected("sequence end", self.cursor.current().describe())
                    .with_location(self.cursor.location()));
            }
            let item_location = self.cursor.location();
            let position = self.cursor.position();
            match visit(self, index) {
                Ok(Visit::Consumed) => {
                    if self.cursor.position() == position {
                        return Err(Error::unexpected(
                            "value consumed by the visitor",
                            self.cursor.current().describe(),
                        )
                        .with_location(item_location));
                    }
                }
                Ok(Visit::Skip) => self.skip_impl()?,
                Err(err) => {
                    log::debug!("visitor failed on index {index}: {err}");
                    return Err(Error::callback(format!("index {index}"), err, item_location));
                }
            }
            index += 1;
        }

        self.cursor.advance()?;
        log::debug!("sequence at {}:{} done, {index} items", start.row, start.column);
        Ok(Some(index))
    }

    fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= self.options.max_depth {
            return Err(Error::system(format!(
                "nesting depth limit of {} exceeded",
                self.options.max_depth
            ))
            .with_location(self.cursor.location()));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Consume one value of any shape: a scalar or a whole nested mapping/sequence.
    pub fn skip_value(&mut self) -> Result<Option<()>, Error> {
        if self.cursor.current().is_exhausted() {
            return Ok(None);
        }
        let result = self.skip_impl().map(Some);
        self.record(result)
    }

    fn skip_impl(&mut self) -> Result<(), Error> {
        let mut depth = 0usize;
        loop {
            match self.cursor.current() {
                Event::Scalar { .. } => {}
                Event::MapStart { .. } | Event::SeqStart { .. } => depth += 1,
                Event::MapEnd { .. } | Event::SeqEnd { .. } if depth > 0 => depth -= 1,
                other => {
                    return Err(Error::unexpected("value", other.describe())
                        .with_location(other.location()));
                }
            }
            self.cursor.advance()?;
            if depth == 0 {
                return Ok(());
            }
        }
    }

    // -------- scalars --------

    /// Check that `current` is a scalar. `Ok(false)` when the document is exhausted.
    fn expect_scalar(&self) -> Result<bool, Error> {
        match self.cursor.current() {
            Event::Scalar { .. } => Ok(true),
            ev if ev.is_exhausted() => Ok(false),
            other => Err(Error::unexpected("scalar", other.describe())
                .with_location(other.location())),
        }
    }

    /// Decode a boolean. Only the exact texts `true` and `false` are accepted.
    pub fn deserialize_bool(&mut self) -> Result<Option<bool>, Error> {
        let result = self.bool_impl();
        self.record(result)
    }

    fn bool_impl(&mut self) -> Result<Option<bool>, Error> {
        if !self.expect_scalar()? {
            return Ok(None);
        }
        let location = self.cursor.location();
        let text = self.cursor.current().as_scalar().unwrap_or_default();
        let value = parse_strict_bool(text)
            .ok_or_else(|| Error::invalid_boolean(text).with_location(location))?;
        self.cursor.advance()?;
        Ok(Some(value))
    }

    /// Decode a base-10 integer into any integer type.
    ///
    /// Accepts an optional sign followed by ASCII digits; anything else (including
    /// `12a` or a value out of range for `T`) is a [`ErrorKind::SystemError`].
    /// Surrounding whitespace follows [`Options::integer_whitespace`].
    pub fn deserialize_int<T>(&mut self) -> Result<Option<T>, Error>
    where
        T: TryFrom<i128>,
    {
        let result = self.int_impl::<T>();
        self.record(result)
    }

    /// [`Self::deserialize_int`] for `i32`.
    pub fn deserialize_i32(&mut self) -> Result<Option<i32>, Error> {
        self.deserialize_int::<i32>()
    }

    fn int_impl<T>(&mut self) -> Result<Option<T>, Error>
    where
        T: TryFrom<i128>,
    {
        if !self.expect_scalar()? {
            return Ok(None);
        }
        let location = self.cursor.location();
        let text = self.cursor.current().as_scalar().unwrap_or_default();
        let text = match self.options.integer_whitespace {
            IntegerWhitespace::Reject => text,
            IntegerWhitespace::Trim => text.trim_matches(|c: char| c.is_ascii_whitespace()),
        };
        let value = parse_decimal_int::<T>(text, std::any::type_name::<T>())
            .map_err(|msg| Error::system(msg).with_location(location))?;
        self.cursor.advance()?;
        Ok(Some(value))
    }

    /// Decode a string. The text is moved out to the caller, who owns it.
    pub fn deserialize_string(&mut self) -> Result<Option<String>, Error> {
        let result = match self.expect_scalar() {
            Ok(true) => self.cursor.take_scalar().map(Some),
            Ok(false) => Ok(None),
            Err(err) => Err(err),
        };
        self.record(result)
    }

    // -------- end of input --------

    /// Verify that the document is complete and that no second document follows.
    ///
    /// Call after the root value has been decoded.
    pub fn finish(&mut self) -> Result<(), Error> {
        let result = self.finish_impl();
        self.record(result)
    }

    fn finish_impl(&mut self) -> Result<(), Error> {
        loop {
            match self.cursor.current() {
                Event::StreamEnd { .. } => return Ok(()),
                Event::DocumentEnd { .. } => {
                    if let Event::DocumentStart { location } = self.cursor.peek()? {
                        return Err(Error::unexpected(
                            "end of stream (multiple documents are not supported)",
                            "document start",
                        )
                        .with_location(*location));
                    }
                    self.cursor.advance()?;
                }
                other => {
                    return Err(Error::unexpected("end of document", other.describe())
                        .with_location(other.location()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn scalar_root_decodes_then_exhausts() {
        let mut de = Deserializer::from_str("42\n").unwrap();
        assert_eq!(de.deserialize_int::<i64>().unwrap(), Some(42));
        assert!(de.is_exhausted());
        // probing past the end is benign
        assert_eq!(de.deserialize_int::<i64>().unwrap(), None);
        assert_eq!(de.deserialize_bool().unwrap(), None);
        assert_eq!(de.deserialize_string().unwrap(), None);
        assert_eq!(de.error_kind(), ErrorKind::NoError);
        de.finish().unwrap();
    }

    #[test]
    fn failures_land_in_last_error_slot() {
        let mut de = Deserializer::from_str("maybe").unwrap();
        let err = de.deserialize_bool().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBooleanToken);
        assert_eq!(de.error_kind(), ErrorKind::InvalidBooleanToken);
        assert_eq!(de.strerror(), "invalid boolean token, expected `true` or `false`");
    }

    #[test]
    fn visitor_that_consumes_nothing_is_caught() {
        let mut de = Deserializer::from_str("a: 1\nb: 2\n").unwrap();
        let err = de
            .deserialize_map(|_de, _key| Ok(Visit::Consumed))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    }

    #[test]
    fn skip_consumes_nested_values() {
        let mut de = Deserializer::from_str("a: {x: [1, {y: 2}]}\nb: 3\n").unwrap();
        let mut b = None;
        let visited = de
            .deserialize_map(|de, key| {
                if key == "b" {
                    b = de.deserialize_int::<i32>()?;
                    Ok(Visit::Consumed)
                } else {
                    Ok(Visit::Skip)
                }
            })
            .unwrap();
        assert_eq!(visited, Some(2));
        assert_eq!(b, Some(3));
        de.finish().unwrap();
    }

    #[test]
    fn depth_limit_stops_recursion() {
        fn nested(de: &mut Deserializer<'_>) -> Result<Visit, Error> {
            de.deserialize_list(|de, _| nested(de))?;
            Ok(Visit::Consumed)
        }
        let options = Options {
            max_depth: 3,
            ..Options::default()
        };
        let mut de = Deserializer::from_str_with_options("[[[[1]]]]", options).unwrap();
        let err = nested(&mut de).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CallbackSignaledError);
        let mut inner = &err;
        while let Some(cause) = inner.cause() {
            inner = cause;
        }
        assert_eq!(inner.kind(), ErrorKind::SystemError);
    }

    #[test]
    fn failed_traversals_release_depth() {
        let mut de = Deserializer::from_str("a: [1, x]\nb: {c: 2}\n").unwrap();
        let err = de
            .deserialize_map(|de, _| {
                de.deserialize_list(|de, _| {
                    de.deserialize_int::<i32>()?;
                    Ok(Visit::Consumed)
                })?;
                Ok(Visit::Consumed)
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CallbackSignaledError);
        assert_eq!(de.depth, 0);

        let mut de = Deserializer::from_str("[{a: 1}, 2]").unwrap();
        de.deserialize_list(|de, _| {
            de.deserialize_map(|_, _| Ok(Visit::Skip))?;
            Ok(Visit::Consumed)
        })
        .unwrap_err();
        assert_eq!(de.depth, 0);
    }

    #[test]
    fn peek_event_looks_past_current() {
        let mut de = Deserializer::from_str("[1, 2]").unwrap();
        assert!(matches!(de.current_event(), Event::SeqStart { .. }));
        assert_eq!(de.peek_event().unwrap().as_scalar(), Some("1"));
        assert_eq!(de.peek_event().unwrap().as_scalar(), Some("1"));
        let mut items = Vec::new();
        de.deserialize_list(|de, _| {
            items.extend(de.deserialize_int::<u8>()?);
            Ok(Visit::Consumed)
        })
        .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn second_document_is_rejected_by_finish() {
        let mut de = Deserializer::from_str("--- 1\n--- 2\n").unwrap();
        assert_eq!(de.deserialize_int::<i32>().unwrap(), Some(1));
        let err = de.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    }

    #[test]
    fn trailing_content_is_rejected_by_finish() {
        let mut de = Deserializer::from_str("[1, 2]").unwrap();
        let err = de.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    }
}
