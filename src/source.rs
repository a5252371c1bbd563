//! Event source: `saphyr_parser::Parser` behind a single "next event or fail" operation.
//!
//! The parser is generic over its input; the source erases that so that string and
//! reader backed cursors share one type. Each raw parser event is translated into an
//! owned [`Event`]. Anchors and tags are dropped; aliases are rejected since alias
//! resolution is not supported.

use std::borrow::Cow;
use std::io::Read;

use saphyr_parser::{Event as RawEvent, Parser, ScanError, Span};

use crate::error::{location_from_span, Error, Location};
use crate::event::Event;
use crate::reader_input::{reader_input, IoErrorSlot};

type RawItem<'input> = Result<(RawEvent<'input>, Span), ScanError>;

pub(crate) struct EventSource<'input> {
    parser: Box<dyn Iterator<Item = RawItem<'input>> + 'input>,
    /// Set for reader input: the reader parks its I/O failure here.
    io_error: Option<IoErrorSlot>,
    last_location: Location,
}

impl<'input> EventSource<'input> {
    pub(crate) fn from_str(input: &'input str) -> Self {
        Self {
            parser: Box::new(Parser::new_from_str(input)),
            io_error: None,
            last_location: Location::UNKNOWN,
        }
    }

    pub(crate) fn from_reader<R: Read + 'input>(reader: R) -> Self {
        let (input, slot) = reader_input(reader);
        // Reader-backed events are 'static; shorten them to 'input item by item.
        let parser = Parser::new(input).map(|item| -> RawItem<'input> { item });
        Self {
            parser: Box::new(parser),
            io_error: Some(slot),
            last_location: Location::UNKNOWN,
        }
    }

    /// Location of the last event produced.
    pub(crate) fn last_location(&self) -> Location {
        self.last_location
    }

    /// Produce the next event. `Ok(None)` once the parser has nothing more to say.
    pub(crate) fn next_event(&mut self) -> Result<Option<Event>, Error> {
        while let Some(item) = self.parser.next() {
            let (raw, span) = match item {
                Ok(pair) => pair,
                Err(err) => {
                    // A reader failure surfaces to the parser as a premature end of input;
                    // report the cause instead of the parser's complaint.
                    self.check_io()?;
                    return Err(Error::from_scan_error(err));
                }
            };
            let location = location_from_span(&span);
            self.last_location = location;

            let ev = match raw {
                RawEvent::StreamStart => Event::StreamStart { location },
                RawEvent::StreamEnd => {
                    self.check_io()?;
                    Event::StreamEnd { location }
                }
                RawEvent::DocumentStart(_) => Event::DocumentStart { location },
                RawEvent::DocumentEnd => Event::DocumentEnd { location },
                RawEvent::MappingStart(_anchor, _tag) => Event::MapStart { location },
                RawEvent::MappingEnd => Event::MapEnd { location },
                RawEvent::SequenceStart(_anchor, _tag) => Event::SeqStart { location },
                RawEvent::SequenceEnd => Event::SeqEnd { location },
                RawEvent::Scalar(value, style, _anchor, _tag) => Event::Scalar {
                    value: match value {
                        Cow::Borrowed(v) => v.to_string(),
                        Cow::Owned(v) => v,
                    },
                    style,
                    location,
                },
                RawEvent::Alias(id) => {
                    return Err(Error::source_msg(format!(
                        "aliases are not supported (alias to anchor id {id})"
                    ))
                    .with_location(location));
                }
                RawEvent::Nothing => continue,
            };
            log::trace!("source event {} at {}:{}", ev.describe(), location.row, location.column);
            return Ok(Some(ev));
        }
        self.check_io()?;
        Ok(None)
    }

    fn check_io(&self) -> Result<(), Error> {
        if let Some(slot) = &self.io_error {
            if let Some(err) = slot.borrow_mut().take() {
                return Err(Error::from(err).with_location(self.last_location));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn drain(mut source: EventSource<'_>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(ev) = source.next_event().unwrap() {
            events.push(ev);
        }
        events
    }

    #[test]
    fn reader_and_str_sources_agree() {
        let text = "a: 1\nb: [x]\n";
        let from_str = drain(EventSource::from_str(text));
        let from_reader = drain(EventSource::from_reader(text.as_bytes()));
        assert_eq!(from_str.len(), from_reader.len());
        for (left, right) in from_str.iter().zip(&from_reader) {
            assert_eq!(left.describe(), right.describe());
            assert_eq!(left.as_scalar(), right.as_scalar());
        }
        let scalars: Vec<_> = from_reader.iter().filter_map(Event::as_scalar).collect();
        assert_eq!(scalars, ["a", "1", "b", "x"]);
        assert!(matches!(from_reader.last(), Some(Event::StreamEnd { .. })));
    }

    #[test]
    fn reader_source_borrows_a_local_reader() {
        let bytes = b"key: value\n".to_vec();
        let mut source = EventSource::from_reader(bytes.as_slice());
        assert!(matches!(source.next_event().unwrap(), Some(Event::StreamStart { .. })));
        assert!(matches!(source.next_event().unwrap(), Some(Event::DocumentStart { .. })));
        assert!(matches!(source.next_event().unwrap(), Some(Event::MapStart { .. })));
        assert_eq!(source.next_event().unwrap().as_ref().and_then(Event::as_scalar), Some("key"));
        assert!(source.last_location().is_known());
    }
}
