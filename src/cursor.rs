//! Event cursor: one current event plus at most one buffered lookahead event.
//!
//! `current` is the event the decoding operations inspect. After construction it is
//! never stream or document start framing: [`Cursor::prepare`] strips that. The
//! lookahead slot lets callers decide what follows `current` without consuming it.
//!
//! Ownership: events move source -> lookahead -> current and are dropped when
//! `current` is replaced. Nothing is cloned.

use crate::error::{Error, Location};
use crate::event::Event;
use crate::source::EventSource;

pub(crate) struct Cursor<'input> {
    source: EventSource<'input>,
    current: Event,
    /// Single-item lookahead buffer (peeked event not yet current).
    look: Option<Event>,
    /// Number of events that became `current` so far.
    position: u64,
}

impl<'input> Cursor<'input> {
    /// Bind a cursor to `source` and position it on the first substantive event.
    pub(crate) fn new(source: EventSource<'input>) -> Result<Self, Error> {
        let mut cursor = Self {
            source,
            current: Event::StreamStart {
                location: Location::UNKNOWN,
            },
            look: None,
            position: 0,
        };
        cursor.prepare()?;
        Ok(cursor)
    }

    /// Discard leading stream-start and document-start events.
    ///
    /// Afterwards `current` is a mapping start, sequence start or scalar, or a
    /// stream/document end for input without content.
    fn prepare(&mut self) -> Result<(), Error> {
        while self.current.is_leading_framing() {
            let next_is_framing = self.peek()?.is_leading_framing();
            self.advance()?;
            if !next_is_framing {
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn current(&self) -> &Event {
        &self.current
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn location(&self) -> Location {
        self.current.location()
    }

    /// Move to the next event: the buffered lookahead if there is one, otherwise a
    /// fresh event from the source. The previous `current` is dropped.
    ///
    /// At end of input `current` stays on a stream end.
    pub(crate) fn advance(&mut self) -> Result<(), Error> {
        let next = match self.look.take() {
            Some(ev) => ev,
            None => self.pull()?,
        };
        self.current = next;
        self.position += 1;
        Ok(())
    }

    /// Buffer the event following `current` without consuming it. Repeated calls
    /// return the same event and do not read from the source again.
    pub(crate) fn peek(&mut self) -> Result<&Event, Error> {
        if self.look.is_none() {
            let ev = self.pull()?;
            self.look = Some(ev);
        }
        match &self.look {
            Some(ev) => Ok(ev),
            None => Err(Error::source_msg("lookahead slot empty after peek")),
        }
    }

    /// Take the scalar text out of `current` and advance.
    ///
    /// Callers check that `current` is a scalar first.
    pub(crate) fn take_scalar(&mut self) -> Result<String, Error> {
        let value = match &mut self.current {
            Event::Scalar { value, .. } => std::mem::take(value),
            other => return Err(Error::unexpected("scalar", other.describe()).with_location(other.location())),
        };
        self.advance()?;
        Ok(value)
    }

    fn pull(&mut self) -> Result<Event, Error> {
        match self.source.next_event()? {
            Some(ev) => Ok(ev),
            None => Ok(Event::StreamEnd {
                location: self.source.last_location(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn cursor(input: &str) -> Cursor<'_> {
        Cursor::new(EventSource::from_str(input)).unwrap()
    }

    #[test]
    fn prepare_strips_stream_and_document_start() {
        let c = cursor("--- \n- 1\n");
        assert!(matches!(c.current(), Event::SeqStart { .. }));
        let c = cursor("%YAML 1.1\n---\nkey: value\n...\n");
        assert!(matches!(c.current(), Event::MapStart { .. }));
        let c = cursor("plain\n");
        assert_eq!(c.current().as_scalar(), Some("plain"));
    }

    #[test]
    fn empty_input_is_exhausted_at_once() {
        let c = cursor("");
        assert!(c.current().is_exhausted());
    }

    #[test]
    fn peek_is_idempotent() {
        let mut c = cursor("[a, b, c]");
        let first = c.peek().unwrap().clone();
        let second = c.peek().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first.as_scalar(), Some("a"));
        // current is untouched by peeking
        assert!(matches!(c.current(), Event::SeqStart { .. }));

        c.advance().unwrap();
        assert_eq!(c.current().as_scalar(), Some("a"));
        // the buffered event was promoted, not re-read: the next one is "b"
        c.advance().unwrap();
        assert_eq!(c.current().as_scalar(), Some("b"));
    }

    #[test]
    fn stream_end_is_sticky() {
        let mut c = cursor("x");
        for _ in 0..6 {
            c.advance().unwrap();
        }
        assert!(matches!(c.current(), Event::StreamEnd { .. }));
    }

    #[test]
    fn parse_failure_surfaces_as_source_error() {
        let result = Cursor::new(EventSource::from_str("a: [1, 2\n")).and_then(|mut c| {
            for _ in 0..10 {
                c.advance()?;
            }
            Ok(())
        });
        let err = result.expect_err("unterminated flow sequence must fail");
        assert_eq!(err.kind(), crate::ErrorKind::UnknownSourceOrSinkError);
        assert!(err.location().is_some());
    }

    #[test]
    fn take_scalar_moves_text_out() {
        let mut c = cursor("[first, second]");
        c.advance().unwrap();
        assert_eq!(c.take_scalar().unwrap(), "first");
        assert_eq!(c.current().as_scalar(), Some("second"));
    }
}
