//! Character input for the parser when the document comes from an `io::Read`.
//!
//! The reader is decoded to UTF-8 by `encoding_rs_io` (BOM sniffing: UTF-8, UTF-16LE/BE),
//! read in chunks and handed to `saphyr_parser::BufferedInput` one `char` at a time.
//! The parser cannot see I/O failures, so the first one is parked in a shared slot
//! and the event source reports it after the parser stops.

use encoding_rs_io::DecodeReaderBytesBuilder;
use saphyr_parser::BufferedInput;
use std::cell::RefCell;
use std::io::{self, BufReader, Read};
use std::rc::Rc;

const CHUNK: usize = 8 * 1024;

/// Shared slot receiving the first I/O error seen while reading.
pub(crate) type IoErrorSlot = Rc<RefCell<Option<io::Error>>>;

pub(crate) struct ReaderChars<R: Read> {
    reader: R,
    /// Decoded text not yet handed out.
    text: String,
    /// Byte offset of the next char in `text`.
    pos: usize,
    /// Bytes read but not yet decoded: an incomplete UTF-8 sequence at a chunk edge.
    pending: Vec<u8>,
    chunk: Vec<u8>,
    error: IoErrorSlot,
}

impl<R: Read> ReaderChars<R> {
    pub(crate) fn new(reader: R, error: IoErrorSlot) -> Self {
        Self {
            reader,
            text: String::new(),
            pos: 0,
            pending: Vec::new(),
            chunk: vec![0u8; CHUNK],
            error,
        }
    }

    /// Load the next chunk into `text`. `Ok(false)` on end of input.
    fn refill(&mut self) -> io::Result<bool> {
        loop {
            let n = self.reader.read(&mut self.chunk)?;
            if n == 0 {
                if self.pending.is_empty() {
                    return Ok(false);
                }
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "input ends inside a UTF-8 sequence",
                ));
            }
            self.pending.extend_from_slice(&self.chunk[..n]);
            let valid = match std::str::from_utf8(&self.pending) {
                Ok(s) => s.len(),
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            };
            if valid == 0 {
                continue;
            }
            let rest = self.pending.split_off(valid);
            let decoded = std::mem::replace(&mut self.pending, rest);
            self.text = String::from_utf8(decoded)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.pos = 0;
            return Ok(true);
        }
    }
}

impl<R: Read> Iterator for ReaderChars<R> {
    type Item = char;

    /// Next decoded char, or `None` at end of input or after an I/O error (parked
    /// in the error slot).
    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.text[self.pos..].chars().next() {
                self.pos += ch.len_utf8();
                return Some(ch);
            }
            match self.refill() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(error) => {
                    log::debug!("reader input failed: {error}");
                    self.error.replace(Some(error));
                    return None;
                }
            }
        }
    }
}

pub(crate) type ReaderInput<'a> = BufferedInput<ReaderChars<BufReader<Box<dyn Read + 'a>>>>;

/// Build parser input over `reader` together with the slot that will receive a
/// read failure, if any.
pub(crate) fn reader_input<'a, R: Read + 'a>(reader: R) -> (ReaderInput<'a>, IoErrorSlot) {
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(None)
        .build(reader);
    let error: IoErrorSlot = Rc::new(RefCell::new(None));
    let buffered = BufReader::new(Box::new(decoder) as Box<dyn Read + 'a>);
    let chars = ReaderChars::new(buffered, error.clone());
    (BufferedInput::new(chars), error)
}
