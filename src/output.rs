//! Output targets the serializer can write YAML text to.

use std::io;

use crate::error::Error;

/// Destination for emitted YAML text.
///
/// [`StringTarget`] is the default and the only target whose text can be borrowed
/// back while serializing. Implement this trait to send output elsewhere.
pub trait OutputTarget {
    /// Append a piece of YAML text.
    fn write_str(&mut self, s: &str) -> Result<(), Error>;

    /// Push buffered text to the final destination. Called at stream end.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// The text written so far, for targets that keep it in memory.
    fn as_str(&self) -> Option<&str> {
        None
    }
}

/// Accumulates the output in a growable in-memory string.
#[derive(Clone, Debug, Default)]
pub struct StringTarget {
    buf: String,
}

impl StringTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl OutputTarget for StringTarget {
    fn write_str(&mut self, s: &str) -> Result<(), Error> {
        self.buf.push_str(s);
        Ok(())
    }

    fn as_str(&self) -> Option<&str> {
        Some(&self.buf)
    }
}

/// Streams the output into any [`io::Write`]. I/O failures become system errors.
#[derive(Debug)]
pub struct WriterTarget<W: io::Write> {
    writer: W,
}

impl<W: io::Write> WriterTarget<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> OutputTarget for WriterTarget<W> {
    fn write_str(&mut self, s: &str) -> Result<(), Error> {
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }
}
