//! Block-style YAML emitter driven by [`Emit`] commands.
//!
//! The emitter validates the order of commands (a stream holds documents, a document
//! holds exactly one root node, mappings alternate scalar keys and values) and rejects
//! anything else with an [`ErrorKind::UnknownSourceOrSinkError`](crate::ErrorKind).
//!
//! Layout:
//! - `%YAML 1.1` directive and `---` open a document, `...` closes it.
//! - A scalar root sits on the `---` line: `--- 'x'`.
//! - Nested mappings are indented by `indent_step`; a sequence under a mapping key
//!   stays at the key's indentation (`key:\n- 1`).
//! - A container inside a sequence starts on the `- ` line.
//! - Empty containers are written in flow form: `{}` and `[]`.
//! - Keys longer than 1024 characters use the explicit `? key` / `: value` form.

use saphyr_parser::ScalarStyle;

use crate::error::Error;
use crate::event::Emit;
use crate::options::SerializerOptions;
use crate::output::OutputTarget;
use crate::quoting::{is_plain_key, needs_double_quotes, write_double_quoted, write_single_quoted};

/// Longest key (as written, quotes included) allowed in implicit `key:` form.
const MAX_IMPLICIT_KEY: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Nothing emitted yet; expects a stream start.
    Initial,
    /// Between documents.
    Stream,
    /// Inside a document; `root_done` once the root node is complete.
    Document { root_done: bool },
    /// Stream end emitted.
    Finished,
}

#[derive(Clone, Copy, Debug)]
enum FrameKind {
    Map { expect_key: bool },
    Seq,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    kind: FrameKind,
    /// Column of the children of this container.
    indent: usize,
    /// First child continues the line of the parent's `- ` marker.
    inline: bool,
    children: usize,
    /// The pending entry of this mapping uses the explicit `? key` form.
    explicit_key: bool,
}

pub(crate) struct Emitter<T: OutputTarget> {
    out: T,
    indent_step: usize,
    state: State,
    frames: Vec<Frame>,
    /// True after a newline; false while a line is open (after `---`, `key:` or `-`).
    at_line_start: bool,
    /// Scratch buffer, one write to the target per command.
    line: String,
}

impl<T: OutputTarget> Emitter<T> {
    pub(crate) fn new(out: T, options: &SerializerOptions) -> Self {
        Self {
            out,
            indent_step: options.indent_step,
            state: State::Initial,
            frames: Vec::new(),
            at_line_start: true,
            line: String::new(),
        }
    }

    pub(crate) fn target(&self) -> &T {
        &self.out
    }

    pub(crate) fn into_target(self) -> T {
        self.out
    }

    /// Apply one emission command.
    pub(crate) fn emit(&mut self, ev: Emit<'_>) -> Result<(), Error> {
        log::trace!("emit {}", ev.describe());
        self.line.clear();
        match ev {
            Emit::StreamStart => {
                self.expect_state(State::Initial, &ev)?;
                self.state = State::Stream;
            }
            Emit::StreamEnd => {
                self.expect_state(State::Stream, &ev)?;
                self.state = State::Finished;
                self.out.flush()?;
            }
            Emit::DocumentStart { version } => {
                self.expect_state(State::Stream, &ev)?;
                self.line
                    .push_str(&format!("%YAML {}.{}\n---", version.0, version.1));
                self.at_line_start = false;
                self.state = State::Document { root_done: false };
            }
            Emit::DocumentEnd => {
                self.expect_state(State::Document { root_done: true }, &ev)?;
                if !self.at_line_start {
                    self.line.push('\n');
                }
                self.line.push_str("...\n");
                self.at_line_start = true;
                self.state = State::Stream;
            }
            Emit::Scalar { value, style } => {
                if self.begin_node(&ev)? {
                    self.write_key(value);
                } else {
                    self.line.push(' ');
                    self.write_value(value, style);
                    self.line.push('\n');
                    self.at_line_start = true;
                    self.end_node();
                }
            }
            Emit::MapStart | Emit::SeqStart => {
                if self.begin_node(&ev)? {
                    return Err(self.rejected(&ev, "mapping keys must be scalars"));
                }
                self.open(matches!(ev, Emit::MapStart));
            }
            Emit::MapEnd | Emit::SeqEnd => self.close(&ev)?,
        }
        if !self.line.is_empty() {
            self.out.write_str(&self.line)?;
        }
        Ok(())
    }

    fn rejected(&self, ev: &Emit<'_>, why: &str) -> Error {
        log::debug!("emitter rejected {}: {why}", ev.describe());
        Error::source_msg(format!("emitter: {} rejected, {why}", ev.describe()))
    }

    fn expect_state(&self, expected: State, ev: &Emit<'_>) -> Result<(), Error> {
        if self.state == expected && self.frames.is_empty() {
            return Ok(());
        }
        let why = match self.state {
            State::Initial => "stream has not been started",
            State::Stream => "no document is open",
            State::Document { root_done: false } if self.frames.is_empty() => {
                "document has no root node yet"
            }
            State::Document { root_done: false } => "a mapping or sequence is still open",
            State::Document { root_done: true } => "document is still open",
            State::Finished => "stream has already ended",
        };
        Err(self.rejected(ev, why))
    }

    /// Prepare for a node (scalar or container start). Writes the line prefix for it:
    /// the key indentation, the `- ` item marker or nothing at the root.
    ///
    /// Returns true when the node is a mapping key.
    fn begin_node(&mut self, ev: &Emit<'_>) -> Result<bool, Error> {
        match self.state {
            State::Document { root_done: false } => {}
            State::Document { root_done: true } => {
                return Err(self.rejected(ev, "document already has a root node"));
            }
            _ => return Err(self.rejected(ev, "no document is open")),
        }
        let Some(frame) = self.frames.last().copied() else {
            return Ok(false);
        };
        match frame.kind {
            FrameKind::Map { expect_key: false } => Ok(false),
            FrameKind::Map { expect_key: true } => {
                self.start_child_line(&frame);
                Ok(true)
            }
            FrameKind::Seq => {
                self.start_child_line(&frame);
                self.line.push('-');
                Ok(false)
            }
        }
    }

    /// Position the output at the start of the next child of `frame`.
    fn start_child_line(&mut self, frame: &Frame) {
        if !self.at_line_start {
            if frame.inline {
                self.line.push(' ');
                self.at_line_start = false;
                return;
            }
            self.line.push('\n');
        }
        for _ in 0..frame.indent {
            self.line.push(' ');
        }
        self.at_line_start = false;
    }

    fn write_key(&mut self, key: &str) {
        let mut text = String::new();
        if is_plain_key(key) {
            text.push_str(key);
        } else if needs_double_quotes(key) {
            write_double_quoted(&mut text, key);
        } else {
            write_single_quoted(&mut text, key);
        }
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        frame.kind = FrameKind::Map { expect_key: false };
        if text.chars().count() > MAX_IMPLICIT_KEY {
            // `? key` on its own line, `:` at the key's column
            frame.explicit_key = true;
            self.line.push_str("? ");
            self.line.push_str(&text);
            self.line.push('\n');
            for _ in 0..frame.indent {
                self.line.push(' ');
            }
        } else {
            self.line.push_str(&text);
        }
        self.line.push(':');
    }

    /// Scalar in value position. Plain is honoured only when the text reads back
    /// unchanged; quoted styles fall back to double quotes for unprintable text.
    fn write_value(&mut self, value: &str, style: ScalarStyle) {
        match style {
            ScalarStyle::Plain if is_plain_value(value) => self.line.push_str(value),
            ScalarStyle::DoubleQuoted => write_double_quoted(&mut self.line, value),
            _ if needs_double_quotes(value) => write_double_quoted(&mut self.line, value),
            _ => write_single_quoted(&mut self.line, value),
        }
    }

    /// A node in value position is complete.
    fn end_node(&mut self) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.children += 1;
                frame.explicit_key = false;
                if let FrameKind::Map { expect_key } = &mut frame.kind {
                    *expect_key = true;
                }
            }
            None => self.state = State::Document { root_done: true },
        }
    }

    fn open(&mut self, is_map: bool) {
        let kind = if is_map {
            FrameKind::Map { expect_key: true }
        } else {
            FrameKind::Seq
        };
        let frame = match self.frames.last() {
            None => Frame {
                kind,
                indent: 0,
                inline: false,
                children: 0,
                explicit_key: false,
            },
            Some(parent) => match parent.kind {
                FrameKind::Seq => Frame {
                    kind,
                    indent: parent.indent + 2,
                    inline: true,
                    children: 0,
                    explicit_key: false,
                },
                FrameKind::Map { .. } => Frame {
                    kind,
                    indent: if is_map || parent.explicit_key {
                        parent.indent + self.indent_step
                    } else {
                        parent.indent
                    },
                    inline: false,
                    children: 0,
                    explicit_key: false,
                },
            },
        };
        self.frames.push(frame);
    }

    fn close(&mut self, ev: &Emit<'_>) -> Result<(), Error> {
        let Some(frame) = self.frames.last().copied() else {
            return Err(self.rejected(ev, "no mapping or sequence is open"));
        };
        match (frame.kind, ev) {
            (FrameKind::Map { expect_key: true }, Emit::MapEnd) | (FrameKind::Seq, Emit::SeqEnd) => {}
            (FrameKind::Map { expect_key: false }, Emit::MapEnd) => {
                return Err(self.rejected(ev, "the last key has no value"));
            }
            (FrameKind::Map { .. }, _) => {
                return Err(self.rejected(ev, "a mapping is open"));
            }
            (FrameKind::Seq, _) => return Err(self.rejected(ev, "a sequence is open")),
        }
        self.frames.pop();
        if frame.children == 0 {
            self.line
                .push_str(if matches!(ev, Emit::MapEnd) { " {}\n" } else { " []\n" });
            self.at_line_start = true;
        }
        self.end_node();
        Ok(())
    }
}

/// Plain scalar in value position that reads back as the same text.
fn is_plain_value(s: &str) -> bool {
    let bytes = s.as_bytes();
    let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    if first.is_ascii_whitespace() || last.is_ascii_whitespace() || last == b':' {
        return false;
    }
    let indicator = match first {
        b'-' | b'?' | b':' => bytes.get(1).is_none_or(|b| b.is_ascii_whitespace()),
        b',' | b'[' | b']' | b'{' | b'}' | b'#' | b'&' | b'*' | b'!' | b'|' | b'>' | b'\''
        | b'"' | b'%' | b'@' | b'`' => true,
        _ => false,
    };
    !indicator && !s.contains(": ") && !s.contains(" #") && !needs_double_quotes(s)
}
