//! Configuration for the deserializer and the serializer.
//!
//! Construct with `Default` and struct update syntax, or with the [`crate::options!`] and
//! [`crate::serializer_options!`] macros.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How integer decoding treats whitespace around the digits.
///
/// Plain YAML scalars are already trimmed by the parser, so this only matters for
/// quoted scalars such as `' 42'`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegerWhitespace {
    /// Any whitespace makes the scalar an invalid integer (default).
    #[default]
    Reject,
    /// Leading and trailing ASCII whitespace is ignored.
    Trim,
}

/// Deserializer options.
///
/// ```rust
/// use saphyr_cursor::{Deserializer, Options, IntegerWhitespace};
///
/// let options = Options {
///     integer_whitespace: IntegerWhitespace::Trim,
///     ..Options::default()
/// };
/// let mut de = Deserializer::from_str_with_options("' 42 '", options)?;
/// assert_eq!(de.deserialize_int::<i32>()?, Some(42));
/// # Ok::<(), saphyr_cursor::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Options {
    /// Whitespace policy for [`crate::Deserializer::deserialize_int`].
    pub integer_whitespace: IntegerWhitespace,
    /// Maximum nesting of maps and lists. Deeper documents fail with a system
    /// error instead of recursing further.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            integer_whitespace: IntegerWhitespace::Reject,
            max_depth: 128,
        }
    }
}

/// Serializer options for YAML emission.
///
/// ```rust
/// let opts = saphyr_cursor::serializer_options! {
///     indent_step: 4,
/// };
/// assert_eq!(opts.indent_step, 4);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SerializerOptions {
    /// Number of spaces a nested mapping is indented by (2 by default). Sequences under
    /// a mapping key are not indented; mappings inside sequence items align with the
    /// text after `- `. 0 is invalid.
    pub indent_step: usize,
    /// `%YAML major.minor` directive written at document start (1.1 by default).
    pub version: (u8, u8),
}

impl SerializerOptions {
    pub(crate) fn consistent(&self) -> Result<(), Error> {
        if self.indent_step == 0 {
            return Err(Error::source_msg("invalid serializer options: indent step must be positive"));
        }
        if self.version.0 != 1 {
            return Err(Error::source_msg(format!(
                "invalid serializer options: unsupported YAML version {}.{}",
                self.version.0, self.version.1
            )));
        }
        Ok(())
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent_step: 2,
            version: (1, 1),
        }
    }
}
