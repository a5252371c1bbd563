//! Macros for building option structs from their defaults plus a list of field
//! assignments, so call sites keep compiling when fields are added.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// ```rust
/// use saphyr_cursor::IntegerWhitespace;
///
/// let options = saphyr_cursor::options! {
///     integer_whitespace: IntegerWhitespace::Trim,
///     max_depth: 16,
/// };
/// assert_eq!(options.max_depth, 16);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::SerializerOptions`] from `Default` and a list of field assignments.
///
/// ```rust
/// let opts = saphyr_cursor::serializer_options! {
///     indent_step: 4,
/// };
/// assert_eq!(opts.version, (1, 1));
/// ```
#[macro_export]
macro_rules! serializer_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::SerializerOptions::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}
