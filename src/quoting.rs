//! Scalar quoting decisions and quoted-scalar writers for the emitter.

/// Returns true if `s` can be written as a plain mapping key and read back unchanged.
pub(crate) fn is_plain_key(s: &str) -> bool {
    let (Some(first), Some(last)) = (s.bytes().next(), s.bytes().last()) else {
        return false;
    };
    // Tokens a YAML 1.1 reader would resolve to null or bool
    if s == "~"
        || ["null", "true", "false", "yes", "no", "on", "off", "y", "n"]
            .iter()
            .any(|t| s.eq_ignore_ascii_case(t))
    {
        return false;
    }
    // Document markers at column 0 would end or restart the document
    if s.starts_with("...") || s.starts_with("---") {
        return false;
    }
    if first.is_ascii_whitespace()
        || last.is_ascii_whitespace()
        || matches!(
            first,
            b'-' | b'?'
                | b':'
                | b','
                | b'['
                | b']'
                | b'{'
                | b'}'
                | b'#'
                | b'&'
                | b'*'
                | b'!'
                | b'|'
                | b'>'
                | b'\''
                | b'"'
                | b'%'
                | b'@'
                | b'`'
        )
    {
        return false;
    }
    !s.chars()
        .any(|c| c == ':' || c == '#' || needs_escape(c))
}

/// Characters a single-quoted scalar cannot carry: line breaks would be folded and
/// the rest is not printable.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{FEFF}' | '\u{2028}' | '\u{2029}')
}

/// Returns true if `s` has to be written double-quoted with escapes.
pub(crate) fn needs_double_quotes(s: &str) -> bool {
    s.chars().any(needs_escape)
}

/// Single-quoted scalar; a single quote inside is escaped by doubling it.
pub(crate) fn write_single_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
}

/// Double-quoted scalar with YAML escapes.
pub(crate) fn write_double_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{FEFF}' => out.push_str("\\uFEFF"),
            '\u{0085}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if c.is_control() && (c as u32) <= 0xFF => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
