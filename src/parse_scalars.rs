//! Strict scalar text parsing for the typed decode operations.

/// Exact-case `true` / `false`. Every other text (including `True`, `yes`, `1`) is
/// rejected.
pub(crate) fn parse_strict_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Base-10 digits into an i128. Accumulates towards the sign so that `i128::MIN` fits.
/// `None` on a non-digit, on no digits at all, and on overflow.
fn parse_decimal_i128(digits: &str, neg: bool) -> Option<i128> {
    if digits.is_empty() {
        return None;
    }
    let mut val: i128 = 0;
    for b in digits.bytes() {
        let d = match b {
            b'0'..=b'9' => i128::from(b - b'0'),
            _ => return None,
        };
        val = val.checked_mul(10)?;
        val = if neg {
            val.checked_sub(d)?
        } else {
            val.checked_add(d)?
        };
    }
    Some(val)
}

/// Parse an optionally signed base-10 integer and narrow it to `T`.
///
/// The whole text must be consumed: `12a`, `0x10`, `1_000` and `+` are all invalid.
/// The error is the message for a system error.
pub(crate) fn parse_decimal_int<T>(s: &str, ty: &str) -> Result<T, String>
where
    T: TryFrom<i128>,
{
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let wide = parse_decimal_i128(digits, neg).ok_or_else(|| {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            format!("integer `{s}` is out of range")
        } else {
            format!("invalid integer `{s}`")
        }
    })?;
    T::try_from(wide).map_err(|_| format!("integer `{s}` is out of range for {ty}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_exact_case() {
        assert_eq!(parse_strict_bool("true"), Some(true));
        assert_eq!(parse_strict_bool("false"), Some(false));
        for rejected in ["True", "FALSE", "yes", "no", "on", "1", "", " true"] {
            assert_eq!(parse_strict_bool(rejected), None, "{rejected:?}");
        }
    }

    #[test]
    fn decimal_integers() {
        assert_eq!(parse_decimal_int::<i32>("42", "i32"), Ok(42));
        assert_eq!(parse_decimal_int::<i32>("-17", "i32"), Ok(-17));
        assert_eq!(parse_decimal_int::<i32>("+5", "i32"), Ok(5));
        assert_eq!(parse_decimal_int::<i32>("007", "i32"), Ok(7));
        assert_eq!(parse_decimal_int::<i128>(&i128::MIN.to_string(), "i128"), Ok(i128::MIN));
    }

    #[test]
    fn trailing_garbage_and_other_radixes_are_invalid() {
        for bad in ["12a", "0x10", "1_000", "+", "-", "", " 1", "1 ", "1.0"] {
            let err = parse_decimal_int::<i64>(bad, "i64").unwrap_err();
            assert!(err.starts_with("invalid integer"), "{bad:?}: {err}");
        }
    }

    #[test]
    fn out_of_range_is_reported_against_target_type() {
        let err = parse_decimal_int::<i32>("2147483648", "i32").unwrap_err();
        assert_eq!(err, "integer `2147483648` is out of range for i32");
        assert!(parse_decimal_int::<u8>("-1", "u8").is_err());
        let err = parse_decimal_int::<i128>("999999999999999999999999999999999999999999", "i128")
            .unwrap_err();
        assert!(err.ends_with("is out of range"));
    }
}
