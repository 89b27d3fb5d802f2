//! Scalar widths, epsilon-aware comparisons, and numeric text handling

#[cfg(not(feature = "atomics-32"))]
mod width {
    /// Integer atomic type
    pub type Integer = i64;
    /// Real atomic type
    pub type Real = f64;
    /// Significant digits used when rendering a Real as text
    pub const REAL_DIGITS: usize = 15;
    /// Whether the build uses 64-bit atomics
    pub const USES_64BIT_ATOMICS: bool = true;
}

#[cfg(feature = "atomics-32")]
mod width {
    /// Integer atomic type
    pub type Integer = i32;
    /// Real atomic type
    pub type Real = f32;
    /// Significant digits used when rendering a Real as text
    pub const REAL_DIGITS: usize = 7;
    /// Whether the build uses 64-bit atomics
    pub const USES_64BIT_ATOMICS: bool = false;
}

pub use width::{Integer, Real, REAL_DIGITS, USES_64BIT_ATOMICS};

/// Tolerance multiplier applied to the machine epsilon.
const EPSILON_SCALE: Real = 2.0;

/// Epsilon-aware Real equality.
///
/// Exact equality short-circuits; otherwise the difference must be within
/// a couple of ulps relative to the larger magnitude (never less than 1).
pub fn real_equal(lhs: Real, rhs: Real) -> bool {
    if lhs == rhs {
        return true;
    }
    if !lhs.is_finite() || !rhs.is_finite() {
        return false;
    }
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    (lhs - rhs).abs() <= EPSILON_SCALE * Real::EPSILON * scale
}

/// Epsilon-aware zero test.
pub fn real_is_zero(value: Real) -> bool {
    value.abs() <= EPSILON_SCALE * Real::EPSILON
}

/// True when `value` is neither infinite nor NaN.
pub fn is_finite(value: Real) -> bool {
    value.is_finite()
}

/// True when `value` is positive or negative infinity.
pub fn is_infinite(value: Real) -> bool {
    value.is_infinite()
}

/// True when `value` is NaN.
pub fn is_nan(value: Real) -> bool {
    value.is_nan()
}

/// True when `value` is a normal (not zero, subnormal, infinite, or NaN) number.
pub fn is_normal(value: Real) -> bool {
    value.is_normal()
}

// ═══════════════════════════════════════════════════════════════════════
// Text Rendering
// ═══════════════════════════════════════════════════════════════════════

/// Render a Real in shortest general form with `REAL_DIGITS` significant
/// digits: `3`, `0.1`, `1e+20`.
pub fn format_real(value: Real) -> String {
    let v = f64::from(value);
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", REAL_DIGITS - 1, v);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return v.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -5 || exponent >= REAL_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (REAL_DIGITS as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Text Parsing
// ═══════════════════════════════════════════════════════════════════════

/// Parse the longest integer prefix of `text` after leading whitespace.
///
/// Returns `None` when no digits are present or the number overflows.
pub fn parse_integer_prefix(text: &str) -> Option<Integer> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    trimmed[..end].parse().ok()
}

/// Parse the longest real-number prefix of `text` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent. Returns `None` when no digits are present.
pub fn parse_real_prefix(text: &str) -> Option<Real> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_real_equal_absorbs_round_off() {
        assert!(real_equal(0.1 + 0.2, 0.3));
        assert!(!real_equal(0.1, 0.2));
        assert!(real_equal(Real::INFINITY, Real::INFINITY));
        assert!(!real_equal(Real::NAN, Real::NAN));
    }

    #[test]
    fn test_real_is_zero() {
        assert!(real_is_zero(0.0));
        assert!(real_is_zero(Real::EPSILON));
        assert!(!real_is_zero(0.001));
    }

    #[test]
    fn test_format_real_general_form() {
        assert_eq!(format_real(3.0), "3");
        assert_eq!(format_real(0.1), "0.1");
        assert_eq!(format_real(-2.5), "-2.5");
        assert_eq!(format_real(0.0001), "0.0001");
        assert_eq!(format_real(1e20), "1e+20");
        assert_eq!(format_real(1.5e-7), "1.5e-07");
        assert_eq!(format_real(Real::INFINITY), "inf");
    }

    #[test]
    fn test_parse_integer_prefix() {
        assert_eq!(parse_integer_prefix("42"), Some(42));
        assert_eq!(parse_integer_prefix("  -7xyz"), Some(-7));
        assert_eq!(parse_integer_prefix("3.9"), Some(3));
        assert_eq!(parse_integer_prefix("abc"), None);
        assert_eq!(parse_integer_prefix("-"), None);
        assert_eq!(parse_integer_prefix("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_real_prefix() {
        assert_eq!(parse_real_prefix("2.5"), Some(2.5));
        assert_eq!(parse_real_prefix(" .5kg"), Some(0.5));
        assert_eq!(parse_real_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_real_prefix("4e"), Some(4.0));
        assert_eq!(parse_real_prefix("."), None);
        assert_eq!(parse_real_prefix("x1"), None);
    }
}
