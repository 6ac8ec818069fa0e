//! Fixed number formatting rule.
//!
//! Digits come from Rust's exact float-to-decimal conversion (`{:e}` yields the
//! shortest round-trip digits, `{:.Ne}` yields exactly `N + 1` correctly rounded
//! digits). Placement of those digits is owned here and never delegated:
//!
//! * decimal exponent `e` with `-7 < e < 21` renders positionally
//!   (`0.000001`, `123.5`, `100000000000000000000.0`);
//! * anything else renders as `d[.ddd]e±x` (`1e-7`, `1.5e+21`);
//! * a positional float without fractional digits keeps a `.0` suffix so it
//!   decodes back as a float, and `-0.0` renders as `0.0`.
//!
//! Integers render as plain decimal without a suffix. Only integers inside
//! `i64::MIN..=u64::MAX` are encodable; wider ones would decode back as floats.

use crate::options::FloatFormat;

/// Smallest exponent rendered positionally.
const MIN_POSITIONAL_EXP: i32 = -6;
/// Largest exponent rendered positionally.
const MAX_POSITIONAL_EXP: i32 = 20;

/// Literal emitted for NaN in permissive mode.
pub const NAN_LITERAL: &str = "NaN";
/// Literal emitted for positive infinity in permissive mode.
pub const INFINITY_LITERAL: &str = "Infinity";
/// Literal emitted for negative infinity in permissive mode.
pub const NEG_INFINITY_LITERAL: &str = "-Infinity";

/// Returns the permissive literal for a non-finite float, or `None` when finite.
pub fn non_finite_literal(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some(NAN_LITERAL)
    } else if value == f64::INFINITY {
        Some(INFINITY_LITERAL)
    } else if value == f64::NEG_INFINITY {
        Some(NEG_INFINITY_LITERAL)
    } else {
        None
    }
}

/// Returns whether `value` decodes back as the same integer.
pub fn int_is_encodable(value: i128) -> bool {
    (i128::from(i64::MIN)..=i128::from(u64::MAX)).contains(&value)
}

/// Renders an integer.
pub fn format_int(value: i128) -> String {
    value.to_string()
}

/// Renders a finite float under the given digit rule.
///
/// Callers must screen out non-finite values first; they are rendered with
/// their permissive literal if they slip through.
pub fn format_float(value: f64, format: FloatFormat) -> String {
    if let Some(literal) = non_finite_literal(value) {
        return literal.to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }
    let scientific = match format {
        FloatFormat::ShortestRoundTrip => format!("{value:e}"),
        FloatFormat::Significant(digits) => {
            let precision = usize::from(digits.clamp(1, 17)) - 1;
            format!("{value:.precision$e}")
        }
    };
    match Decimal::parse(&scientific) {
        Some(decimal) => decimal.render(),
        None => scientific,
    }
}

/// Sign, significant digits and decimal exponent: `±d.ddd × 10^exponent`.
struct Decimal {
    negative: bool,
    digits: String,
    exponent: i32,
}

impl Decimal {
    fn parse(scientific: &str) -> Option<Self> {
        let (negative, body) = match scientific.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, scientific),
        };
        let (mantissa, exponent) = body.split_once('e')?;
        let exponent: i32 = exponent.parse().ok()?;
        let mut digits: String = mantissa.chars().filter(|c| *c != '.').collect();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        while digits.len() > 1 && digits.ends_with('0') {
            digits.pop();
        }
        Some(Self {
            negative,
            digits,
            exponent,
        })
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.digits.len() + 8);
        if self.negative {
            out.push('-');
        }
        if (MIN_POSITIONAL_EXP..=MAX_POSITIONAL_EXP).contains(&self.exponent) {
            self.render_positional(&mut out);
        } else {
            self.render_exponent(&mut out);
        }
        out
    }

    fn render_positional(&self, out: &mut String) {
        let len = self.digits.len() as i32;
        if self.exponent < 0 {
            out.push_str("0.");
            for _ in 0..(-self.exponent - 1) {
                out.push('0');
            }
            out.push_str(&self.digits);
        } else if self.exponent >= len - 1 {
            out.push_str(&self.digits);
            for _ in 0..(self.exponent - (len - 1)) {
                out.push('0');
            }
            out.push_str(".0");
        } else {
            let split = (self.exponent + 1) as usize;
            out.push_str(&self.digits[..split]);
            out.push('.');
            out.push_str(&self.digits[split..]);
        }
    }

    fn render_exponent(&self, out: &mut String) {
        out.push_str(&self.digits[..1]);
        if self.digits.len() > 1 {
            out.push('.');
            out.push_str(&self.digits[1..]);
        }
        out.push('e');
        out.push(if self.exponent < 0 { '-' } else { '+' });
        out.push_str(&self.exponent.unsigned_abs().to_string());
    }
}
