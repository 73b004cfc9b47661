//! Number formatting for extracted values.
//!
//! Numeric tokens are normalized to three significant figures: plain
//! decimals for magnitudes roughly in `[0.1, 1000)`, scientific notation
//! with an uppercase `E` otherwise. Arithmetic is done on the decimal
//! digits themselves so rounding is exact round-half-up.

/// Smallest decimal exponent rendered as a plain decimal.
const PLAIN_MIN_EXPONENT: i64 = -1;

/// Largest decimal exponent rendered as a plain decimal.
const PLAIN_MAX_EXPONENT: i64 = 2;

/// Significant figures kept in the output.
const SIGNIFICANT_FIGURES: i64 = 3;

/// A finite decimal `±digits × 10^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    /// Most significant first, no leading zeros. Empty means zero.
    digits: Vec<u8>,
    exponent: i64,
}

impl Decimal {
    /// Parse a decimal literal: optional sign, digits with an optional
    /// point, optional exponent. Underscores are accepted between digits.
    fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exp_part) = match body.find(['e', 'E']) {
            Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        let int_digits = digit_run(int_part)?;
        let frac_digits = digit_run(frac_part)?;
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let mut exponent = -(frac_digits.len() as i64);
        if let Some(exp) = exp_part {
            let (exp_negative, exp_body) = match exp.as_bytes().first()? {
                b'-' => (true, &exp[1..]),
                b'+' => (false, &exp[1..]),
                _ => (false, exp),
            };
            let exp_digits = digit_run(exp_body)?;
            if exp_digits.is_empty() {
                return None;
            }
            let mut value: i64 = 0;
            for d in exp_digits {
                value = value.checked_mul(10)?.checked_add(i64::from(d))?;
            }
            exponent = if exp_negative {
                exponent.checked_sub(value)?
            } else {
                exponent.checked_add(value)?
            };
        }

        let mut digits = int_digits;
        digits.extend(frac_digits);
        let first_nonzero = digits.iter().position(|&d| d != 0).unwrap_or(digits.len());
        digits.drain(..first_nonzero);

        Some(Self {
            negative,
            digits,
            exponent,
        })
    }

    fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Exponent of the leading digit, i.e. `E` in `d.ddd × 10^E`.
    fn adjusted_exponent(&self) -> i64 {
        self.digits.len() as i64 - 1 + self.exponent
    }

    /// Exponent of the value written with four significant digits.
    ///
    /// Rounding to four digits can carry into a new leading digit
    /// (`999.96` becomes `1.000e3`), which moves the value across the
    /// plain/scientific threshold.
    fn display_exponent(&self) -> i64 {
        let carries = self.digits.len() > 4
            && self.digits[..4].iter().all(|&d| d == 9)
            && self.digits[4] >= 5;
        self.adjusted_exponent() + i64::from(carries)
    }

    /// Round to a multiple of `10^quantum`, halves away from zero.
    fn quantize_half_up(&self, quantum: i64) -> Self {
        if self.exponent >= quantum {
            let mut digits = self.digits.clone();
            digits.extend(std::iter::repeat(0).take((self.exponent - quantum) as usize));
            return Self {
                negative: self.negative,
                digits,
                exponent: quantum,
            };
        }

        let dropped = (quantum - self.exponent) as usize;
        let mut digits = self.digits.clone();
        if dropped > digits.len() {
            let mut padded = vec![0; dropped - digits.len()];
            padded.append(&mut digits);
            digits = padded;
        }
        let split = digits.len() - dropped;
        let round_up = digits[split] >= 5;
        digits.truncate(split);

        if round_up {
            let mut i = digits.len();
            loop {
                if i == 0 {
                    digits.insert(0, 1);
                    break;
                }
                i -= 1;
                if digits[i] == 9 {
                    digits[i] = 0;
                } else {
                    digits[i] += 1;
                    break;
                }
            }
        }

        let first_nonzero = digits.iter().position(|&d| d != 0).unwrap_or(digits.len());
        digits.drain(..first_nonzero);

        Self {
            negative: self.negative,
            digits,
            exponent: quantum,
        }
    }

    /// Render with exactly `places` fractional digits.
    fn to_fixed(&self, places: usize) -> String {
        let shift = self.exponent + places as i64;
        let mut body: String = self.digits.iter().map(|d| char::from(b'0' + d)).collect();
        if shift >= 0 {
            body.extend(std::iter::repeat('0').take(shift as usize));
        } else {
            body.truncate(body.len().saturating_sub((-shift) as usize));
        }
        while body.len() < places + 1 {
            body.insert(0, '0');
        }
        if places > 0 {
            body.insert(body.len() - places, '.');
        }
        self.signed(body)
    }

    /// Integer part, truncated toward zero.
    fn to_truncated_integer(&self) -> String {
        let keep = self.digits.len() as i64 + self.exponent;
        if keep <= 0 {
            return "0".to_string();
        }
        let mut body: String = self
            .digits
            .iter()
            .take(keep as usize)
            .map(|d| char::from(b'0' + d))
            .collect();
        body.extend(std::iter::repeat('0').take((keep as usize).saturating_sub(self.digits.len())));
        self.signed(body)
    }

    /// Render as `d.ddE±XX` with `places` mantissa decimals.
    fn to_scientific(&self, places: usize) -> String {
        let exponent = self.adjusted_exponent();
        let mut mantissa = String::with_capacity(places + 2);
        for i in 0..=places {
            let digit = self.digits.get(i).copied().unwrap_or(0);
            mantissa.push(char::from(b'0' + digit));
            if i == 0 && places > 0 {
                mantissa.push('.');
            }
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        self.signed(format!("{}E{}{:02}", mantissa, sign, exponent.abs()))
    }

    fn signed(&self, body: String) -> String {
        if self.negative && !self.is_zero() {
            format!("-{}", body)
        } else {
            body
        }
    }
}

/// Validate a run of ASCII digits that may contain single underscores
/// between digits, returning the digit values.
fn digit_run(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut digits = Vec::with_capacity(bytes.len());
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => digits.push(b - b'0'),
            b'_' => {
                let prev_digit = i > 0 && bytes[i - 1].is_ascii_digit();
                let next_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
                if !(prev_digit && next_digit) {
                    return None;
                }
            }
            _ => return None,
        }
    }
    Some(digits)
}

/// Format a value to three significant figures if it is numeric.
///
/// - Zero becomes `"0.00"`.
/// - Exponents `-1..=2` render as plain decimals with trailing zeros
///   stripped (`"3.000"` → `"3"`, `"0.10"` → `"0.1"`); exponent 2 truncates
///   to the integer part.
/// - Anything else renders as `"1.23E+04"`.
/// - Infinities and NaN are returned unchanged, as are values too large
///   for an `f64`.
/// - Non-numeric text is returned trimmed, unless it contains an `e`/`E`,
///   in which case it is assumed pre-formatted and returned unchanged.
pub fn format_number(value: &str) -> String {
    let trimmed = value.trim();

    let Some(number) = Decimal::parse(trimmed) else {
        if let Ok(parsed) = trimmed.parse::<f64>() {
            if !parsed.is_finite() {
                return value.to_string();
            }
        }
        if value.contains(['e', 'E']) {
            return value.to_string();
        }
        return trimmed.to_string();
    };
    // Exponents beyond the f64 range overflow to infinity.
    if trimmed.parse::<f64>().is_ok_and(|parsed| parsed.is_infinite()) {
        return value.to_string();
    }

    if number.is_zero() {
        return "0.00".to_string();
    }

    let exponent = number.display_exponent();
    if (PLAIN_MIN_EXPONENT..=PLAIN_MAX_EXPONENT).contains(&exponent) {
        let places = SIGNIFICANT_FIGURES - (exponent + 1);
        if places > 0 {
            let rounded = number.quantize_half_up(-places);
            let fixed = rounded.to_fixed(places as usize);
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            number.to_truncated_integer()
        }
    } else {
        let places = (SIGNIFICANT_FIGURES - 1) as usize;
        let rounded = number.quantize_half_up(exponent - places as i64);
        rounded.to_scientific(places)
    }
}
