//! ## Measurement Decoding
//!
//! Pure numeric parsing and formatting for instrument replies. Measurement
//! queries answer in scientific notation (e.g. `+3.1400E-06`); the decoder
//! extracts the mantissa and exponent and snaps the exponent onto the SI
//! prefix grid so the result can be shown as `3.14 u<unit>` instead of raw
//! digits.
//!

use crate::constants::si;
use crate::error::Error;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the first scientific-notation number in a reply,
/// e.g. `1.23e-4` or `+3.45E+6`.
static SCI_NOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-+]?\d*\.?\d+)([eE][-+]?\d+)").expect("scientific notation regex"));

/// A measurement value normalized onto the SI exponent grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledMeasurement {
    pub value: f64,
    /// Always a member of [`si::VALID_EXPONENTS`].
    pub exponent: i32,
}

impl ScaledMeasurement {
    /// The SI prefix for this measurement's exponent, empty when the
    /// exponent has no prefix in the formatting range.
    pub fn si_prefix(&self) -> &'static str {
        exponent_to_si_prefix(self.exponent)
    }

    /// Prefix concatenated with a physical unit symbol, e.g. `uV` or `kHz`.
    pub fn unit_label(&self, unit: &str) -> String {
        format!("{}{}", self.si_prefix(), unit)
    }
}

/// ### Decode Scientific
///
/// Extract the first scientific-notation number from `reply` and rescale it
/// onto a valid SI exponent.
///
/// While the parsed exponent is not a valid SI exponent, it is decremented
/// by one and the mantissa multiplied by ten, so the total magnitude is
/// preserved: `5E-5` decodes to `50.0, -6`.
///
/// Fails with [`Error::MalformedReply`] when no scientific-notation pattern
/// is present, and with [`Error::NumericParseError`] when a matched
/// substring does not parse as a number.
///
pub fn decode_scientific(reply: &str) -> Result<ScaledMeasurement> {
    let caps = SCI_NOTATION.captures(reply).ok_or_else(|| Error::MalformedReply {
        reply: reply.to_string(),
    })?;

    let mut value: f64 = caps[1].parse().map_err(|_| Error::NumericParseError {
        reply: reply.to_string(),
    })?;
    // caps[2] starts with the 'e'/'E' marker; the sign, if any, follows it.
    let mut exponent: i32 = caps[2][1..].parse().map_err(|_| Error::NumericParseError {
        reply: reply.to_string(),
    })?;

    while !si::VALID_EXPONENTS.contains(&exponent) {
        exponent -= 1;
        value *= 10.0;
    }

    Ok(ScaledMeasurement { value, exponent })
}

/// ### Exponent to SI Prefix
///
/// Map an exponent to its metric prefix, covering femto through peta.
/// Exponents outside that range (including the ±18..±24 band the decoder
/// accepts) map to the empty string and display unprefixed.
///
pub fn exponent_to_si_prefix(exponent: i32) -> &'static str {
    match exponent {
        -15 => "f",
        -12 => "p",
        -9 => "n",
        -6 => "u",
        -3 => "m",
        0 => "",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        _ => "",
    }
}

/// ### SI Prefix to Exponent
///
/// Map the first character of `prefix` to its exponent. Recognizes the full
/// yocto..yotta range plus centi and deci. Unknown or empty input yields 0.
///
pub fn si_prefix_to_exponent(prefix: &str) -> i32 {
    match prefix.chars().next() {
        Some('y') => -24,
        Some('z') => -21,
        Some('a') => -18,
        Some('f') => -15,
        Some('p') => -12,
        Some('n') => -9,
        Some('u') => -6,
        Some('m') => -3,
        Some('c') => -2,
        Some('d') => -1,
        Some('k') => 3,
        Some('M') => 6,
        Some('G') => 9,
        Some('T') => 12,
        Some('P') => 15,
        Some('E') => 18,
        Some('Z') => 21,
        Some('Y') => 24,
        _ => 0,
    }
}
