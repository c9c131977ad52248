//! Threshold size parsing.
//!
//! Sizes are written as a number with an optional unit: plain bytes (`512`,
//! `512B`), decimal units (`KB`, `MB`, `GB`, base 1000) or binary units (`KiB`,
//! `MiB`, `GiB`, base 1024). Units are case-insensitive and the number may
//! carry a fractional part (`1.5KB`).

use anyhow::{Result, bail};

/// Longest suffixes first so `KIB` is not taken for `B`.
const UNITS: &[(&str, u64)] = &[
    ("GIB", 1 << 30),
    ("MIB", 1 << 20),
    ("KIB", 1 << 10),
    ("GB", 1_000_000_000),
    ("MB", 1_000_000),
    ("KB", 1_000),
    ("B", 1),
];

/// Maximum number of fractional digits accepted.
const MAX_FRACTION_DIGITS: usize = 9;

/// Parse a human-readable size string into bytes.
///
/// Fractional byte counts are truncated (`1.0005KB` is `1000`).
///
/// # Errors
///
/// Returns an error if the string is empty, has an unknown unit, is not a
/// non-negative number, has more than nine fractional digits, or overflows
/// `u64`.
///
/// # Examples
///
/// ```
/// # use concatenator::utils::parse_size;
/// assert_eq!(parse_size("4KiB").unwrap(), 4096);
/// assert_eq!(parse_size("1.5KB").unwrap(), 1500);
/// ```
pub fn parse_size(size_str: &str) -> Result<u64> {
    let normalized = size_str.trim().to_uppercase();
    let (number, multiplier) = split_unit(&normalized);

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

    if whole.is_empty() && fraction.is_empty() {
        bail!("Invalid size: {size_str:?}");
    }
    if !is_digits(whole) || !is_digits(fraction) {
        bail!("Invalid size: {size_str:?}");
    }
    if fraction.len() > MAX_FRACTION_DIGITS {
        bail!("Too many decimal places in size: {size_str:?}");
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse()? };
    let fraction_bytes = if fraction.is_empty() {
        0
    } else {
        let digits = u32::try_from(fraction.len())?;
        fraction.parse::<u128>()? * u128::from(multiplier) / 10u128.pow(digits)
    };

    let total = whole
        .checked_mul(u128::from(multiplier))
        .and_then(|bytes| bytes.checked_add(fraction_bytes))
        .and_then(|bytes| u64::try_from(bytes).ok());

    match total {
        Some(bytes) => Ok(bytes),
        None => bail!("Size is too large: {size_str:?}"),
    }
}

/// Split a known unit suffix off an upper-cased size string.
fn split_unit(size_str: &str) -> (&str, u64) {
    UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            size_str
                .strip_suffix(suffix)
                .map(|number| (number.trim_end(), *multiplier))
        })
        .unwrap_or((size_str, 1))
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
