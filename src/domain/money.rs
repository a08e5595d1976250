//! Amount handling
//!
//! Amounts travel as integer minor units (cents) and are only turned into a
//! decimal string at the moment they are written as XML text.

/// Parses a stored amount as non-negative minor units
///
/// Only plain ASCII digits are accepted: no sign, no separators, no spaces.
///
/// # Examples
///
/// ```
/// use sddgen::domain::money::parse_minor_units;
///
/// assert_eq!(parse_minor_units("1250"), Some(1250));
/// assert_eq!(parse_minor_units("12.50"), None);
/// assert_eq!(parse_minor_units(""), None);
/// ```
pub fn parse_minor_units(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Formats minor units as a decimal string with two fraction digits
///
/// # Examples
///
/// ```
/// use sddgen::domain::money::format_minor_units;
///
/// assert_eq!(format_minor_units(1), "0.01");
/// assert_eq!(format_minor_units(100), "1.00");
/// assert_eq!(format_minor_units(123456), "1234.56");
/// ```
pub fn format_minor_units(minor: u64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}

/// Converts a textual amount into a two-digit decimal string
///
/// Dots are stripped first, so a value that already is a decimal with two
/// fraction digits comes back unchanged. The last two characters form the
/// fraction, a missing major part renders as `0`.
///
/// # Examples
///
/// ```
/// use sddgen::domain::money::to_decimal_string;
///
/// assert_eq!(to_decimal_string("5"), "0.05");
/// assert_eq!(to_decimal_string("150.00"), "150.00");
/// assert_eq!(to_decimal_string(""), "0.00");
/// ```
pub fn to_decimal_string(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(|c| *c != '.').collect();
    let split = digits.len().saturating_sub(2);
    let major: String = digits[..split].iter().collect();
    let minor: String = digits[split..].iter().collect();

    let major = if major.is_empty() || major == "0" {
        "0".to_string()
    } else {
        major
    };

    format!("{major}.{minor:0>2}")
}

/// Parses a decimal amount with at most two fraction digits into minor units
///
/// # Examples
///
/// ```
/// use sddgen::domain::money::parse_decimal;
///
/// assert_eq!(parse_decimal("10.50"), Some(1050));
/// assert_eq!(parse_decimal("7"), Some(700));
/// assert_eq!(parse_decimal("1.234"), None);
/// ```
pub fn parse_decimal(raw: &str) -> Option<u64> {
    let (major, minor) = match raw.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (raw, ""),
    };
    if major.is_empty() || minor.len() > 2 || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let major = parse_minor_units(major)?;
    let minor = match minor.len() {
        0 => 0,
        1 => minor.parse::<u64>().ok()? * 10,
        _ => minor.parse::<u64>().ok()?,
    };
    major.checked_mul(100)?.checked_add(minor)
}
