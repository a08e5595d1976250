//! Identifier and filename generation for generated files

use chrono::NaiveDateTime;
use rand::Rng;

/// Builds a message id: `ddMMyyyy` + seconds + minutes, `-`, 12 hex chars
///
/// Unique enough to avoid collisions between files; not a security token.
pub fn message_id(now: NaiveDateTime) -> String {
    let random: u64 = rand::thread_rng().gen();
    let suffix = format!("{random:016x}");
    format!("{}-{}", now.format("%d%m%Y%S%M"), &suffix[..12])
}

/// Builds a payment information id: `PAY-ID-{section}-{sequence}-{YYYYMMDDTHHMMSS}`
pub fn batch_id(section: usize, sequence_type: &str, now: NaiveDateTime) -> String {
    format!(
        "PAY-ID-{}-{}-{}",
        section,
        sequence_type,
        now.format("%Y%m%dT%H%M%S")
    )
}

/// Builds the filename of the `file_number`-th (1-based) file of a run
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sddgen::core::document::naming::filename;
///
/// let at = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(9, 5, 7).unwrap();
/// assert_eq!(
///     filename("NL91ABNA0417164300", at, 1),
///     "NL91ABNA0417164300-20250301090507-0001-SDD.xml"
/// );
/// ```
pub fn filename(creditor_iban: &str, run_started: NaiveDateTime, file_number: u64) -> String {
    let raw = format!(
        "{} {} {:04}-SDD",
        creditor_iban,
        run_started.format("%Y%m%d%H:%M:%S"),
        file_number
    );
    format!("{}.xml", slugify(&raw).to_uppercase())
}

/// Lowercases, drops everything but ASCII alphanumerics and separators, and
/// collapses separator runs (whitespace, `-`, `_`) to a single `-`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || matches!(c, '-' | '_') {
            pending_dash = true;
        }
    }

    slug
}
