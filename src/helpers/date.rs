//! Date formatting with Moment.js-style patterns, as used in `_config.yml`

use chrono::{DateTime, TimeZone};

/// Moment tokens and their chrono equivalents, longest first
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("A", "%p"),
    ("ZZ", "%z"),
    ("Z", "%:z"),
];

/// Format a date using a Moment.js-style format string
///
/// ```ignore
/// format_date(&date, "MMM D, YYYY") // -> "Jan 5, 2024"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format(&moment_to_chrono_format(format)).to_string()
}

/// Convert a Moment.js format to a chrono format string.
///
/// Text in `[brackets]` is copied literally; unknown letters pass through.
pub fn moment_to_chrono_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'scan: while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end].replace('%', "%%"));
                rest = &rest[end + 1..];
                continue;
            }
        }
        for (token, chrono) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(chrono);
                rest = after;
                continue 'scan;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}
