// Star count formatting.
// Renders raw counts into display strings per the configured style.

use crate::settings::{NumberFormat, STARS_PLACEHOLDER};

/// Shown while a count is loading.
pub const PLACEHOLDER_TEXT: &str = "…";

/// Substituted for the number when the count is unknown.
pub const UNKNOWN_TEXT: &str = "?";

/// Render `stars` and substitute it into `template`.
///
/// Only the first `{stars}` is replaced. Templates without one are returned
/// unchanged; settings validation keeps those out.
pub fn format_stars(stars: u64, mode: NumberFormat, template: &str) -> String {
    let number = match mode {
        NumberFormat::Full => group_thousands(stars),
        NumberFormat::Abbreviated => abbreviate(stars),
    };
    template.replacen(STARS_PLACEHOLDER, &number, 1)
}

/// Render the loading indicator with the same template.
pub fn format_placeholder(template: &str) -> String {
    template.replacen(STARS_PLACEHOLDER, PLACEHOLDER_TEXT, 1)
}

/// Render the unknown indicator with the same template.
pub fn format_unknown(template: &str) -> String {
    template.replacen(STARS_PLACEHOLDER, UNKNOWN_TEXT, 1)
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact form. Rounding is half-up on the last shown digit.
fn abbreviate(n: u64) -> String {
    match n {
        0..1_000 => group_thousands(n),
        1_000..10_000 => one_decimal(n, 1_000, "k"),
        10_000..1_000_000 => format!("{}k", round_div(n, 1_000)),
        _ => one_decimal(n, 1_000_000, "M"),
    }
}

fn one_decimal(n: u64, unit: u64, suffix: &str) -> String {
    let tenths = round_div(n, unit / 10);
    format!("{}.{}{}", group_thousands(tenths / 10), tenths % 10, suffix)
}

fn round_div(n: u64, d: u64) -> u64 {
    n / d + u64::from(n % d >= d - d / 2)
}
