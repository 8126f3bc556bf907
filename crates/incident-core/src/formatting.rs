//! Number formatting shared by the terminal views and the plain-text report.

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use incident_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(27_312), "27,312");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a float with thousands separators and `decimals` fractional digits.
///
/// # Examples
///
/// ```
/// use incident_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(-9876.54, 2), "-9,876.54");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a `[0, 1]` share as a percentage with one decimal place.
///
/// ```
/// use incident_core::formatting::format_share;
///
/// assert_eq!(format_share(0.4251), "42.5%");
/// assert_eq!(format_share(0.0), "0.0%");
/// ```
pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
