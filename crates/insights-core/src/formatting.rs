//! Number formatting for the text tables.

/// Format a message or member count with comma separators.
///
/// ```
/// use insights_core::formatting::format_count;
///
/// assert_eq!(format_count(7), "7");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    with_separators(&value.to_string())
}

/// Format a per-day mean with two decimals and comma separators.
///
/// ```
/// use insights_core::formatting::format_mean;
///
/// assert_eq!(format_mean(2.5), "2.50");
/// assert_eq!(format_mean(1234.5), "1,234.50");
/// ```
pub fn format_mean(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    match fixed.split_once('.') {
        Some((whole, frac)) => format!("{}.{}", with_separators(whole), frac),
        None => with_separators(&fixed),
    }
}

/// Round `value` to `decimal_places`.
///
/// ```
/// use insights_core::formatting::round_to;
///
/// assert_eq!(round_to(4.0 / 3.0, 2), 1.33);
/// ```
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10_f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

/// Insert a comma before every group of three digits, counting from the
/// right.  A leading `-` is kept in front.
fn with_separators(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
