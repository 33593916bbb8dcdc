/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Round half away from zero; the nudge keeps exact midpoints such as
    // 12.345 from rounding down through their binary representation.
    let factor = 10_f64.powi(decimals as i32);
    let scaled = value.abs() * factor;
    let rounded = (scaled + f64::EPSILON * scaled).round() / factor;

    let fixed = format!("{:.*}", decimals as usize, rounded);
    let (digits, fraction) = match fixed.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + digits.len() / 3 + 1);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Format a monetary amount as a USD string with two decimal places and
/// thousands separators.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56),  "$1,234.56");
/// assert_eq!(format_currency(0.0),      "$0.00");
/// assert_eq!(format_currency(-9.99),    "$-9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("$-{}", format_number(amount.abs(), 2))
    } else {
        format!("${}", format_number(amount, 2))
    }
}

/// Format a duration in minutes with two decimals, or `"no data"` when the
/// mean is undefined.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_minutes;
///
/// assert_eq!(format_minutes(Some(12.345)), "12.35 min");
/// assert_eq!(format_minutes(None), "no data");
/// ```
pub fn format_minutes(minutes: Option<f64>) -> String {
    match minutes {
        Some(m) => format!("{} min", format_number(m, 2)),
        None => NO_DATA.to_string(),
    }
}

/// Placeholder shown wherever a metric has nothing to report.
pub const NO_DATA: &str = "no data";

// ── Tests ──────────────────────────────────────────────────────────────────────
