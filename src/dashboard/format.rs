//! Number formatting for KPI text.

/// Round to `decimals` places and group the integer part in thousands:
/// `thousands(5821.4, 0) == "5,821"`.
pub fn thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rendered = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let negative = value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn percent(value: f64, decimals: usize) -> String {
    format!("{}%", thousands(value, decimals))
}
