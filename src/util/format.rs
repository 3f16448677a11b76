//! pt-BR number formatting for quote summaries.

/// `1234.5` -> `"1.234,50"`.
pub fn decimal(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let rendered = format!("{:.*}", places, value.abs());
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && rendered.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{fraction}")
    }
}

/// `1234.5` -> `"R$ 1.234,50"`.
pub fn brl(value: f64) -> String {
    let amount = decimal(value, 2);
    match amount.strip_prefix('-') {
        Some(positive) if value.is_finite() => format!("-R$ {positive}"),
        _ => format!("R$ {amount}"),
    }
}

/// `12.345` -> `"12,3%"`.
pub fn percent(value: f64) -> String {
    format!("{}%", decimal(value, 1))
}
