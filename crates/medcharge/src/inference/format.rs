//! Human-readable rendering of estimates.

/// `₹12,345.68/-` style line shown to the applicant.
pub fn format_estimate(amount: f32) -> String {
    format!("Estimated Insurance Cost: ₹{}/-", format_amount(amount))
}

/// Two decimals with comma thousands separators: `1234567.891` -> `1,234,567.89`.
pub fn format_amount(amount: f32) -> String {
    let fixed = format!("{:.2}", amount as f64);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac}")
}
