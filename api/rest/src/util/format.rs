/// Share of `target` already raised, in percent. A zero target yields 0.
pub fn funding_percentage(current: &i64, target: &i64) -> f64 {
    if *target <= 0 {
        return 0.0;
    }
    *current as f64 / *target as f64 * 100.0
}

pub fn format_percentage(percentage: &f64) -> String {
    format!("{percentage:.1}%")
}

/// `5000, "xaf"` becomes `"5,000 XAF"`.
pub fn format_amount(amount: &i64, currency: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if *amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} {}", currency.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage() {
        assert_eq!(funding_percentage(&2500, &10000), 25.0);
        assert_eq!(funding_percentage(&100, &0), 0.0);
        assert_eq!(format_percentage(&funding_percentage(&1, &3)), "33.3%");
        assert_eq!(format_percentage(&100.0), "100.0%");
    }

    #[test]
    fn amount() {
        assert_eq!(format_amount(&5000, "xaf"), "5,000 XAF");
        assert_eq!(format_amount(&999, "xaf"), "999 XAF");
        assert_eq!(format_amount(&0, "xaf"), "0 XAF");
        assert_eq!(format_amount(&1234567, "usd"), "1,234,567 USD");
        assert_eq!(format_amount(&-15000, "xaf"), "-15,000 XAF");
    }
}
