/// Above this, cents exceed f64 integer precision and the u64 cast can
/// saturate; such amounts render plain instead of grouped.
const GROUPING_LIMIT: f64 = 1e15;

/// Format an amount with thousands separators for display.
/// Whole amounts drop the decimal part; fractional amounts keep two places.
pub fn format_amount(amount: f64) -> String {
    if amount.abs() >= GROUPING_LIMIT {
        return format!("{:.2}", amount);
    }
    let negative = amount < 0.0;
    let total_cents = (amount.abs() * 100.0).round() as u64;
    let whole = total_cents / 100;
    let cents = total_cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if cents > 0 {
        out.push_str(&format!(".{:02}", cents));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(150000.0), "150,000");
        assert_eq!(format_amount(5000.0), "5,000");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1234567.0), "1,234,567");
    }

    #[test]
    fn test_format_amount_fractional() {
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(0.25), "0.25");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-5000.0), "-5,000");
    }

    #[test]
    fn test_format_amount_huge_values_render_plain() {
        assert_eq!(format_amount(2e17), "200000000000000000.00");
        assert_eq!(format_amount(-2e17), "-200000000000000000.00");
    }
}
