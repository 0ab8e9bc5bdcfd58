//! Tolerant numeric coercion for amount values.
//!
//! Amounts cross several boundaries (cache files, Store responses, user
//! input) and historically arrive in mixed shapes: plain numbers, Postgres
//! numerics serialized as strings, currency-formatted strings, or null.
//! Every boundary funnels through `coerce_amount` so downstream sums and
//! percentages always operate on finite numbers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value to a finite amount.
///
/// Total over all inputs: null and non-numeric types map to 0.0, finite
/// numbers pass through unchanged, and strings are stripped down to digits,
/// minus signs, and periods before parsing. Anything that does not yield a
/// finite number maps to 0.0.
pub fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
                .collect();
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Serde adapter so model fields deserialize through `coerce_amount`.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_null_and_absent_types() {
        assert_eq!(coerce_amount(&Value::Null), 0.0);
        assert_eq!(coerce_amount(&json!(true)), 0.0);
        assert_eq!(coerce_amount(&json!([1, 2])), 0.0);
        assert_eq!(coerce_amount(&json!({"amount": 5})), 0.0);
    }

    #[test]
    fn test_coerce_finite_numbers_pass_through() {
        assert_eq!(coerce_amount(&json!(5000)), 5000.0);
        assert_eq!(coerce_amount(&json!(-12.5)), -12.5);
        assert_eq!(coerce_amount(&json!(0)), 0.0);
    }

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(coerce_amount(&json!("5000")), 5000.0);
        assert_eq!(coerce_amount(&json!("150000.00")), 150000.0);
        assert_eq!(coerce_amount(&json!("-42.5")), -42.5);
    }

    #[test]
    fn test_coerce_currency_formatted_strings() {
        assert_eq!(coerce_amount(&json!("Rs 5,000")), 5000.0);
        assert_eq!(coerce_amount(&json!("$1,234.56")), 1234.56);
    }

    #[test]
    fn test_coerce_garbage_defaults_to_zero() {
        assert_eq!(coerce_amount(&json!("")), 0.0);
        assert_eq!(coerce_amount(&json!("free")), 0.0);
        assert_eq!(coerce_amount(&json!("..--")), 0.0);
    }
}
