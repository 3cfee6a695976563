use serde_json::Value;
#[allow(clippy::cast_possible_truncation)]
pub fn round_f64_to_i64(v: f64) -> Option<i64> {
    const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
    const I64_MAX_F64: f64 = 9_223_372_036_854_774_784.0;
    if !v.is_finite() {
        return None;
    }
    let rounded = v.round();
    if !(I64_MIN_F64..=I64_MAX_F64).contains(&rounded) {
        return None;
    }
    Some(rounded as i64)
}
pub fn parse_number_str(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() || t == "-" {
        return None;
    }
    t.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
#[cfg(test)]
mod tests {
    use super::{parse_number_str, round_f64_to_i64, value_number};
    use serde_json::json;
    #[test]
    fn thousands_separators_and_dash_placeholder() {
        assert_eq!(parse_number_str(" 1,250 "), Some(1250.0));
        assert_eq!(parse_number_str("-"), None);
        assert_eq!(parse_number_str("abc"), None);
        assert_eq!(parse_number_str("NaN"), None);
    }
    #[test]
    fn rounding_rejects_out_of_range() {
        assert_eq!(round_f64_to_i64(2.5), Some(3));
        assert_eq!(round_f64_to_i64(f64::INFINITY), None);
        assert_eq!(round_f64_to_i64(1e30), None);
    }
    #[test]
    fn json_values_coerce() {
        assert_eq!(value_number(&json!(3)), Some(3.0));
        assert_eq!(value_number(&json!("12.5")), Some(12.5));
        assert_eq!(value_number(&json!(true)), None);
    }
}
