use crate::error::{Error, Result};
use serde_json::Value as JsonValue;

/// Parse a caller-supplied grade. Integer numbers and integer strings are
/// accepted; anything else, and anything outside 0..=100, is a validation
/// error.
pub fn parse_grade(raw: &JsonValue) -> Result<i32> {
    let value = match raw {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| invalid_grade())?,
        JsonValue::String(s) => s.trim().parse::<i64>().map_err(|_| invalid_grade())?,
        JsonValue::Null => return Err(Error::ValidationMsg("Grade is required".to_string())),
        _ => return Err(invalid_grade()),
    };

    if !(0..=100).contains(&value) {
        return Err(invalid_grade());
    }
    Ok(value as i32)
}

fn invalid_grade() -> Error {
    Error::ValidationMsg("Grade must be a number between 0 and 100".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_boundaries() {
        assert_eq!(parse_grade(&json!(0)).unwrap(), 0);
        assert_eq!(parse_grade(&json!(100)).unwrap(), 100);
        assert_eq!(parse_grade(&json!("50")).unwrap(), 50);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(parse_grade(&json!(-1)).is_err());
        assert!(parse_grade(&json!(101)).is_err());
        assert!(parse_grade(&json!("abc")).is_err());
        assert!(parse_grade(&json!(54.5)).is_err());
        assert!(parse_grade(&json!(null)).is_err());
        assert!(parse_grade(&json!([50])).is_err());
    }
}
