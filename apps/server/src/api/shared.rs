use hearth_core::money::parse_cents;

use crate::error::{ApiError, ApiResult};

/// Splits a `a,b,c` query value into ids.
pub fn split_ids(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves an amount given either as integer cents or as decimal text
/// (`"1.234,56"`, `"1234.56"`).
pub fn resolve_cents(cents: Option<i64>, text: Option<&str>, field: &str) -> ApiResult<i64> {
    match (cents, text) {
        (Some(cents), _) => Ok(cents),
        (None, Some(text)) => Ok(parse_cents(text)?),
        (None, None) => Err(ApiError::BadRequest(format!(
            "{}Cents or {} is required",
            field, field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ids() {
        assert_eq!(split_ids(Some("a, b,,c ")), vec!["a", "b", "c"]);
        assert!(split_ids(None).is_empty());
    }

    #[test]
    fn test_resolve_cents_prefers_integer_field() {
        assert_eq!(resolve_cents(Some(150), Some("9,99"), "amount").unwrap(), 150);
        assert_eq!(resolve_cents(None, Some("1.234,56"), "amount").unwrap(), 123_456);
        assert!(resolve_cents(None, None, "amount").is_err());
    }
}
