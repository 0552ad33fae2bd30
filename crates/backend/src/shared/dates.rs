use chrono::NaiveDate;

/// Разбор необязательного query-параметра с датой (формат YYYY-MM-DD).
/// Пустая строка равнозначна отсутствию параметра.
pub fn parse_date_param(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, String> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| format!("invalid {} (expected YYYY-MM-DD): {}", field, raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        assert_eq!(parse_date_param(None, "date_from").unwrap(), None);
        assert_eq!(parse_date_param(Some("  "), "date_from").unwrap(), None);
        assert_eq!(
            parse_date_param(Some("2025-03-01"), "date_from").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert!(parse_date_param(Some("03/01/2025"), "date_from").is_err());
    }
}
