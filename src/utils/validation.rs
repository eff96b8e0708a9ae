use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

/// Empty is accepted; callers decide whether the field is required.
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.is_empty() || email_regex().is_match(email) {
        Ok(())
    } else {
        Err(AppError::ValidationError(
            "email: Enter a valid email address.".to_string(),
        ))
    }
}

/// Trimmed value, with blank strings treated as absent (HTML forms send "").
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Height/weight style measurement: blank means unset, otherwise a positive number.
pub fn parse_measurement(field: &str, value: Option<&str>) -> AppResult<Option<f64>> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => {
            let n: f64 = v
                .parse()
                .map_err(|_| AppError::ValidationError(format!("{field}: A valid number is required.")))?;
            check_measurement(field, Some(n))
        }
    }
}

pub fn check_measurement(field: &str, value: Option<f64>) -> AppResult<Option<f64>> {
    match value {
        Some(n) if !n.is_finite() || n <= 0.0 || n >= 1000.0 => Err(AppError::ValidationError(
            format!("{field}: Must be a positive number below 1000."),
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("member@example.com").is_ok());
        assert!(validate_email("").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Jane ")), Some("Jane".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("height", Some("180.5")).unwrap(), Some(180.5));
        assert_eq!(parse_measurement("height", Some("")).unwrap(), None);
        assert!(parse_measurement("weight", Some("heavy")).is_err());
        assert!(parse_measurement("weight", Some("-3")).is_err());
    }
}
