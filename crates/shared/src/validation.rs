//! Common validation utilities.

use chrono::{Datelike, NaiveDate, Utc};
use validator::{ValidateEmail, ValidationError};

/// Maximum stored length of an email address.
pub const MAX_EMAIL_LENGTH: usize = 200;

/// Earliest birth year accepted for a profile.
const MIN_BIRTH_YEAR: i32 = 1900;

/// Trims and lower-cases an email so it can be compared for uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates email syntax and length in characters.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if email.chars().count() > MAX_EMAIL_LENGTH {
        let mut err = ValidationError::new("email_length");
        err.message = Some("Email must be at most 200 characters".into());
        return Err(err);
    }
    if !email.validate_email() {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Email address is malformed".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a birthdate is neither in the future nor implausibly old.
pub fn validate_birthdate(birthdate: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    if *birthdate > today {
        let mut err = ValidationError::new("birthdate_future");
        err.message = Some("Birthdate cannot be in the future".into());
        return Err(err);
    }
    if birthdate.year() < MIN_BIRTH_YEAR {
        let mut err = ValidationError::new("birthdate_range");
        err.message = Some("Birthdate must be after 1900".into());
        return Err(err);
    }
    Ok(())
}

/// Age in whole years on `today` for someone born on `birthdate`.
///
/// Returns 0 when `birthdate` is after `today`.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    if birthdate > today {
        return 0;
    }
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("a@x.com").is_ok());
        assert!(validate_email_address("not-an-email").is_err());
        assert!(validate_email_address("").is_err());
    }

    #[test]
    fn test_validate_email_address_too_long() {
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        let err = validate_email_address(&long).unwrap_err();
        assert_eq!(err.code, "email_length");
    }

    #[test]
    fn test_email_length_counts_characters() {
        // 162 characters but more than 300 bytes.
        let wide = format!("{}@example.com", "é".repeat(150));
        assert!(wide.len() > MAX_EMAIL_LENGTH);
        let err = validate_email_address(&wide).unwrap_err();
        assert_eq!(err.code, "email_format");
    }

    #[test]
    fn test_validate_birthdate() {
        assert!(validate_birthdate(&date(1998, 4, 12)).is_ok());
        assert!(validate_birthdate(&date(1850, 1, 1)).is_err());

        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        let err = validate_birthdate(&tomorrow).unwrap_err();
        assert_eq!(err.code, "birthdate_future");
    }

    #[test]
    fn test_age_on_before_and_after_birthday() {
        let birthdate = date(2000, 6, 15);
        assert_eq!(age_on(birthdate, date(2024, 6, 14)), 23);
        assert_eq!(age_on(birthdate, date(2024, 6, 15)), 24);
        assert_eq!(age_on(birthdate, date(2024, 12, 31)), 24);
    }

    #[test]
    fn test_age_on_leap_day() {
        let birthdate = date(2004, 2, 29);
        assert_eq!(age_on(birthdate, date(2023, 2, 28)), 18);
        assert_eq!(age_on(birthdate, date(2023, 3, 1)), 19);
    }

    #[test]
    fn test_age_on_future_birthdate() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), 0);
    }
}
