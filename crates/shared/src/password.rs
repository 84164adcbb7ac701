//! Password hashing and password policy.
//!
//! Hashes are stored in PHC format using Argon2id. The policy mirrors the
//! rules profiles were historically registered under: minimum length, not
//! entirely numeric, not a well-known password, not derived from the email.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Reason a candidate password was refused by [`check_password_policy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyViolation {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password cannot be entirely numeric")]
    EntirelyNumeric,

    #[error("Password is too common")]
    TooCommon,

    #[error("Password is too similar to the email address")]
    TooSimilarToEmail,
}

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id parameters following OWASP recommendations (2024).
const MEMORY_COST: u32 = 19456; // 19 MiB in KiB
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "abc12345",
    "trustno1",
    "superman",
    "starwars",
    "whatever",
];

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id.
///
/// Returns a PHC-formatted string that embeds algorithm, parameters and salt.
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("night-out-2024").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash in constant time.
///
/// `Ok(false)` means the password is wrong; `Err` means the stored hash is
/// unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters are read from the hash itself
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks a candidate password against the registration policy.
///
/// `email` is the address the password is being registered for; a password
/// containing the local part of the address (or vice versa) is refused.
pub fn check_password_policy(password: &str, email: &str) -> Result<(), PasswordPolicyViolation> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyViolation::TooShort(MIN_PASSWORD_LENGTH));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyViolation::EntirelyNumeric);
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(PasswordPolicyViolation::TooCommon);
    }

    let local_part = email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if local_part.len() >= 3 && (lowered.contains(&local_part) || local_part.contains(&lowered)) {
        return Err(PasswordPolicyViolation::TooSimilarToEmail);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_returns_phc_format() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_hash_password_produces_unique_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash_format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "mot de passe très sûr";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_policy_accepts_reasonable_password() {
        assert!(check_password_policy("Sunset-Rooftop-7", "alice@example.com").is_ok());
    }

    #[test]
    fn test_policy_rejects_short_password() {
        assert_eq!(
            check_password_policy("short1", "alice@example.com"),
            Err(PasswordPolicyViolation::TooShort(MIN_PASSWORD_LENGTH))
        );
    }

    #[test]
    fn test_policy_rejects_numeric_password() {
        assert_eq!(
            check_password_policy("4815162342", "alice@example.com"),
            Err(PasswordPolicyViolation::EntirelyNumeric)
        );
    }

    #[test]
    fn test_policy_rejects_common_password() {
        assert_eq!(
            check_password_policy("Password123", "alice@example.com"),
            Err(PasswordPolicyViolation::TooCommon)
        );
    }

    #[test]
    fn test_policy_rejects_password_derived_from_email() {
        assert_eq!(
            check_password_policy("marguerite2024", "marguerite@example.com"),
            Err(PasswordPolicyViolation::TooSimilarToEmail)
        );
    }

    #[test]
    fn test_policy_ignores_tiny_local_parts() {
        // "jo" is too short to count as a meaningful overlap
        assert!(check_password_policy("jo-in-paris-9", "jo@example.com").is_ok());
    }
}
