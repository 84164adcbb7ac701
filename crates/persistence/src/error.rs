//! Mapping of database failures onto the domain error taxonomy.

use domain::DomainError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Converts a sqlx error into a [`DomainError`] by SQLSTATE.
pub fn db_err(err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::RowNotFound => DomainError::NotFound("Resource not found".into()),
        sqlx::Error::Database(db_err) => {
            let detail = db_err
                .constraint()
                .map(|c| format!("{} ({})", db_err.message(), c))
                .unwrap_or_else(|| db_err.message().to_string());

            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => DomainError::Conflict(detail),
                Some(FOREIGN_KEY_VIOLATION) => DomainError::Integrity(detail),
                Some(CHECK_VIOLATION) | Some(INVALID_TEXT_REPRESENTATION) => {
                    DomainError::Validation(detail)
                }
                _ => DomainError::Internal(format!("Database error: {}", detail)),
            }
        }
        other => DomainError::Internal(format!("Database error: {}", other)),
    }
}

/// Narrows an unsigned value for an `INTEGER` column.
pub fn to_int4(value: u32, column: &str) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::Validation(format!("{} is out of range: {}", column, value)))
}
