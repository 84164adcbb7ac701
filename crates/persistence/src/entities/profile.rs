//! Profile entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Gender, Profile, ShowMe};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for the `gender` PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum GenderDb {
    Male,
    Female,
    #[sqlx(rename = "non-binary")]
    NonBinary,
    Chair,
}

impl From<GenderDb> for Gender {
    fn from(db: GenderDb) -> Self {
        match db {
            GenderDb::Male => Gender::Male,
            GenderDb::Female => Gender::Female,
            GenderDb::NonBinary => Gender::NonBinary,
            GenderDb::Chair => Gender::Chair,
        }
    }
}

impl From<Gender> for GenderDb {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => GenderDb::Male,
            Gender::Female => GenderDb::Female,
            Gender::NonBinary => GenderDb::NonBinary,
            Gender::Chair => GenderDb::Chair,
        }
    }
}

/// Database enum for the `show_me` PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "show_me", rename_all = "lowercase")]
pub enum ShowMeDb {
    Men,
    Women,
    Both,
}

impl From<ShowMeDb> for ShowMe {
    fn from(db: ShowMeDb) -> Self {
        match db {
            ShowMeDb::Men => ShowMe::Men,
            ShowMeDb::Women => ShowMe::Women,
            ShowMeDb::Both => ShowMe::Both,
        }
    }
}

impl From<ShowMe> for ShowMeDb {
    fn from(show_me: ShowMe) -> Self {
        match show_me {
            ShowMe::Men => ShowMeDb::Men,
            ShowMe::Women => ShowMeDb::Women,
            ShowMe::Both => ShowMeDb::Both,
        }
    }
}

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub has_account: bool,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub city: Option<String>,
    pub university: Option<String>,
    pub description: Option<String>,
    pub gender: GenderDb,
    pub show_me: ShowMeDb,
}

impl From<ProfileEntity> for Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            firstname: entity.firstname,
            lastname: entity.lastname,
            is_staff: entity.is_staff,
            is_active: entity.is_active,
            created_at: entity.created_at,
            has_account: entity.has_account,
            birthdate: entity.birthdate,
            age: entity.age.map(|age| age.max(0) as u32),
            nationality: entity.nationality,
            city: entity.city,
            university: entity.university,
            description: entity.description,
            gender: entity.gender.into(),
            show_me: entity.show_me.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_conversions_are_bijective() {
        for gender in [Gender::Male, Gender::Female, Gender::NonBinary, Gender::Chair] {
            assert_eq!(Gender::from(GenderDb::from(gender)), gender);
        }
        for show_me in [ShowMe::Men, ShowMe::Women, ShowMe::Both] {
            assert_eq!(ShowMe::from(ShowMeDb::from(show_me)), show_me);
        }
    }
}
