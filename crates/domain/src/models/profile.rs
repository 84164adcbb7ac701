//! Profile domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Gender of a profile, also used as the filter of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    #[default]
    Male,
    Female,
    NonBinary,
    Chair,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non-binary",
            Gender::Chair => "chair",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "non-binary" => Ok(Gender::NonBinary),
            "chair" => Ok(Gender::Chair),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which profiles someone wants to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowMe {
    Men,
    #[default]
    Women,
    Both,
}

impl ShowMe {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowMe::Men => "men",
            ShowMe::Women => "women",
            ShowMe::Both => "both",
        }
    }
}

impl FromStr for ShowMe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "men" => Ok(ShowMe::Men),
            "women" => Ok(ShowMe::Women),
            "both" => Ok(ShowMe::Both),
            _ => Err(format!("Invalid show_me preference: {}", s)),
        }
    }
}

impl fmt::Display for ShowMe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user account.
///
/// `id` never changes and is what access tokens carry as `user_id`.
/// `email` is unique across all profiles and is the login identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub has_account: bool,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<u32>,
    pub nationality: Option<String>,
    pub city: Option<String>,
    pub university: Option<String>,
    pub description: Option<String>,
    pub gender: Gender,
    pub show_me: ShowMe,
}

impl Profile {
    /// Builds a freshly registered profile with the column defaults applied.
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            firstname: None,
            lastname: None,
            is_staff: false,
            is_active: true,
            created_at: super::timestamp_now(),
            has_account: false,
            birthdate: None,
            age: None,
            nationality: None,
            city: None,
            university: None,
            description: None,
            gender: Gender::default(),
            show_me: ShowMe::default(),
        }
    }

    /// First and last name concatenated; missing parts count as empty.
    pub fn full_name(&self) -> String {
        format!(
            "{}{}",
            self.firstname.as_deref().unwrap_or_default(),
            self.lastname.as_deref().unwrap_or_default()
        )
    }

    /// Whether the account may be used to sign in.
    pub fn can_authenticate(&self) -> bool {
        self.is_active
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterProfileRequest {
    #[validate(
        email(message = "Email address is malformed"),
        length(max = 200, message = "Email must be at most 200 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(max = 200, message = "First name must be at most 200 characters"))]
    pub firstname: Option<String>,

    #[validate(length(max = 200, message = "Last name must be at most 200 characters"))]
    pub lastname: Option<String>,
}

/// Partial profile edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 200, message = "First name must be at most 200 characters"))]
    pub firstname: Option<String>,

    #[validate(length(max = 200, message = "Last name must be at most 200 characters"))]
    pub lastname: Option<String>,

    #[validate(custom(function = "shared::validation::validate_birthdate"))]
    pub birthdate: Option<NaiveDate>,

    #[validate(length(max = 20, message = "Nationality must be at most 20 characters"))]
    pub nationality: Option<String>,

    #[validate(length(max = 15, message = "City must be at most 15 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 40, message = "University must be at most 40 characters"))]
    pub university: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub gender: Option<Gender>,

    pub show_me: Option<ShowMe>,
}

impl UpdateProfileRequest {
    /// Applies the edit to `profile`, re-deriving `age` from a new birthdate.
    pub fn apply_to(self, profile: &mut Profile, today: NaiveDate) {
        if let Some(firstname) = self.firstname {
            profile.firstname = Some(firstname);
        }
        if let Some(lastname) = self.lastname {
            profile.lastname = Some(lastname);
        }
        if let Some(birthdate) = self.birthdate {
            profile.birthdate = Some(birthdate);
            profile.age = Some(shared::validation::age_on(birthdate, today));
        }
        if let Some(nationality) = self.nationality {
            profile.nationality = Some(nationality);
        }
        if let Some(city) = self.city {
            profile.city = Some(city);
        }
        if let Some(university) = self.university {
            profile.university = Some(university);
        }
        if let Some(description) = self.description {
            profile.description = Some(description);
        }
        if let Some(gender) = self.gender {
            profile.gender = gender;
        }
        if let Some(show_me) = self.show_me {
            profile.show_me = show_me;
        }
    }
}
