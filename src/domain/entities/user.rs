use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError};
use uuid::Uuid;

use crate::domain::password::validate_password_strength;
use crate::domain::policy::Identity;
use crate::entities::option_fields::{
    list, new_validation_error, validate_text_list, validate_text_list_patch, OptionField, PatchString,
};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_cgpa: Option<f64>,
    pub tenth_percentage: Option<f64>,
    pub twelfth_percentage: Option<f64>,
    pub skills: Vec<String>,
    pub resume: Option<String>,
    pub profile_picture: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug)]
pub struct UserInsert {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_cgpa: Option<f64>,
    pub tenth_percentage: Option<f64>,
    pub twelfth_percentage: Option<f64>,
    pub skills: Vec<String>,
    pub role: UserRole,
}

/// Serialized view of a user; the password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    #[serde(rename = "currentCGPA")]
    pub current_cgpa: Option<f64>,
    pub tenth_percentage: Option<f64>,
    pub twelfth_percentage: Option<f64>,
    pub skills: Vec<String>,
    pub resume: Option<String>,
    pub profile_picture: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone_number: user.phone_number,
            university: user.university,
            degree: user.degree,
            branch: user.branch,
            graduation_year: user.graduation_year,
            current_cgpa: user.current_cgpa,
            tenth_percentage: user.tenth_percentage,
            twelfth_percentage: user.twelfth_percentage,
            skills: user.skills,
            resume: user.resume,
            profile_picture: user.profile_picture,
            role: user.role,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Author/submitter card embedded in reviews and experiences.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSummary {
    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"))]
    pub last_name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,

    #[validate(length(max = 100, message = "University cannot exceed 100 characters"))]
    pub university: Option<String>,

    #[validate(length(max = 100, message = "Degree cannot exceed 100 characters"))]
    pub degree: Option<String>,

    #[validate(length(max = 100, message = "Branch cannot exceed 100 characters"))]
    pub branch: Option<String>,

    #[validate(range(min = 2020, max = 2030, message = "Graduation year must be between 2020 and 2030"))]
    pub graduation_year: Option<i32>,

    #[serde(rename = "currentCGPA")]
    #[validate(range(min = 0.0, max = 10.0, message = "CGPA must be between 0 and 10"))]
    pub current_cgpa: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "10th percentage must be between 0 and 100"))]
    pub tenth_percentage: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "12th percentage must be between 0 and 100"))]
    pub twelfth_percentage: Option<f64>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub skills: Vec<String>,
}

impl NewUser {
    /// Trims names and normalises the email before validation.
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = normalize_email(&self.email);
        self
    }

    /// Registration always produces a student; admins are provisioned out of band.
    pub fn prepare_for_insert(self, password_hash: String) -> UserInsert {
        UserInsert {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash,
            phone_number: self.phone_number,
            university: self.university,
            degree: self.degree,
            branch: self.branch,
            graduation_year: self.graduation_year,
            current_cgpa: self.current_cgpa,
            tenth_percentage: self.tenth_percentage,
            twelfth_percentage: self.twelfth_percentage,
            skills: self.skills,
            role: UserRole::Student,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"))]
    pub last_name: Option<String>,

    #[validate(custom(function = "validate_phone_patch"))]
    pub phone_number: PatchString,

    #[validate(length(max = 100, message = "University cannot exceed 100 characters"))]
    pub university: PatchString,

    #[validate(length(max = 100, message = "Degree cannot exceed 100 characters"))]
    pub degree: PatchString,

    #[validate(length(max = 100, message = "Branch cannot exceed 100 characters"))]
    pub branch: PatchString,

    #[validate(range(min = 2020, max = 2030, message = "Graduation year must be between 2020 and 2030"))]
    pub graduation_year: Option<i32>,

    #[serde(rename = "currentCGPA")]
    #[validate(range(min = 0.0, max = 10.0, message = "CGPA must be between 0 and 10"))]
    pub current_cgpa: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "10th percentage must be between 0 and 100"))]
    pub tenth_percentage: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "12th percentage must be between 0 and 100"))]
    pub twelfth_percentage: Option<f64>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub skills: OptionField<Vec<String>>,

    #[validate(length(max = 500, message = "Resume link cannot exceed 500 characters"))]
    pub resume: PatchString,

    #[validate(length(max = 500, message = "Profile picture link cannot exceed 500 characters"))]
    pub profile_picture: PatchString,
}

impl UpdateProfileRequest {
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.map(|s| s.trim().to_string());
        self.last_name = self.last_name.map(|s| s.trim().to_string());
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let compact: String = phone.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if PHONE_RE.is_match(&compact) {
        Ok(())
    } else {
        Err(new_validation_error("phone", "Please provide a valid phone number"))
    }
}

fn validate_phone_patch(phone: &PatchString) -> Result<(), ValidationError> {
    match phone {
        OptionField::SetToValue(value) => validate_phone(value),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> NewUser {
        serde_json::from_value(serde_json::json!({
            "firstName": "  Asha ",
            "lastName": "Verma",
            "email": " Asha.Verma@Example.COM ",
            "password": "Secret123",
            "phoneNumber": "+91 98765-43210",
            "graduationYear": 2025,
            "currentCGPA": 8.4
        }))
        .unwrap()
    }

    #[test]
    fn registration_is_normalized_and_valid() {
        let user = registration().normalized();
        assert_eq!(user.first_name, "Asha");
        assert_eq!(user.email, "asha.verma@example.com");
        assert!(user.skills.is_empty());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn registration_never_creates_admins() {
        let insert = registration().normalized().prepare_for_insert("hash".into());
        assert_eq!(insert.role, UserRole::Student);
    }

    #[test]
    fn out_of_range_academics_fail() {
        let mut user = registration().normalized();
        user.graduation_year = Some(2040);
        user.current_cgpa = Some(11.0);
        let errors = user.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("graduation_year"));
        assert!(errors.field_errors().contains_key("current_cgpa"));
    }

    #[test]
    fn profile_patch_validates_phone() {
        let patch: UpdateProfileRequest =
            serde_json::from_str(r#"{"phoneNumber": "call me"}"#).unwrap();
        assert!(patch.validate().is_err());

        let clear: UpdateProfileRequest =
            serde_json::from_str(r#"{"phoneNumber": null}"#).unwrap();
        assert!(clear.validate().is_ok());
    }
}
