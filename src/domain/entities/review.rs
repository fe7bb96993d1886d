use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::policy::{is_privileged, Identity};
use crate::entities::{
    common::Difficulty,
    option_fields::{list, optional_datetime, validate_text_list, validate_text_list_patch, OptionField, PatchString},
    pagination::SortOrder,
    user::UserSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "review_experience", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewExperience {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "review_result", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewResult {
    Selected,
    Rejected,
    #[default]
    Pending,
    OfferDeclined,
}

/// Rounds a rating to one decimal place.
pub fn round_rating(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub job_role: String,
    pub interview_date: Option<DateTime<Utc>>,
    pub overall_rating: f64,
    pub interview_difficulty: Difficulty,
    pub interview_experience: ReviewExperience,
    pub title: String,
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub technical_questions: Vec<String>,
    pub hr_questions: Vec<String>,
    pub interview_rounds: Option<i32>,
    pub tips: Option<String>,
    pub result: ReviewResult,
    pub salary_offered: Option<f64>,
    pub would_recommend: bool,
    pub is_anonymous: bool,
    pub is_verified: bool,
    pub helpful_votes: i32,
    pub report_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ReviewInsert {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub job_role: String,
    pub interview_date: Option<DateTime<Utc>>,
    pub overall_rating: f64,
    pub interview_difficulty: Difficulty,
    pub interview_experience: ReviewExperience,
    pub title: String,
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub technical_questions: Vec<String>,
    pub hr_questions: Vec<String>,
    pub interview_rounds: Option<i32>,
    pub tips: Option<String>,
    pub result: ReviewResult,
    pub salary_offered: Option<f64>,
    pub would_recommend: bool,
    pub is_anonymous: bool,
}

/// A review as served to a particular caller. Anonymous reviews lose their
/// author unless the caller wrote the review or is an admin.
#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub author: Option<UserSummary>,
}

impl ReviewView {
    pub fn project(review: Review, author: Option<UserSummary>, viewer: Option<&Identity>) -> Self {
        if review.is_anonymous && !is_privileged(viewer, review.user_id) {
            return ReviewView { review, owner_id: None, author: None };
        }
        ReviewView {
            owner_id: Some(review.user_id),
            author: author.map(UserSummary::without_email),
            review,
        }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewRequest {
    pub company_id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Job role must be between 2 and 100 characters"))]
    pub job_role: String,

    #[serde(default, deserialize_with = "optional_datetime")]
    pub interview_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1.0, max = 5.0, message = "Overall rating must be between 1 and 5"))]
    pub overall_rating: f64,

    pub interview_difficulty: Difficulty,

    pub interview_experience: ReviewExperience,

    #[validate(length(min = 10, max = 100, message = "Title must be between 10 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: String,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub pros: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub cons: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub technical_questions: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub hr_questions: Vec<String>,

    #[validate(range(min = 1, max = 10, message = "Interview rounds must be between 1 and 10"))]
    pub interview_rounds: Option<i32>,

    #[validate(length(max = 1000, message = "Tips cannot exceed 1000 characters"))]
    pub tips: Option<String>,

    pub result: Option<ReviewResult>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_offered: Option<f64>,

    pub would_recommend: Option<bool>,

    #[serde(default)]
    pub is_anonymous: bool,
}

impl NewReviewRequest {
    pub fn into_insert(self, user_id: Uuid) -> ReviewInsert {
        ReviewInsert {
            user_id,
            company_id: self.company_id,
            job_role: self.job_role.trim().to_string(),
            interview_date: self.interview_date,
            overall_rating: round_rating(self.overall_rating),
            interview_difficulty: self.interview_difficulty,
            interview_experience: self.interview_experience,
            title: self.title.trim().to_string(),
            description: self.description,
            pros: self.pros,
            cons: self.cons,
            technical_questions: self.technical_questions,
            hr_questions: self.hr_questions,
            interview_rounds: self.interview_rounds,
            tips: self.tips,
            result: self.result.unwrap_or_default(),
            salary_offered: self.salary_offered,
            would_recommend: self.would_recommend.unwrap_or(true),
            is_anonymous: self.is_anonymous,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(length(min = 2, max = 100, message = "Job role must be between 2 and 100 characters"))]
    pub job_role: Option<String>,

    #[serde(deserialize_with = "optional_datetime")]
    pub interview_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1.0, max = 5.0, message = "Overall rating must be between 1 and 5"))]
    pub overall_rating: Option<f64>,

    pub interview_difficulty: Option<Difficulty>,

    pub interview_experience: Option<ReviewExperience>,

    #[validate(length(min = 10, max = 100, message = "Title must be between 10 and 100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub pros: OptionField<Vec<String>>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub cons: OptionField<Vec<String>>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub technical_questions: OptionField<Vec<String>>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub hr_questions: OptionField<Vec<String>>,

    #[validate(range(min = 1, max = 10, message = "Interview rounds must be between 1 and 10"))]
    pub interview_rounds: Option<i32>,

    #[validate(length(max = 1000, message = "Tips cannot exceed 1000 characters"))]
    pub tips: PatchString,

    pub result: Option<ReviewResult>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_offered: Option<f64>,

    pub would_recommend: Option<bool>,

    pub is_anonymous: Option<bool>,
}

impl UpdateReviewRequest {
    pub fn normalized(mut self) -> Self {
        self.overall_rating = self.overall_rating.map(round_rating);
        self
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReviewSortField {
    #[default]
    CreatedAt,
    OverallRating,
    HelpfulVotes,
}

impl ReviewSortField {
    pub fn column(&self) -> &'static str {
        match self {
            ReviewSortField::CreatedAt => "created_at",
            ReviewSortField::OverallRating => "overall_rating",
            ReviewSortField::HelpfulVotes => "helpful_votes",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub sort_by: Option<ReviewSortField>,
    pub sort_order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;

    fn review(owner: Uuid, anonymous: bool) -> Review {
        Review {
            id: Uuid::new_v4(),
            user_id: owner,
            company_id: Uuid::new_v4(),
            job_role: "SDE".into(),
            interview_date: None,
            overall_rating: 4.0,
            interview_difficulty: Difficulty::Medium,
            interview_experience: ReviewExperience::Positive,
            title: "A fair interview".into(),
            description: "d".repeat(60),
            pros: vec![],
            cons: vec![],
            technical_questions: vec![],
            hr_questions: vec![],
            interview_rounds: None,
            tips: None,
            result: ReviewResult::Pending,
            salary_offered: None,
            would_recommend: true,
            is_anonymous: anonymous,
            is_verified: false,
            helpful_votes: 0,
            report_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn author(id: Uuid) -> UserSummary {
        UserSummary {
            id,
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            university: None,
            email: Some("asha@example.com".into()),
        }
    }

    #[test]
    fn rating_is_rounded_to_one_decimal() {
        assert_eq!(round_rating(4.26), 4.3);
        assert_eq!(round_rating(3.04), 3.0);
    }

    #[test]
    fn anonymous_author_hidden_from_strangers() {
        let owner = Uuid::new_v4();
        let stranger = Identity::new(Uuid::new_v4(), UserRole::Student);

        let view = ReviewView::project(review(owner, true), Some(author(owner)), Some(&stranger));
        assert!(view.author.is_none());

        let view = ReviewView::project(review(owner, true), Some(author(owner)), None);
        assert!(view.author.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("userId").is_none());
        assert!(!json.to_string().contains(&owner.to_string()));
    }

    #[test]
    fn owner_and_admin_see_the_author_without_email() {
        let owner = Uuid::new_v4();
        let me = Identity::new(owner, UserRole::Student);
        let admin = Identity::new(Uuid::new_v4(), UserRole::Admin);

        for viewer in [&me, &admin] {
            let view = ReviewView::project(review(owner, true), Some(author(owner)), Some(viewer));
            let shown = view.author.unwrap();
            assert_eq!(shown.id, owner);
            assert!(shown.email.is_none());
        }
    }

    #[test]
    fn sort_fields_use_camel_case() {
        let field: ReviewSortField = serde_json::from_str("\"helpfulVotes\"").unwrap();
        assert_eq!(field.column(), "helpful_votes");
        assert!(serde_json::from_str::<ReviewSortField>("\"password\"").is_err());
    }
}
