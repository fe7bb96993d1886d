use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    job::Job,
    option_fields::{list, validate_text_list, validate_text_list_patch, validate_url, validate_url_patch, OptionField, PatchString},
    pagination::SortOrder,
    review::ReviewView,
};

// ───── Enums ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "company_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompanyType {
    #[default]
    Startup,
    Mnc,
    Government,
    Ngo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "company_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompanyTier {
    Tier1,
    #[default]
    Tier2,
    Tier3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employee_range")]
pub enum EmployeeRange {
    #[sqlx(rename = "1-10")]
    #[serde(rename = "1-10")]
    UpTo10,
    #[sqlx(rename = "11-50")]
    #[serde(rename = "11-50")]
    UpTo50,
    #[sqlx(rename = "51-200")]
    #[serde(rename = "51-200")]
    UpTo200,
    #[sqlx(rename = "201-500")]
    #[serde(rename = "201-500")]
    UpTo500,
    #[sqlx(rename = "501-1000")]
    #[serde(rename = "501-1000")]
    UpTo1000,
    #[sqlx(rename = "1000+")]
    #[serde(rename = "1000+")]
    Over1000,
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub headquarters: Option<String>,
    pub employee_count: Option<EmployeeRange>,
    pub logo: Option<String>,
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    pub tier: CompanyTier,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact company card embedded in jobs, applications and experiences.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBrief {
    pub id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStats {
    pub total_jobs: i64,
    pub total_applications: i64,
    pub total_reviews: i64,
    pub average_rating: f64,
    pub total_rounds: i64,
}

#[derive(Debug)]
pub struct CompanyInsert {
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub headquarters: Option<String>,
    pub employee_count: Option<EmployeeRange>,
    pub logo: Option<String>,
    pub company_type: CompanyType,
    pub tier: CompanyTier,
    pub tags: Vec<String>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
    pub reviews: Vec<ReviewView>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyRequest {
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 50, message = "Industry must be between 2 and 50 characters"))]
    pub industry: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub website: Option<String>,

    #[validate(length(max = 100, message = "Headquarters cannot exceed 100 characters"))]
    pub headquarters: Option<String>,

    pub employee_count: Option<EmployeeRange>,

    #[validate(length(max = 500, message = "Logo link cannot exceed 500 characters"))]
    pub logo: Option<String>,

    #[serde(rename = "type")]
    pub company_type: Option<CompanyType>,

    pub tier: Option<CompanyTier>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub tags: Vec<String>,
}

impl From<NewCompanyRequest> for CompanyInsert {
    fn from(request: NewCompanyRequest) -> Self {
        CompanyInsert {
            name: request.name.trim().to_string(),
            description: request.description,
            industry: request.industry.map(|s| s.trim().to_string()),
            website: request.website,
            headquarters: request.headquarters,
            employee_count: request.employee_count,
            logo: request.logo,
            company_type: request.company_type.unwrap_or_default(),
            tier: request.tier.unwrap_or_default(),
            tags: request.tags,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: PatchString,

    #[validate(length(min = 2, max = 50, message = "Industry must be between 2 and 50 characters"))]
    pub industry: PatchString,

    #[validate(custom(function = "validate_url_patch"))]
    pub website: PatchString,

    #[validate(length(max = 100, message = "Headquarters cannot exceed 100 characters"))]
    pub headquarters: PatchString,

    pub employee_count: OptionField<EmployeeRange>,

    #[validate(length(max = 500, message = "Logo link cannot exceed 500 characters"))]
    pub logo: PatchString,

    #[serde(rename = "type")]
    pub company_type: Option<CompanyType>,

    pub tier: Option<CompanyTier>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub tags: OptionField<Vec<String>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CompanySortField {
    #[default]
    Name,
    CreatedAt,
    AverageRating,
    TotalReviews,
}

impl CompanySortField {
    pub fn column(&self) -> &'static str {
        match self {
            CompanySortField::Name => "name",
            CompanySortField::CreatedAt => "created_at",
            CompanySortField::AverageRating => "average_rating",
            CompanySortField::TotalReviews => "total_reviews",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub industry: Option<String>,
    #[serde(rename = "type")]
    pub company_type: Option<CompanyType>,
    pub tier: Option<CompanyTier>,
    pub sort_by: Option<CompanySortField>,
    pub sort_order: Option<SortOrder>,
}
