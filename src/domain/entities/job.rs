use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::{
    company::CompanyBrief,
    option_fields::{list, new_validation_error, optional_datetime, validate_text_list, validate_text_list_patch, OptionField, PatchString},
};

const MIN_GRADUATION_YEAR: i32 = 2000;
const MAX_GRADUATION_YEAR: i32 = 2100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "job_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "work_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    #[default]
    Onsite,
    Remote,
    Hybrid,
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub skills_required: Vec<String>,
    pub location: String,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    pub experience: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub total_applications: i32,
    pub cgpa_requirement: Option<f64>,
    pub eligible_branches: Vec<String>,
    pub eligible_graduation_years: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobBrief {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub job_type: JobType,
    pub work_mode: WorkMode,
}

#[derive(Debug, Serialize)]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: Job,
    pub company: Option<CompanyBrief>,
}

#[derive(Debug)]
pub struct JobInsert {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub skills_required: Vec<String>,
    pub location: String,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    pub experience: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub cgpa_requirement: Option<f64>,
    pub eligible_branches: Vec<String>,
    pub eligible_graduation_years: Vec<i32>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_job_salary"))]
pub struct NewJobRequest {
    pub company_id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Job title must be between 2 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Job description is required"))]
    pub description: String,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub requirements: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub responsibilities: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub skills_required: Vec<String>,

    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,

    pub job_type: Option<JobType>,

    pub work_mode: Option<WorkMode>,

    #[validate(length(max = 100, message = "Experience cannot exceed 100 characters"))]
    pub experience: Option<String>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_min: Option<f64>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_max: Option<f64>,

    #[serde(default, deserialize_with = "optional_datetime")]
    pub application_deadline: Option<DateTime<Utc>>,

    #[validate(range(min = 0.0, max = 10.0, message = "CGPA requirement must be between 0 and 10"))]
    pub cgpa_requirement: Option<f64>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub eligible_branches: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_graduation_years"))]
    pub eligible_graduation_years: Vec<i32>,
}

impl From<NewJobRequest> for JobInsert {
    fn from(request: NewJobRequest) -> Self {
        JobInsert {
            company_id: request.company_id,
            title: request.title.trim().to_string(),
            description: request.description,
            requirements: request.requirements,
            responsibilities: request.responsibilities,
            skills_required: request.skills_required,
            location: request.location.trim().to_string(),
            job_type: request.job_type.unwrap_or_default(),
            work_mode: request.work_mode.unwrap_or_default(),
            experience: request.experience,
            salary_min: request.salary_min,
            salary_max: request.salary_max,
            application_deadline: request.application_deadline,
            cgpa_requirement: request.cgpa_requirement,
            eligible_branches: request.eligible_branches,
            eligible_graduation_years: request.eligible_graduation_years,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
#[validate(schema(function = "validate_job_patch_salary"))]
pub struct UpdateJobRequest {
    #[validate(length(min = 2, max = 100, message = "Job title must be between 2 and 100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Job description cannot be empty"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub requirements: OptionField<Vec<String>>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub responsibilities: OptionField<Vec<String>>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub skills_required: OptionField<Vec<String>>,

    #[validate(length(min = 1, max = 200, message = "Location cannot be empty"))]
    pub location: Option<String>,

    pub job_type: Option<JobType>,

    pub work_mode: Option<WorkMode>,

    #[validate(length(max = 100, message = "Experience cannot exceed 100 characters"))]
    pub experience: PatchString,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_min: Option<f64>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_max: Option<f64>,

    #[serde(deserialize_with = "optional_datetime")]
    pub application_deadline: Option<DateTime<Utc>>,

    #[validate(range(min = 0.0, max = 10.0, message = "CGPA requirement must be between 0 and 10"))]
    pub cgpa_requirement: Option<f64>,

    #[validate(custom(function = "validate_text_list_patch"))]
    pub eligible_branches: OptionField<Vec<String>>,

    #[validate(custom(function = "validate_graduation_years_patch"))]
    pub eligible_graduation_years: OptionField<Vec<i32>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub work_mode: Option<WorkMode>,
    pub company_id: Option<Uuid>,
}

fn check_salary_range(min: Option<f64>, max: Option<f64>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(new_validation_error(
            "salary_range",
            "Minimum salary cannot exceed maximum salary",
        )),
        _ => Ok(()),
    }
}

fn validate_new_job_salary(job: &NewJobRequest) -> Result<(), ValidationError> {
    check_salary_range(job.salary_min, job.salary_max)
}

fn validate_job_patch_salary(job: &UpdateJobRequest) -> Result<(), ValidationError> {
    check_salary_range(job.salary_min, job.salary_max)
}

fn validate_graduation_years(years: &[i32]) -> Result<(), ValidationError> {
    if years.iter().any(|y| !(MIN_GRADUATION_YEAR..=MAX_GRADUATION_YEAR).contains(y)) {
        return Err(new_validation_error("graduation_year", "Graduation years must be between 2000 and 2100"));
    }
    Ok(())
}

fn validate_graduation_years_patch(years: &OptionField<Vec<i32>>) -> Result<(), ValidationError> {
    match years {
        OptionField::SetToValue(years) => validate_graduation_years(years),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_json(extra: serde_json::Value) -> serde_json::Value {
        let mut base = serde_json::json!({
            "companyId": Uuid::nil(),
            "title": "Backend Engineer",
            "description": "Build services",
            "location": "Bengaluru"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        base
    }

    #[test]
    fn omitted_lists_become_empty() {
        let request: NewJobRequest = serde_json::from_value(job_json(serde_json::json!({}))).unwrap();
        assert!(request.skills_required.is_empty());
        assert!(request.eligible_graduation_years.is_empty());
        assert_eq!(JobInsert::from(request).job_type, JobType::FullTime);
    }

    #[test]
    fn lists_keep_their_order() {
        let request: NewJobRequest = serde_json::from_value(job_json(serde_json::json!({
            "skillsRequired": ["Go", "SQL"],
            "jobType": "part-time"
        })))
        .unwrap();
        assert_eq!(request.skills_required, vec!["Go".to_string(), "SQL".to_string()]);
        assert_eq!(request.job_type, Some(JobType::PartTime));
    }

    #[test]
    fn inverted_salary_range_is_rejected() {
        let request: NewJobRequest = serde_json::from_value(job_json(serde_json::json!({
            "salaryMin": 20.0,
            "salaryMax": 10.0
        })))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }
}
