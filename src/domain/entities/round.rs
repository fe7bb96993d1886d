use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::{
    common::Difficulty,
    company::CompanyBrief,
    option_fields::{datetime, list, new_validation_error, optional_datetime, validate_text_list, PatchString},
};

pub const DEFAULT_PROGRAMMING_LANGUAGE: &str = "javascript";

// ───── Enums ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "round_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    Applied,
    Shortlisted,
    Rejected,
    Selected,
    OfferReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "round_result", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Passed,
    Failed,
    #[default]
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_mode", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum InterviewMode {
    Video,
    InPerson,
    Phone,
    CodingTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "performance_rating", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PerformanceRating {
    Excellent,
    Good,
    #[default]
    Average,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "negotiation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NegotiationStatus {
    Accepted,
    Negotiated,
    Rejected,
    #[default]
    Pending,
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: Uuid,
    pub company_id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    pub experience_id: Option<Uuid>,
    pub job_role: String,
    pub application_date: DateTime<Utc>,
    pub status: RoundStatus,
    pub current_round: i32,
    pub total_rounds: i32,
    pub package: Option<f64>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AptitudeRound {
    pub id: Uuid,
    pub round_id: Uuid,
    pub round_number: i32,
    pub date: DateTime<Utc>,
    pub duration: Option<i32>,
    pub total_questions: Option<i32>,
    pub attempted_questions: Option<i32>,
    pub correct_answers: Option<i32>,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub platform: Option<String>,
    pub result: RoundResult,
    pub score: Option<f64>,
    pub cutoff_score: Option<f64>,
    pub feedback: Option<String>,
    pub tips: Option<String>,
    pub is_negative_marking: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TechRound {
    pub id: Uuid,
    pub round_id: Uuid,
    pub round_number: i32,
    pub date: DateTime<Utc>,
    pub duration: Option<i32>,
    pub interview_type: InterviewMode,
    pub interviewer_name: Option<String>,
    pub interviewer_position: Option<String>,
    pub topics: Vec<String>,
    pub technical_skills: Vec<String>,
    pub questions_asked: Vec<String>,
    pub difficulty: Difficulty,
    pub result: RoundResult,
    pub performance: PerformanceRating,
    pub feedback: Option<String>,
    pub tips: Option<String>,
    pub code_submitted: Option<String>,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DsaRound {
    pub id: Uuid,
    pub round_id: Uuid,
    pub round_number: i32,
    pub date: DateTime<Utc>,
    pub duration: Option<i32>,
    pub interview_type: InterviewMode,
    pub platform: Option<String>,
    pub total_problems: Option<i32>,
    pub solved_problems: Option<i32>,
    pub problems: Vec<String>,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub programming_language: String,
    pub result: RoundResult,
    pub score: Option<f64>,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
    pub code_submitted: Option<String>,
    pub feedback: Option<String>,
    pub tips: Option<String>,
    pub interviewer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HrRound {
    pub id: Uuid,
    pub round_id: Uuid,
    pub round_number: i32,
    pub date: DateTime<Utc>,
    pub duration: Option<i32>,
    pub interview_type: InterviewMode,
    pub interviewer_name: Option<String>,
    pub interviewer_position: Option<String>,
    pub questions_asked: Vec<String>,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub result: RoundResult,
    pub performance: PerformanceRating,
    pub feedback: Option<String>,
    pub tips: Option<String>,
    pub company_values: Option<String>,
    pub cultural_fit: PerformanceRating,
    pub communication: PerformanceRating,
    pub salary_discussed: bool,
    pub salary_expectation: Option<f64>,
    pub negotiation_status: NegotiationStatus,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RoundInsert {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    pub experience_id: Option<Uuid>,
    pub job_role: String,
    pub application_date: Option<DateTime<Utc>>,
    pub status: RoundStatus,
    pub current_round: i32,
    pub total_rounds: i32,
    pub package: Option<f64>,
    pub notes: Option<String>,
}

/// A typed detail row to be written for a round.
#[derive(Debug, Clone)]
pub enum RoundDetail {
    Aptitude(NewAptitudeRound),
    Tech(NewTechRound),
    Dsa(NewDsaRound),
    Hr(NewHrRound),
}

// ───── API Response Models ──────────────────────────────────────────

/// Detail rows for a batch of rounds, as loaded in one pass per table.
#[derive(Debug, Default)]
pub struct RoundDetailSet {
    pub aptitude: Vec<AptitudeRound>,
    pub tech: Vec<TechRound>,
    pub dsa: Vec<DsaRound>,
    pub hr: Vec<HrRound>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundWithDetails {
    #[serde(flatten)]
    pub round: Round,
    /// Exposed owner; cleared when the round belongs to an anonymous experience.
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyBrief>,
    pub aptitude_rounds: Vec<AptitudeRound>,
    pub tech_rounds: Vec<TechRound>,
    pub dsa_rounds: Vec<DsaRound>,
    pub hr_rounds: Vec<HrRound>,
}

impl RoundWithDetails {
    fn bare(round: Round) -> Self {
        RoundWithDetails {
            owner_id: Some(round.user_id),
            round,
            company: None,
            aptitude_rounds: Vec::new(),
            tech_rounds: Vec::new(),
            dsa_rounds: Vec::new(),
            hr_rounds: Vec::new(),
        }
    }
}

impl RoundDetailSet {
    /// Distributes detail rows onto their rounds, keeping the order of `rounds`.
    pub fn attach(self, rounds: Vec<Round>) -> Vec<RoundWithDetails> {
        let mut by_id: HashMap<Uuid, usize> = HashMap::with_capacity(rounds.len());
        let mut out: Vec<RoundWithDetails> = Vec::with_capacity(rounds.len());
        for round in rounds {
            by_id.insert(round.id, out.len());
            out.push(RoundWithDetails::bare(round));
        }

        for row in self.aptitude {
            if let Some(&i) = by_id.get(&row.round_id) {
                out[i].aptitude_rounds.push(row);
            }
        }
        for row in self.tech {
            if let Some(&i) = by_id.get(&row.round_id) {
                out[i].tech_rounds.push(row);
            }
        }
        for row in self.dsa {
            if let Some(&i) = by_id.get(&row.round_id) {
                out[i].dsa_rounds.push(row);
            }
        }
        for row in self.hr {
            if let Some(&i) = by_id.get(&row.round_id) {
                out[i].hr_rounds.push(row);
            }
        }
        out
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRoundRequest {
    pub company_id: Uuid,

    pub job_id: Option<Uuid>,

    pub experience_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Job role is required and cannot exceed 100 characters"))]
    pub job_role: String,

    #[serde(default, deserialize_with = "optional_datetime")]
    pub application_date: Option<DateTime<Utc>>,

    pub status: Option<RoundStatus>,

    #[validate(range(min = 0, message = "Current round cannot be negative"))]
    pub current_round: Option<i32>,

    #[validate(range(min = 1, message = "Total rounds must be at least 1"))]
    pub total_rounds: Option<i32>,

    #[validate(range(min = 0.0, message = "Package cannot be negative"))]
    pub package: Option<f64>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl NewRoundRequest {
    pub fn into_insert(self, user_id: Uuid) -> RoundInsert {
        RoundInsert {
            company_id: self.company_id,
            user_id,
            job_id: self.job_id,
            experience_id: self.experience_id,
            job_role: self.job_role.trim().to_string(),
            application_date: self.application_date,
            status: self.status.unwrap_or_default(),
            current_round: self.current_round.unwrap_or(0),
            total_rounds: self.total_rounds.unwrap_or(1),
            package: self.package,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRoundRequest {
    #[validate(length(min = 1, max = 100, message = "Job role cannot be empty or exceed 100 characters"))]
    pub job_role: Option<String>,

    #[serde(deserialize_with = "optional_datetime")]
    pub application_date: Option<DateTime<Utc>>,

    pub status: Option<RoundStatus>,

    #[validate(range(min = 0, message = "Current round cannot be negative"))]
    pub current_round: Option<i32>,

    #[validate(range(min = 1, message = "Total rounds must be at least 1"))]
    pub total_rounds: Option<i32>,

    #[validate(range(min = 0.0, message = "Package cannot be negative"))]
    pub package: Option<f64>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: PatchString,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_aptitude_counts"))]
pub struct NewAptitudeRound {
    #[validate(range(min = 1, message = "Round number must be at least 1"))]
    pub round_number: Option<i32>,

    #[serde(deserialize_with = "datetime")]
    pub date: DateTime<Utc>,

    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration: Option<i32>,

    #[validate(range(min = 0, message = "Question counts cannot be negative"))]
    pub total_questions: Option<i32>,

    #[validate(range(min = 0, message = "Question counts cannot be negative"))]
    pub attempted_questions: Option<i32>,

    #[validate(range(min = 0, message = "Question counts cannot be negative"))]
    pub correct_answers: Option<i32>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub topics: Vec<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(length(max = 100))]
    pub platform: Option<String>,

    pub result: Option<RoundResult>,

    #[validate(range(min = 0.0, message = "Score cannot be negative"))]
    pub score: Option<f64>,

    #[validate(range(min = 0.0, message = "Cutoff score cannot be negative"))]
    pub cutoff_score: Option<f64>,

    #[validate(length(max = 2000))]
    pub feedback: Option<String>,

    #[validate(length(max = 2000))]
    pub tips: Option<String>,

    #[serde(default)]
    pub is_negative_marking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTechRound {
    #[validate(range(min = 1, message = "Round number must be at least 1"))]
    pub round_number: Option<i32>,

    #[serde(deserialize_with = "datetime")]
    pub date: DateTime<Utc>,

    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration: Option<i32>,

    pub interview_type: Option<InterviewMode>,

    #[validate(length(max = 100))]
    pub interviewer_name: Option<String>,

    #[validate(length(max = 100))]
    pub interviewer_position: Option<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub topics: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub technical_skills: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub questions_asked: Vec<String>,

    pub difficulty: Option<Difficulty>,

    pub result: Option<RoundResult>,

    pub performance: Option<PerformanceRating>,

    #[validate(length(max = 2000))]
    pub feedback: Option<String>,

    #[validate(length(max = 2000))]
    pub tips: Option<String>,

    #[validate(length(max = 20000))]
    pub code_submitted: Option<String>,

    #[validate(length(max = 100))]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_dsa_counts"))]
pub struct NewDsaRound {
    #[validate(range(min = 1, message = "Round number must be at least 1"))]
    pub round_number: Option<i32>,

    #[serde(deserialize_with = "datetime")]
    pub date: DateTime<Utc>,

    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration: Option<i32>,

    pub interview_type: Option<InterviewMode>,

    #[validate(length(max = 100))]
    pub platform: Option<String>,

    #[validate(range(min = 0, message = "Problem counts cannot be negative"))]
    pub total_problems: Option<i32>,

    #[validate(range(min = 0, message = "Problem counts cannot be negative"))]
    pub solved_problems: Option<i32>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub problems: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub topics: Vec<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(length(min = 1, max = 50, message = "Programming language must be between 1 and 50 characters"))]
    pub programming_language: Option<String>,

    pub result: Option<RoundResult>,

    #[validate(range(min = 0.0, message = "Score cannot be negative"))]
    pub score: Option<f64>,

    #[validate(length(max = 100))]
    pub time_complexity: Option<String>,

    #[validate(length(max = 100))]
    pub space_complexity: Option<String>,

    #[validate(length(max = 20000))]
    pub code_submitted: Option<String>,

    #[validate(length(max = 2000))]
    pub feedback: Option<String>,

    #[validate(length(max = 2000))]
    pub tips: Option<String>,

    #[validate(length(max = 100))]
    pub interviewer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewHrRound {
    #[validate(range(min = 1, message = "Round number must be at least 1"))]
    pub round_number: Option<i32>,

    #[serde(deserialize_with = "datetime")]
    pub date: DateTime<Utc>,

    #[validate(range(min = 1, max = 240, message = "Duration must be between 1 and 240 minutes"))]
    pub duration: Option<i32>,

    #[validate(custom(function = "validate_hr_mode"))]
    pub interview_type: Option<InterviewMode>,

    #[validate(length(max = 100))]
    pub interviewer_name: Option<String>,

    #[validate(length(max = 100))]
    pub interviewer_position: Option<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub questions_asked: Vec<String>,

    #[serde(default, deserialize_with = "list")]
    #[validate(custom(function = "validate_text_list"))]
    pub topics: Vec<String>,

    pub difficulty: Option<Difficulty>,

    pub result: Option<RoundResult>,

    pub performance: Option<PerformanceRating>,

    #[validate(length(max = 2000))]
    pub feedback: Option<String>,

    #[validate(length(max = 2000))]
    pub tips: Option<String>,

    #[validate(length(max = 2000))]
    pub company_values: Option<String>,

    pub cultural_fit: Option<PerformanceRating>,

    pub communication: Option<PerformanceRating>,

    #[serde(default)]
    pub salary_discussed: bool,

    #[validate(range(min = 0.0, message = "Salary expectation cannot be negative"))]
    pub salary_expectation: Option<f64>,

    pub negotiation_status: Option<NegotiationStatus>,

    #[validate(length(max = 100))]
    pub platform: Option<String>,
}

fn validate_aptitude_counts(round: &NewAptitudeRound) -> Result<(), ValidationError> {
    let total = round.total_questions.unwrap_or(i32::MAX);
    let attempted = round.attempted_questions.unwrap_or(0);
    let correct = round.correct_answers.unwrap_or(0);
    if attempted > total {
        return Err(new_validation_error(
            "question_counts",
            "Attempted questions cannot exceed total questions",
        ));
    }
    if round.attempted_questions.is_some() && correct > attempted {
        return Err(new_validation_error(
            "question_counts",
            "Correct answers cannot exceed attempted questions",
        ));
    }
    if correct > total {
        return Err(new_validation_error(
            "question_counts",
            "Correct answers cannot exceed total questions",
        ));
    }
    Ok(())
}

fn validate_dsa_counts(round: &NewDsaRound) -> Result<(), ValidationError> {
    match (round.total_problems, round.solved_problems) {
        (Some(total), Some(solved)) if solved > total => Err(new_validation_error(
            "problem_counts",
            "Solved problems cannot exceed total problems",
        )),
        _ => Ok(()),
    }
}

fn validate_hr_mode(mode: &InterviewMode) -> Result<(), ValidationError> {
    if *mode == InterviewMode::CodingTest {
        return Err(new_validation_error(
            "interview_type",
            "HR interviews must be video, in-person or phone",
        ));
    }
    Ok(())
}
