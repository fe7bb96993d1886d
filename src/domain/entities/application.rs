use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    company::CompanyBrief,
    job::JobBrief,
    option_fields::{optional_datetime, PatchString},
};

/// Hiring pipeline for an application.
///
/// Transitions only move forward: intermediate stages may be skipped, `rejected`
/// is reachable from any stage before an offer, and `offer_accepted` /
/// `offer_declined` only follow `offer_received`. `rejected`, `offer_accepted`
/// and `offer_declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Rejected,
    Selected,
    OfferReceived,
    OfferAccepted,
    OfferDeclined,
}

impl ApplicationStatus {
    fn stage(&self) -> u8 {
        match self {
            ApplicationStatus::Applied => 0,
            ApplicationStatus::UnderReview => 1,
            ApplicationStatus::Shortlisted => 2,
            ApplicationStatus::InterviewScheduled => 3,
            ApplicationStatus::Selected => 4,
            ApplicationStatus::OfferReceived => 5,
            ApplicationStatus::OfferAccepted
            | ApplicationStatus::OfferDeclined
            | ApplicationStatus::Rejected => 6,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::OfferAccepted | ApplicationStatus::OfferDeclined
        )
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        match next {
            ApplicationStatus::Rejected => self.stage() < ApplicationStatus::OfferReceived.stage(),
            ApplicationStatus::OfferAccepted | ApplicationStatus::OfferDeclined => {
                *self == ApplicationStatus::OfferReceived
            }
            _ => next.stage() > self.stage(),
        }
    }
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub resume_version: Option<String>,
    pub cover_letter: Option<String>,
    pub expected_salary: Option<f64>,
    pub availability_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tracking_id: String,
    pub last_updated: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ApplicationInsert {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub resume_version: Option<String>,
    pub cover_letter: Option<String>,
    pub expected_salary: Option<f64>,
    pub availability_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tracking_id: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobBrief>,
    pub company: Option<CompanyBrief>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicationRequest {
    pub job_id: Uuid,

    #[validate(length(max = 5000, message = "Cover letter cannot exceed 5000 characters"))]
    pub cover_letter: Option<String>,

    #[validate(range(min = 0.0, message = "Expected salary cannot be negative"))]
    pub expected_salary: Option<f64>,

    #[serde(default, deserialize_with = "optional_datetime")]
    pub availability_date: Option<DateTime<Utc>>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,

    #[validate(length(max = 500, message = "Resume version cannot exceed 500 characters"))]
    pub resume_version: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    #[validate(length(max = 5000, message = "Cover letter cannot exceed 5000 characters"))]
    pub cover_letter: PatchString,

    #[validate(range(min = 0.0, message = "Expected salary cannot be negative"))]
    pub expected_salary: Option<f64>,

    #[serde(deserialize_with = "optional_datetime")]
    pub availability_date: Option<DateTime<Utc>>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: PatchString,

    #[validate(length(max = 500, message = "Resume version cannot exceed 500 characters"))]
    pub resume_version: PatchString,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
    pub job_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;

    #[test]
    fn pipeline_moves_forward_only() {
        assert!(Applied.can_transition_to(UnderReview));
        assert!(Applied.can_transition_to(Shortlisted));
        assert!(InterviewScheduled.can_transition_to(Selected));
        assert!(Selected.can_transition_to(OfferReceived));
        assert!(!Shortlisted.can_transition_to(Applied));
        assert!(!Applied.can_transition_to(Applied));
    }

    #[test]
    fn offers_resolve_only_from_offer_received() {
        assert!(OfferReceived.can_transition_to(OfferAccepted));
        assert!(OfferReceived.can_transition_to(OfferDeclined));
        assert!(!Selected.can_transition_to(OfferAccepted));
    }

    #[test]
    fn rejection_is_available_until_an_offer() {
        assert!(Applied.can_transition_to(Rejected));
        assert!(Selected.can_transition_to(Rejected));
        assert!(!OfferReceived.can_transition_to(Rejected));
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [Rejected, OfferAccepted, OfferDeclined] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(UnderReview));
        }
    }

    #[test]
    fn statuses_use_snake_case_on_the_wire() {
        let status: super::ApplicationStatus = serde_json::from_str("\"interview_scheduled\"").unwrap();
        assert_eq!(status, InterviewScheduled);
    }
}
