use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::policy::{is_privileged, Identity};
use crate::entities::{
    common::Difficulty,
    company::CompanyBrief,
    option_fields::{datetime, list, optional_datetime, PatchString},
    round::{
        NewAptitudeRound, NewDsaRound, NewHrRound, NewTechRound, RoundDetail, RoundInsert, RoundStatus,
        RoundWithDetails,
    },
    user::UserSummary,
};

// ───── Enums ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "experience_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExperienceStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "placement_result", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlacementResult {
    Selected,
    Rejected,
    #[default]
    Ongoing,
    OfferDeclined,
}

/// Kind of a nested round in a submitted experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundKind {
    Aptitude,
    Technical,
    Dsa,
    Hr,
}

impl RoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundKind::Aptitude => "aptitude",
            RoundKind::Technical => "technical",
            RoundKind::Dsa => "dsa",
            RoundKind::Hr => "hr",
        }
    }
}

/// The only statuses an admin may move a pending experience to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approved,
    Rejected,
}

impl From<ModerationDecision> for ExperienceStatus {
    fn from(decision: ModerationDecision) -> Self {
        match decision {
            ModerationDecision::Approved => ExperienceStatus::Approved,
            ModerationDecision::Rejected => ExperienceStatus::Rejected,
        }
    }
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlacementExperience {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub job_role: String,
    pub status: ExperienceStatus,
    pub application_date: DateTime<Utc>,
    pub placement_result: PlacementResult,
    pub salary_offered: Option<f64>,
    pub total_rounds: i32,
    pub rounds_completed: i32,
    pub round_types: Vec<String>,
    pub overall_experience: String,
    pub tips: Option<String>,
    pub overall_difficulty: Difficulty,
    pub would_recommend: bool,
    pub is_anonymous: bool,
    pub show_salary: bool,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub helpful_votes: i32,
    pub views: i32,
    pub tracking_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ExperienceInsert {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub job_role: String,
    pub application_date: DateTime<Utc>,
    pub placement_result: PlacementResult,
    pub salary_offered: Option<f64>,
    pub total_rounds: i32,
    pub rounds_completed: i32,
    pub round_types: Vec<String>,
    pub overall_experience: String,
    pub tips: Option<String>,
    pub overall_difficulty: Difficulty,
    pub would_recommend: bool,
    pub is_anonymous: bool,
    pub show_salary: bool,
    pub tracking_id: String,
}

/// A round submitted together with an experience. `round.experience_id` is
/// filled in once the experience row exists.
#[derive(Debug)]
pub struct NestedRound {
    pub round: RoundInsert,
    pub detail: Option<RoundDetail>,
}

#[derive(Debug, Serialize)]
pub struct ExperienceView {
    #[serde(flatten)]
    pub experience: PlacementExperience,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub company: Option<CompanyBrief>,
    pub student: Option<UserSummary>,
    pub rounds: Vec<RoundWithDetails>,
}

impl ExperienceView {
    pub fn new(
        experience: PlacementExperience,
        company: Option<CompanyBrief>,
        student: Option<UserSummary>,
        rounds: Vec<RoundWithDetails>,
    ) -> Self {
        ExperienceView {
            owner_id: Some(experience.user_id),
            experience,
            company,
            student,
            rounds,
        }
    }

    /// Shapes the record for `viewer`. Owners and admins see everything; anyone
    /// else loses the submitter of an anonymous experience and a hidden salary.
    /// Emails are never part of the projected student card.
    pub fn project(mut self, viewer: Option<&Identity>) -> Self {
        self.student = self.student.map(UserSummary::without_email);
        if is_privileged(viewer, self.experience.user_id) {
            return self;
        }
        if self.experience.is_anonymous {
            self.student = None;
            self.owner_id = None;
            for round in &mut self.rounds {
                round.owner_id = None;
            }
        }
        if !self.experience.show_salary {
            self.experience.salary_offered = None;
        }
        self
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRoundInput {
    #[serde(rename = "type")]
    pub kind: RoundKind,

    #[validate(length(min = 1, max = 100, message = "Job role cannot be empty or exceed 100 characters"))]
    pub job_role: Option<String>,

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

    #[validate(nested)]
    pub aptitude_details: Option<NewAptitudeRound>,

    #[validate(nested)]
    pub tech_details: Option<NewTechRound>,

    #[validate(nested)]
    pub dsa_details: Option<NewDsaRound>,

    #[validate(nested)]
    pub hr_details: Option<NewHrRound>,
}

impl ExperienceRoundInput {
    /// The detail block matching the round's kind; other blocks are ignored.
    fn into_detail(self) -> Option<RoundDetail> {
        match self.kind {
            RoundKind::Aptitude => self.aptitude_details.map(RoundDetail::Aptitude),
            RoundKind::Technical => self.tech_details.map(RoundDetail::Tech),
            RoundKind::Dsa => self.dsa_details.map(RoundDetail::Dsa),
            RoundKind::Hr => self.hr_details.map(RoundDetail::Hr),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExperienceRequest {
    pub company_id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Job role must be between 2 and 100 characters"))]
    pub job_role: String,

    #[serde(deserialize_with = "datetime")]
    pub application_date: DateTime<Utc>,

    pub placement_result: Option<PlacementResult>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_offered: Option<f64>,

    #[validate(range(min = 1, max = 10, message = "Total rounds must be between 1 and 10"))]
    pub total_rounds: i32,

    pub round_types: Option<Vec<RoundKind>>,

    #[validate(length(min = 10, max = 2000, message = "Overall experience must be between 10 and 2000 characters"))]
    pub overall_experience: String,

    #[validate(length(max = 2000, message = "Tips cannot exceed 2000 characters"))]
    pub tips: Option<String>,

    pub overall_difficulty: Difficulty,

    pub would_recommend: Option<bool>,

    #[serde(default)]
    pub is_anonymous: bool,

    #[serde(default)]
    pub show_salary: bool,

    #[serde(default, deserialize_with = "list")]
    #[validate(length(max = 10, message = "At most 10 rounds can be submitted"))]
    #[validate(nested)]
    pub rounds: Vec<ExperienceRoundInput>,
}

impl NewExperienceRequest {
    pub fn into_insert(self, user_id: Uuid, tracking_id: String) -> (ExperienceInsert, Vec<NestedRound>) {
        let round_types = match self.round_types {
            Some(kinds) => kinds.iter().map(|k| k.as_str().to_string()).collect(),
            None => {
                let mut kinds: Vec<String> = Vec::new();
                for round in &self.rounds {
                    let kind = round.kind.as_str();
                    if !kinds.iter().any(|k| k == kind) {
                        kinds.push(kind.to_string());
                    }
                }
                kinds
            }
        };

        let job_role = self.job_role.trim().to_string();
        let rounds: Vec<NestedRound> = self
            .rounds
            .into_iter()
            .map(|input| NestedRound {
                round: RoundInsert {
                    company_id: self.company_id,
                    user_id,
                    job_id: None,
                    experience_id: None,
                    job_role: input
                        .job_role
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or(&job_role)
                        .to_string(),
                    application_date: input.application_date.or(Some(self.application_date)),
                    status: input.status.unwrap_or_default(),
                    current_round: input.current_round.unwrap_or(0),
                    total_rounds: input.total_rounds.unwrap_or(1),
                    package: input.package,
                    notes: input.notes.clone(),
                },
                detail: input.into_detail(),
            })
            .collect();

        let experience = ExperienceInsert {
            user_id,
            company_id: self.company_id,
            job_role,
            application_date: self.application_date,
            placement_result: self.placement_result.unwrap_or_default(),
            salary_offered: self.salary_offered,
            total_rounds: self.total_rounds,
            rounds_completed: rounds.len() as i32,
            round_types,
            overall_experience: self.overall_experience,
            tips: self.tips,
            overall_difficulty: self.overall_difficulty,
            would_recommend: self.would_recommend.unwrap_or(true),
            is_anonymous: self.is_anonymous,
            show_salary: self.show_salary,
            tracking_id,
        };

        (experience, rounds)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateExperienceRequest {
    #[validate(length(min = 2, max = 100, message = "Job role must be between 2 and 100 characters"))]
    pub job_role: Option<String>,

    #[serde(deserialize_with = "optional_datetime")]
    pub application_date: Option<DateTime<Utc>>,

    pub placement_result: Option<PlacementResult>,

    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_offered: Option<f64>,

    #[validate(range(min = 1, max = 10, message = "Total rounds must be between 1 and 10"))]
    pub total_rounds: Option<i32>,

    pub round_types: Option<Vec<RoundKind>>,

    #[validate(length(min = 10, max = 2000, message = "Overall experience must be between 10 and 2000 characters"))]
    pub overall_experience: Option<String>,

    #[validate(length(max = 2000, message = "Tips cannot exceed 2000 characters"))]
    pub tips: PatchString,

    pub overall_difficulty: Option<Difficulty>,

    pub would_recommend: Option<bool>,

    pub is_anonymous: Option<bool>,

    pub show_salary: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub status: ModerationDecision,

    #[validate(length(max = 1000, message = "Admin notes cannot exceed 1000 characters"))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub company_id: Option<Uuid>,
    pub job_role: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub placement_result: Option<PlacementResult>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyExperienceQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<ExperienceStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        round::{Round, RoundDetailSet},
        user::UserRole,
    };

    fn experience(owner: Uuid, anonymous: bool, show_salary: bool) -> ExperienceView {
        ExperienceView::new(
            PlacementExperience {
                id: Uuid::new_v4(),
                user_id: owner,
                company_id: Uuid::new_v4(),
                job_role: "SDE".into(),
                status: ExperienceStatus::Approved,
                application_date: Utc::now(),
                placement_result: PlacementResult::Selected,
                salary_offered: Some(12.5),
                total_rounds: 3,
                rounds_completed: 3,
                round_types: vec!["dsa".into()],
                overall_experience: "Smooth process overall".into(),
                tips: None,
                overall_difficulty: Difficulty::Medium,
                would_recommend: true,
                is_anonymous: anonymous,
                show_salary,
                admin_notes: None,
                reviewed_by: None,
                reviewed_at: None,
                helpful_votes: 0,
                views: 0,
                tracking_id: "EXP-1-ABCDEFGHI".into(),
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            None,
            Some(UserSummary {
                id: owner,
                first_name: "Ravi".into(),
                last_name: "K".into(),
                university: None,
                email: Some("ravi@example.com".into()),
            }),
            RoundDetailSet::default().attach(vec![round_of(owner)]),
        )
    }

    fn round_of(owner: Uuid) -> Round {
        Round {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            user_id: owner,
            job_id: None,
            experience_id: None,
            job_role: "SDE".into(),
            application_date: Utc::now(),
            status: RoundStatus::Selected,
            current_round: 1,
            total_rounds: 1,
            package: None,
            notes: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn strangers_lose_anonymous_student_and_hidden_salary() {
        let owner = Uuid::new_v4();
        let stranger = Identity::new(Uuid::new_v4(), UserRole::Student);

        let view = experience(owner, true, false).project(Some(&stranger));
        assert!(view.student.is_none());
        assert!(view.experience.salary_offered.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["student"].is_null());
        assert!(json["salaryOffered"].is_null());
    }

    #[test]
    fn anonymous_submitter_id_never_leaks_into_json() {
        let owner = Uuid::new_v4();
        let view = experience(owner, true, true).project(None);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("userId").is_none());
        assert_eq!(json["rounds"].as_array().unwrap().len(), 1);
        assert!(json["rounds"][0].get("userId").is_none());
        assert!(!json.to_string().contains(&owner.to_string()));
    }

    #[test]
    fn named_submitter_keeps_owner_id() {
        let owner = Uuid::new_v4();
        let json = serde_json::to_value(experience(owner, false, true).project(None)).unwrap();
        assert_eq!(json["userId"], owner.to_string());
        assert_eq!(json["rounds"][0]["userId"], owner.to_string());
    }

    #[test]
    fn owner_sees_real_data() {
        let owner = Uuid::new_v4();
        let me = Identity::new(owner, UserRole::Student);

        let view = experience(owner, true, false).project(Some(&me));
        assert_eq!(view.student.as_ref().map(|s| s.id), Some(owner));
        assert_eq!(view.experience.salary_offered, Some(12.5));
        assert!(view.student.unwrap().email.is_none());
    }

    #[test]
    fn public_fields_stay_when_not_hidden() {
        let view = experience(Uuid::new_v4(), false, true).project(None);
        assert!(view.student.is_some());
        assert_eq!(view.experience.salary_offered, Some(12.5));
    }

    #[test]
    fn nested_rounds_keep_matching_details_only() {
        let request: NewExperienceRequest = serde_json::from_value(serde_json::json!({
            "companyId": Uuid::nil(),
            "jobRole": "Backend Intern",
            "applicationDate": "2024-01-15",
            "totalRounds": 2,
            "overallExperience": "Two rounds, both fair.",
            "overallDifficulty": "easy",
            "rounds": [
                { "type": "dsa", "dsaDetails": { "date": "2024-01-20" }, "hrDetails": { "date": "2024-01-21" } },
                { "type": "hr" },
                { "type": "dsa" }
            ]
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let owner = Uuid::new_v4();
        let (experience, rounds) = request.into_insert(owner, "EXP-1-AAAAAAAAA".into());
        assert_eq!(experience.rounds_completed, 3);
        assert_eq!(experience.round_types, vec!["dsa".to_string(), "hr".to_string()]);
        assert_eq!(experience.placement_result, PlacementResult::Ongoing);
        assert!(matches!(rounds[0].detail, Some(RoundDetail::Dsa(_))));
        assert!(rounds[1].detail.is_none());
        assert_eq!(rounds[1].round.job_role, "Backend Intern");
        assert_eq!(rounds[1].round.user_id, owner);
    }

    #[test]
    fn nested_detail_errors_are_reported() {
        let request: NewExperienceRequest = serde_json::from_value(serde_json::json!({
            "companyId": Uuid::nil(),
            "jobRole": "Backend Intern",
            "applicationDate": "2024-01-15",
            "totalRounds": 1,
            "overallExperience": "One long aptitude test.",
            "overallDifficulty": "hard",
            "rounds": [
                { "type": "aptitude", "aptitudeDetails": { "date": "2024-01-20", "duration": 900 } }
            ]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn moderation_only_accepts_final_states() {
        assert!(serde_json::from_str::<ModerationRequest>(r#"{"status": "pending"}"#).is_err());
        let request: ModerationRequest = serde_json::from_str(r#"{"status": "approved"}"#).unwrap();
        assert_eq!(ExperienceStatus::from(request.status), ExperienceStatus::Approved);
    }
}
