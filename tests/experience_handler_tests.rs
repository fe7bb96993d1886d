mod mocks;

use fixtures::*;
use mocks::*;

use mockall::predicate::eq;
use serde_json::json;
use uuid::Uuid;

use placify_backend::{
    entities::{
        company::CompanyBrief,
        experience::{ExperienceStatus, ModerationRequest, NewExperienceRequest, PlacementExperience},
        round::RoundDetailSet,
    },
    errors::AppError,
    use_cases::experiences::ExperienceHandler,
};

type Handler = ExperienceHandler<MockExperienceRepo, MockRoundRepo, MockCompanyRepo, MockUserRepo>;

/// Collaborators that answer the joins made when assembling views.
fn handler_with(experiences: MockExperienceRepo) -> Handler {
    let mut rounds = MockRoundRepo::new();
    rounds.expect_rounds_for_experiences().returning(|_| Ok(Vec::new()));
    rounds.expect_load_details().returning(|_| Ok(RoundDetailSet::default()));

    let mut companies = MockCompanyRepo::new();
    companies.expect_company_briefs().returning(|ids| {
        Ok(ids
            .iter()
            .map(|id| CompanyBrief {
                id: *id,
                name: "Acme Systems".to_string(),
                logo: None,
                industry: None,
            })
            .collect())
    });

    let mut users = MockUserRepo::new();
    users
        .expect_user_summaries()
        .returning(|ids, _| Ok(ids.iter().map(|id| summary(*id)).collect()));

    ExperienceHandler::new(experiences, rounds, companies, users)
}

fn stored(experience: PlacementExperience) -> MockExperienceRepo {
    let mut repo = MockExperienceRepo::new();
    repo.expect_get_experience()
        .returning(move |_| Ok(Some(experience.clone())));
    repo
}

#[actix_rt::test]
async fn approved_experience_counts_a_view_for_visitors() {
    let owner = student();
    let approved = experience(owner.user_id, Uuid::new_v4(), ExperienceStatus::Approved);
    let id = approved.id;

    let mut repo = stored(approved);
    repo.expect_increment_views().with(eq(id)).times(1).returning(|_| Ok(()));

    let view = handler_with(repo).get_experience(&id.to_string(), None).await.unwrap();

    assert_eq!(view.experience.views, 1);
    assert!(view.company.is_some());
}

#[actix_rt::test]
async fn owner_reads_do_not_count_views() {
    let owner = student();
    let approved = experience(owner.user_id, Uuid::new_v4(), ExperienceStatus::Approved);
    let id = approved.id.to_string();

    let mut repo = stored(approved);
    repo.expect_increment_views().never();

    let view = handler_with(repo).get_experience(&id, Some(&owner)).await.unwrap();
    assert_eq!(view.experience.views, 0);
}

#[actix_rt::test]
async fn pending_experience_is_forbidden_to_strangers() {
    let owner = student();
    let pending = experience(owner.user_id, Uuid::new_v4(), ExperienceStatus::Pending);
    let id = pending.id.to_string();

    let mut repo = stored(pending);
    repo.expect_increment_views().never();
    let handler = handler_with(repo);

    let stranger = handler.get_experience(&id, Some(&student())).await;
    assert!(matches!(stranger, Err(AppError::Forbidden(_))));

    let anonymous = handler.get_experience(&id, None).await;
    assert!(matches!(anonymous, Err(AppError::Forbidden(_))));

    assert!(handler.get_experience(&id, Some(&owner)).await.is_ok());
    assert!(handler.get_experience(&id, Some(&admin())).await.is_ok());
}

#[actix_rt::test]
async fn inactive_experience_is_not_found_for_strangers() {
    let mut deleted = experience(Uuid::new_v4(), Uuid::new_v4(), ExperienceStatus::Approved);
    deleted.is_active = false;
    let id = deleted.id.to_string();

    let handler = handler_with(stored(deleted));
    let result = handler.get_experience(&id, Some(&student())).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn anonymous_submitter_and_hidden_salary_are_projected_away() {
    let owner = student();
    let mut approved = experience(owner.user_id, Uuid::new_v4(), ExperienceStatus::Approved);
    approved.is_anonymous = true;
    approved.show_salary = false;
    let id = approved.id.to_string();

    let mut repo = stored(approved);
    repo.expect_increment_views().returning(|_| Ok(()));
    let handler = handler_with(repo);

    let public = handler.get_experience(&id, Some(&student())).await.unwrap();
    assert!(public.student.is_none());
    assert!(public.experience.salary_offered.is_none());

    let own = handler.get_experience(&id, Some(&owner)).await.unwrap();
    assert_eq!(own.experience.salary_offered, Some(1_200_000.0));
    let card = own.student.expect("submitter visible to the owner");
    assert!(card.email.is_none());
}

#[actix_rt::test]
async fn pending_queue_carries_submitter_email() {
    let submitter = Uuid::new_v4();
    let mut repo = MockExperienceRepo::new();
    repo.expect_list_pending().returning(move |_| {
        Ok(page(vec![experience(submitter, Uuid::new_v4(), ExperienceStatus::Pending)]))
    });

    let (views, pagination) = handler_with(repo).pending(&Default::default()).await.unwrap();

    assert_eq!(pagination.total, 1);
    assert!(views[0].student.as_ref().and_then(|s| s.email.as_ref()).is_some());
}

#[actix_rt::test]
async fn moderation_records_the_reviewer() {
    let reviewer = admin();
    let pending = experience(Uuid::new_v4(), Uuid::new_v4(), ExperienceStatus::Pending);
    let id = pending.id;

    let mut repo = stored(pending);
    let reviewer_id = reviewer.user_id;
    repo.expect_moderate()
        .withf(move |_, status, notes, by| {
            *status == ExperienceStatus::Approved && notes.as_deref() == Some("Looks good") && *by == reviewer_id
        })
        .returning(|id, status, notes, by| {
            let mut moderated = experience(Uuid::new_v4(), Uuid::new_v4(), status);
            moderated.id = *id;
            moderated.admin_notes = notes;
            moderated.reviewed_by = Some(*by);
            Ok(Some(moderated))
        });

    let request: ModerationRequest =
        serde_json::from_value(json!({ "status": "approved", "adminNotes": "Looks good" })).unwrap();
    let moderated = handler_with(repo)
        .moderate(&reviewer, &id.to_string(), request)
        .await
        .unwrap();

    assert_eq!(moderated.status, ExperienceStatus::Approved);
    assert_eq!(moderated.reviewed_by, Some(reviewer.user_id));
}

#[actix_rt::test]
async fn already_moderated_experience_is_rejected() {
    let approved = experience(Uuid::new_v4(), Uuid::new_v4(), ExperienceStatus::Approved);
    let id = approved.id.to_string();

    let mut repo = stored(approved);
    repo.expect_moderate().returning(|_, _, _, _| Ok(None));

    let request: ModerationRequest = serde_json::from_value(json!({ "status": "rejected" })).unwrap();
    let result = handler_with(repo).moderate(&admin(), &id, request).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[actix_rt::test]
async fn pending_status_is_not_a_moderation_decision() {
    let result: Result<ModerationRequest, _> = serde_json::from_value(json!({ "status": "pending" }));
    assert!(result.is_err());
}

#[actix_rt::test]
async fn moderated_experience_cannot_be_edited() {
    let owner = student();
    let approved = experience(owner.user_id, Uuid::new_v4(), ExperienceStatus::Approved);
    let id = approved.id.to_string();

    let mut repo = stored(approved);
    repo.expect_update_experience().never();

    let result = handler_with(repo)
        .update_experience(&owner, &id, Default::default())
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[actix_rt::test]
async fn edit_losing_the_race_to_moderation_is_rejected() {
    let owner = student();
    let pending = experience(owner.user_id, Uuid::new_v4(), ExperienceStatus::Pending);
    let id = pending.id;

    let mut repo = stored(pending);
    repo.expect_update_experience()
        .with(eq(id), mockall::predicate::always())
        .times(1)
        .returning(|_, _| Ok(None));

    let result = handler_with(repo)
        .update_experience(&owner, &id.to_string(), Default::default())
        .await;

    match result {
        Err(AppError::BadRequest(message)) => assert!(message.contains("pending")),
        other => panic!("expected BadRequest, got {:?}", other.map(|e| e.id)),
    }
}

#[actix_rt::test]
async fn submission_starts_pending_with_nested_rounds() {
    let me = student();
    let company_id = Uuid::new_v4();

    let mut companies = MockCompanyRepo::new();
    companies.expect_get_company().returning(|id| Ok(Some(company(*id))));

    let mut repo = MockExperienceRepo::new();
    repo.expect_create_with_rounds()
        .withf(|insert, rounds| {
            insert.tracking_id.starts_with("EXP")
                && rounds.len() == 2
                && insert.rounds_completed == 2
                && insert.round_types == vec!["aptitude", "technical"]
        })
        .returning(|insert, _| {
            let mut created = experience(insert.user_id, insert.company_id, ExperienceStatus::Pending);
            created.tracking_id = insert.tracking_id.clone();
            Ok(created)
        });

    let request: NewExperienceRequest = serde_json::from_value(json!({
        "companyId": company_id,
        "jobRole": "SDE",
        "applicationDate": "2025-08-01",
        "totalRounds": 3,
        "overallExperience": "Fair process with a tough DSA round.",
        "overallDifficulty": "hard",
        "rounds": [
            { "type": "aptitude", "aptitudeDetails": { "roundNumber": 1, "date": "2025-08-02" } },
            { "type": "technical" }
        ]
    }))
    .unwrap();

    let handler = ExperienceHandler::new(repo, MockRoundRepo::new(), companies, MockUserRepo::new());
    let created = handler.create_experience(&me, request).await.unwrap();

    assert_eq!(created.status, ExperienceStatus::Pending);
    assert!(created.tracking_id.starts_with("EXP"));
}
