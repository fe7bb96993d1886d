mod mocks;

use fixtures::*;
use mocks::*;

use serde_json::json;
use uuid::Uuid;

use placify_backend::{
    entities::{
        application::{ApplicationStatus, NewApplicationRequest, UpdateApplicationStatusRequest},
        user::UserRole,
    },
    errors::AppError,
    use_cases::applications::ApplicationHandler,
};

fn apply_to(job_id: Uuid) -> NewApplicationRequest {
    serde_json::from_value(json!({ "jobId": job_id, "coverLetter": "Keen to join." })).unwrap()
}

fn status_change(status: &str) -> UpdateApplicationStatusRequest {
    serde_json::from_value(json!({ "status": status })).unwrap()
}

#[actix_rt::test]
async fn application_defaults_resume_and_company_from_profile_and_job() {
    let applicant = user(UserRole::Student);
    let resume = applicant.resume.clone();
    let company_id = Uuid::new_v4();
    let job_id = Uuid::new_v4();

    let mut jobs = MockJobRepo::new();
    jobs.expect_get_job().returning(move |id| Ok(Some(job(*id, company_id))));

    let mut applications = MockApplicationRepo::new();
    applications.expect_find_by_user_and_job().returning(|_, _| Ok(None));
    applications
        .expect_create_application()
        .withf(move |insert| {
            insert.company_id == company_id
                && insert.resume_version == resume
                && insert.tracking_id.starts_with("APP")
        })
        .times(1)
        .returning(|insert| Ok(application(insert.user_id, insert.job_id, insert.company_id)));

    let handler = ApplicationHandler::new(applications, jobs, MockCompanyRepo::new());
    let created = handler.create_application(&applicant, apply_to(job_id)).await.unwrap();

    assert_eq!(created.job_id, job_id);
    assert_eq!(created.status, ApplicationStatus::Applied);
}

#[actix_rt::test]
async fn duplicate_application_conflicts() {
    let applicant = user(UserRole::Student);
    let company_id = Uuid::new_v4();

    let mut jobs = MockJobRepo::new();
    jobs.expect_get_job().returning(move |id| Ok(Some(job(*id, company_id))));

    let mut applications = MockApplicationRepo::new();
    applications
        .expect_find_by_user_and_job()
        .returning(move |user_id, job_id| Ok(Some(application(*user_id, *job_id, company_id))));
    applications.expect_create_application().never();

    let handler = ApplicationHandler::new(applications, jobs, MockCompanyRepo::new());
    let result = handler.create_application(&applicant, apply_to(Uuid::new_v4())).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[actix_rt::test]
async fn closed_job_does_not_accept_applications() {
    let mut jobs = MockJobRepo::new();
    jobs.expect_get_job().returning(|id| {
        let mut closed = job(*id, Uuid::new_v4());
        closed.is_active = false;
        Ok(Some(closed))
    });

    let handler = ApplicationHandler::new(MockApplicationRepo::new(), jobs, MockCompanyRepo::new());
    let result = handler
        .create_application(&user(UserRole::Student), apply_to(Uuid::new_v4()))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn status_moves_forward_through_the_pipeline() {
    let mut current = application(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    current.status = ApplicationStatus::Shortlisted;
    let id = current.id;

    let mut applications = MockApplicationRepo::new();
    applications
        .expect_get_application()
        .returning(move |_| Ok(Some(current.clone())));
    applications
        .expect_update_status()
        .times(1)
        .returning(|id, status, _| {
            let mut updated = application(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
            updated.id = *id;
            updated.status = status;
            Ok(Some(updated))
        });

    let handler = ApplicationHandler::new(applications, MockJobRepo::new(), MockCompanyRepo::new());
    let updated = handler
        .update_status(&id.to_string(), status_change("interview_scheduled"))
        .await
        .unwrap();

    assert_eq!(updated.status, ApplicationStatus::InterviewScheduled);
}

#[actix_rt::test]
async fn terminal_status_cannot_change() {
    let mut current = application(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    current.status = ApplicationStatus::Rejected;
    let id = current.id.to_string();

    let mut applications = MockApplicationRepo::new();
    applications
        .expect_get_application()
        .returning(move |_| Ok(Some(current.clone())));
    applications.expect_update_status().never();

    let handler = ApplicationHandler::new(applications, MockJobRepo::new(), MockCompanyRepo::new());
    let result = handler.update_status(&id, status_change("selected")).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[actix_rt::test]
async fn students_cannot_read_each_others_applications() {
    let owner = student();
    let stored = application(owner.user_id, Uuid::new_v4(), Uuid::new_v4());
    let id = stored.id.to_string();

    let mut applications = MockApplicationRepo::new();
    applications
        .expect_get_application()
        .returning(move |_| Ok(Some(stored.clone())));

    let handler = ApplicationHandler::new(applications, MockJobRepo::new(), MockCompanyRepo::new());
    let result = handler.get_application(&student(), &id).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
