mod mocks;

use fixtures::*;
use mocks::*;

use mockall::predicate::eq;
use serde_json::json;
use uuid::Uuid;

use placify_backend::{
    entities::review::NewReviewRequest,
    errors::AppError,
    use_cases::reviews::ReviewHandler,
};

fn new_review(company_id: Uuid) -> NewReviewRequest {
    serde_json::from_value(json!({
        "companyId": company_id,
        "jobRole": "SDE Intern",
        "overallRating": 4.26,
        "interviewDifficulty": "medium",
        "interviewExperience": "positive",
        "title": "Smooth and friendly process",
        "description": "The process had three rounds and the interviewers were helpful throughout.",
        "pros": ["good culture"],
    }))
    .unwrap()
}

#[actix_rt::test]
async fn create_review_refreshes_company_rating() {
    let me = student();
    let company_id = Uuid::new_v4();

    let mut companies = MockCompanyRepo::new();
    companies
        .expect_get_company()
        .with(eq(company_id))
        .returning(|id| Ok(Some(company(*id))));
    companies
        .expect_refresh_rating()
        .with(eq(company_id))
        .times(1)
        .returning(|_| Ok(()));

    let mut reviews = MockReviewRepo::new();
    reviews.expect_review_exists().returning(|_, _| Ok(false));
    reviews
        .expect_create_review()
        .withf(|insert| (insert.overall_rating - 4.3).abs() < 1e-9 && insert.pros == vec!["good culture"])
        .returning(|insert| {
            let mut created = review(insert.user_id, insert.company_id);
            created.overall_rating = insert.overall_rating;
            Ok(created)
        });

    let handler = ReviewHandler::new(reviews, companies, MockUserRepo::new());
    let created = handler.create_review(&me, new_review(company_id)).await.unwrap();

    assert_eq!(created.user_id, me.user_id);
    assert_eq!(created.company_id, company_id);
}

#[actix_rt::test]
async fn second_review_for_same_company_conflicts() {
    let company_id = Uuid::new_v4();

    let mut companies = MockCompanyRepo::new();
    companies.expect_get_company().returning(|id| Ok(Some(company(*id))));
    companies.expect_refresh_rating().never();

    let mut reviews = MockReviewRepo::new();
    reviews.expect_review_exists().returning(|_, _| Ok(true));
    reviews.expect_create_review().never();

    let handler = ReviewHandler::new(reviews, companies, MockUserRepo::new());
    let result = handler.create_review(&student(), new_review(company_id)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[actix_rt::test]
async fn review_for_inactive_company_is_not_found() {
    let mut companies = MockCompanyRepo::new();
    companies.expect_get_company().returning(|id| {
        let mut inactive = company(*id);
        inactive.is_active = false;
        Ok(Some(inactive))
    });

    let handler = ReviewHandler::new(MockReviewRepo::new(), companies, MockUserRepo::new());
    let result = handler.create_review(&student(), new_review(Uuid::new_v4())).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn short_description_fails_validation() {
    let mut request = new_review(Uuid::new_v4());
    request.description = "too short".to_string();

    let handler = ReviewHandler::new(MockReviewRepo::new(), MockCompanyRepo::new(), MockUserRepo::new());
    let result = handler.create_review(&student(), request).await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[actix_rt::test]
async fn anonymous_review_hides_author_from_public() {
    let author = student();
    let company_id = Uuid::new_v4();
    let mut stored = review(author.user_id, company_id);
    stored.is_anonymous = true;
    let review_id = stored.id;

    let mut reviews = MockReviewRepo::new();
    reviews
        .expect_get_review()
        .returning(move |_| Ok(Some(stored.clone())));

    let mut users = MockUserRepo::new();
    users
        .expect_user_summaries()
        .returning(|ids, _| Ok(ids.iter().map(|id| summary(*id)).collect()));

    let handler = ReviewHandler::new(reviews, MockCompanyRepo::new(), users);

    let public = handler.get_review(&review_id.to_string(), None).await.unwrap();
    assert!(public.author.is_none());

    let own = handler.get_review(&review_id.to_string(), Some(&author)).await.unwrap();
    let card = own.author.expect("author visible to the owner");
    assert_eq!(card.id, author.user_id);
    assert!(card.email.is_none());
}

#[actix_rt::test]
async fn inactive_review_is_hidden_from_other_students() {
    let author = student();
    let mut stored = review(author.user_id, Uuid::new_v4());
    stored.is_active = false;
    let review_id = stored.id.to_string();

    let mut reviews = MockReviewRepo::new();
    reviews
        .expect_get_review()
        .returning(move |_| Ok(Some(stored.clone())));

    let mut users = MockUserRepo::new();
    users
        .expect_user_summaries()
        .returning(|ids, _| Ok(ids.iter().map(|id| summary(*id)).collect()));

    let handler = ReviewHandler::new(reviews, MockCompanyRepo::new(), users);

    let stranger = handler.get_review(&review_id, Some(&student())).await;
    assert!(matches!(stranger, Err(AppError::NotFound(_))));

    assert!(handler.get_review(&review_id, Some(&admin())).await.is_ok());
}

#[actix_rt::test]
async fn only_the_author_may_delete() {
    let author = student();
    let stored = review(author.user_id, Uuid::new_v4());
    let review_id = stored.id.to_string();

    let mut reviews = MockReviewRepo::new();
    reviews
        .expect_get_review()
        .returning(move |_| Ok(Some(stored.clone())));
    reviews.expect_deactivate_review().times(1).returning(|_| Ok(true));

    let mut companies = MockCompanyRepo::new();
    companies.expect_refresh_rating().times(1).returning(|_| Ok(()));

    let handler = ReviewHandler::new(reviews, companies, MockUserRepo::new());

    let denied = handler.delete_review(&student(), &review_id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    handler.delete_review(&author, &review_id).await.unwrap();
}

#[actix_rt::test]
async fn helpful_vote_on_missing_review_is_not_found() {
    let mut reviews = MockReviewRepo::new();
    reviews.expect_increment_helpful().returning(|_| Ok(None));

    let handler = ReviewHandler::new(reviews, MockCompanyRepo::new(), MockUserRepo::new());
    let result = handler.mark_helpful(&Uuid::new_v4().to_string()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn malformed_id_is_a_bad_request() {
    let handler = ReviewHandler::new(MockReviewRepo::new(), MockCompanyRepo::new(), MockUserRepo::new());
    let result = handler.report_review("not-a-uuid").await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}
