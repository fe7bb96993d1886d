//! End-to-end flows against a real Postgres. Each test returns early when
//! `TEST_DATABASE_URL` is unset, so point it at a scratch database to run them.


use fixtures::*;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use placify_backend::{
    db::postgres::{create_pool, run_migrations},
    limiter::rate_limiter::RateLimiterStore,
    middlewares::{auth::AuthMiddleware, rate_limit::RateLimitMiddleware},
    routes::configure_routes,
    AppState,
};

async fn spawn_state() -> Option<(web::Data<AppState>, sqlx::PgPool)> {
    if std::env::var("TEST_DATABASE_URL").is_err() {
        eprintln!("TEST_DATABASE_URL is not set; skipping database test");
        return None;
    }
    let config = test_config();
    let pool = create_pool(&config).await.expect("Failed to create test DB pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Some((web::Data::new(AppState::new(&config, pool.clone())), pool))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(configure_routes)
                .wrap(AuthMiddleware)
                .wrap(RateLimitMiddleware::new(
                    RateLimiterStore::new(10_000, Duration::from_secs(60)),
                    false,
                )),
        )
        .await
    };
}

fn unique_email(tag: &str) -> String {
    format!("{}-{}@example.com", tag, Uuid::new_v4().simple())
}

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let res = test::call_service(&$app, $req.to_request()).await;
        let status = res.status();
        let body: Value = test::read_body_json(res).await;
        (status, body)
    }};
}

macro_rules! register {
    ($app:expr, $email:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post().uri("/api/auth/register").set_json(json!({
                "firstName": "Asha",
                "lastName": "Rao",
                "email": $email,
                "password": "Secret123",
            }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! login {
    ($app:expr, $email:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": $email, "password": "Secret123" }))
        );
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }};
}

async fn promote(pool: &sqlx::PgPool, email: &str) {
    sqlx::query("UPDATE users SET role = 'admin' WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await
        .unwrap();
}

#[actix_rt::test]
async fn reviews_keep_company_rating_in_step() {
    let Some((state, pool)) = spawn_state().await else { return };
    let app = app!(state);

    let admin_email = unique_email("admin");
    register!(app, &admin_email);
    promote(&pool, &admin_email).await;
    let admin_token = login!(app, &admin_email);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/companies")
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(json!({ "name": format!("Acme {}", Uuid::new_v4().simple()), "industry": "Software" }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let company_id = body["company"]["id"].as_str().unwrap().to_string();

    let student_token = register!(app, &unique_email("student"));
    let review = json!({
        "companyId": company_id,
        "jobRole": "SDE Intern",
        "overallRating": 4,
        "interviewDifficulty": "medium",
        "interviewExperience": "positive",
        "title": "Smooth and friendly process",
        "description": "The process had three rounds and the interviewers were helpful throughout.",
    });

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header(("Authorization", format!("Bearer {student_token}")))
            .set_json(&review)
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header(("Authorization", format!("Bearer {student_token}")))
            .set_json(&review)
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(app, test::TestRequest::get().uri(&format!("/api/companies/{company_id}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["totalReviews"], 1);
    assert_eq!(body["company"]["averageRating"], 4.0);
}

#[actix_rt::test]
async fn experiences_are_public_only_after_approval() {
    let Some((state, pool)) = spawn_state().await else { return };
    let app = app!(state);

    let admin_email = unique_email("moderator");
    register!(app, &admin_email);
    promote(&pool, &admin_email).await;
    let admin_token = login!(app, &admin_email);

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/companies")
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(json!({ "name": format!("Globex {}", Uuid::new_v4().simple()), "industry": "Finance" }))
    );
    let company_id = body["company"]["id"].as_str().unwrap().to_string();

    let student_token = register!(app, &unique_email("candidate"));
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/placement-experiences")
            .insert_header(("Authorization", format!("Bearer {student_token}")))
            .set_json(json!({
                "companyId": company_id,
                "jobRole": "Analyst",
                "applicationDate": "2025-07-01",
                "totalRounds": 2,
                "overallExperience": "Two rounds, both conversational.",
                "overallDifficulty": "easy",
                "rounds": [{ "type": "hr", "hrDetails": { "date": "2025-07-10", "interviewType": "video" } }]
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["experience"]["status"], "pending");
    let experience_id = body["experience"]["id"].as_str().unwrap().to_string();

    let (status, _) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/placement-experiences/{experience_id}"))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/placement-experiences/{experience_id}/status"))
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(json!({ "status": "approved" }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/placement-experiences/{experience_id}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["experience"]["views"], 1);
    assert_eq!(body["experience"]["rounds"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn company_listing_paginates_over_search_results() {
    let Some((state, pool)) = spawn_state().await else { return };
    let app = app!(state);

    let admin_email = unique_email("admin");
    register!(app, &admin_email);
    promote(&pool, &admin_email).await;
    let admin_token = login!(app, &admin_email);

    let tag = format!("Pg{}", Uuid::new_v4().simple());
    for n in 0..15 {
        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/companies")
                .insert_header(("Authorization", format!("Bearer {admin_token}")))
                .set_json(json!({ "name": format!("{tag} {n:02}"), "industry": "Software" }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/companies?search={tag}&page=2&limit=10"))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["companies"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["total"], 15);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);
}

macro_rules! create_company {
    ($app:expr, $token:expr, $prefix:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/companies")
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .set_json(json!({ "name": format!("{} {}", $prefix, Uuid::new_v4().simple()), "industry": "Software" }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["company"]["id"].as_str().unwrap().to_string()
    }};
}

macro_rules! create_job {
    ($app:expr, $token:expr, $company_id:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/jobs")
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .set_json(json!({
                    "companyId": $company_id,
                    "title": "Backend Engineer",
                    "description": "Build and run the services behind the campus portal.",
                    "location": "Pune",
                }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["job"]["id"].as_str().unwrap().to_string()
    }};
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[actix_rt::test]
async fn applications_conflict_and_count_once() {
    let Some((state, pool)) = spawn_state().await else { return };
    let app = app!(state);

    let admin_email = unique_email("recruiter");
    register!(app, &admin_email);
    promote(&pool, &admin_email).await;
    let admin_token = login!(app, &admin_email);

    let company_id = create_company!(app, admin_token, "Initech");
    let job_id = create_job!(app, admin_token, company_id);

    let student_token = register!(app, &unique_email("applicant"));
    let apply = || {
        test::TestRequest::post()
            .uri("/api/applications")
            .insert_header(("Authorization", format!("Bearer {student_token}")))
            .set_json(json!({ "jobId": job_id, "coverLetter": "Keen to join the platform team." }))
    };

    let (status, body) = send!(app, apply());
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send!(app, apply());
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["success"], false);

    let (status, body) = send!(app, test::TestRequest::get().uri(&format!("/api/jobs/{job_id}")));
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["job"]["totalApplications"], 1);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/applications/my-applications")
            .insert_header(("Authorization", format!("Bearer {student_token}")))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["applications"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn deleted_jobs_and_companies_leave_listings_but_remain_visible_to_admins() {
    let Some((state, pool)) = spawn_state().await else { return };
    let app = app!(state);

    let admin_email = unique_email("curator");
    register!(app, &admin_email);
    promote(&pool, &admin_email).await;
    let admin_token = login!(app, &admin_email);
    let bearer = format!("Bearer {admin_token}");

    let tag = format!("Umbrella{}", Uuid::new_v4().simple());
    let company_id = create_company!(app, admin_token, tag);
    let kept_job = create_job!(app, admin_token, company_id);
    let dropped_job = create_job!(app, admin_token, company_id);

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/jobs/{dropped_job}"))
            .insert_header(("Authorization", bearer.clone()))
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send!(app, test::TestRequest::get().uri(&format!("/api/jobs?companyId={company_id}")));
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(ids(&body["jobs"]), vec![kept_job.clone()]);

    let (status, _) = send!(app, test::TestRequest::get().uri(&format!("/api/jobs/{dropped_job}")));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/jobs/{dropped_job}"))
            .insert_header(("Authorization", bearer.clone()))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["job"]["isActive"], false);

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/companies/{company_id}"))
            .insert_header(("Authorization", bearer.clone()))
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send!(app, test::TestRequest::get().uri(&format!("/api/companies?search={tag}")));
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(ids(&body["companies"]).is_empty(), "{body}");

    let (status, _) = send!(app, test::TestRequest::get().uri(&format!("/api/companies/{company_id}")));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/companies/{company_id}"))
            .insert_header(("Authorization", bearer))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["company"]["isActive"], false);
}

#[actix_rt::test]
async fn deleted_rounds_leave_my_rounds_but_stay_with_their_owner() {
    let Some((state, pool)) = spawn_state().await else { return };
    let app = app!(state);

    let admin_email = unique_email("admin");
    register!(app, &admin_email);
    promote(&pool, &admin_email).await;
    let admin_token = login!(app, &admin_email);
    let company_id = create_company!(app, admin_token, "Hooli");

    let student_token = register!(app, &unique_email("tracker"));
    let bearer = format!("Bearer {student_token}");

    let mut round_ids = Vec::new();
    for role in ["SDE Intern", "Data Intern"] {
        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/rounds")
                .insert_header(("Authorization", bearer.clone()))
                .set_json(json!({ "companyId": company_id, "jobRole": role }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        round_ids.push(body["round"]["id"].as_str().unwrap().to_string());
    }
    let (kept, dropped) = (round_ids[0].clone(), round_ids[1].clone());

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/rounds/{dropped}"))
            .insert_header(("Authorization", bearer.clone()))
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/rounds/my-rounds")
            .insert_header(("Authorization", bearer.clone()))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(ids(&body["rounds"]), vec![kept]);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/rounds/{dropped}"))
            .insert_header(("Authorization", bearer))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["round"]["isActive"], false);
}
