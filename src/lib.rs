mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, policy, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes};
pub use infrastructure::{auth, db, limiter, utils};

use auth::jwt::JwtService;
use repositories::sqlx_repo::{
    SqlxApplicationRepo, SqlxCompanyRepo, SqlxExperienceRepo, SqlxJobRepo, SqlxReviewRepo, SqlxRoundRepo,
    SqlxUserRepo,
};
use settings::{AppConfig, AppEnvironment};
use use_cases::{
    applications::ApplicationHandler, auth::AuthHandler, companies::CompanyHandler,
    experiences::ExperienceHandler, jobs::JobHandler, reviews::ReviewHandler, rounds::RoundHandler,
    users::UserHandler,
};

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub user_handler: AppUserHandler,
    pub company_handler: AppCompanyHandler,
    pub job_handler: AppJobHandler,
    pub application_handler: AppApplicationHandler,
    pub review_handler: AppReviewHandler,
    pub round_handler: AppRoundHandler,
    pub experience_handler: AppExperienceHandler,
    pub environment: AppEnvironment,
}

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;
pub type AppUserHandler = UserHandler<SqlxUserRepo, SqlxApplicationRepo, SqlxReviewRepo>;
pub type AppCompanyHandler = CompanyHandler<SqlxCompanyRepo, SqlxJobRepo, SqlxReviewRepo, SqlxUserRepo>;
pub type AppJobHandler = JobHandler<SqlxJobRepo, SqlxCompanyRepo>;
pub type AppApplicationHandler = ApplicationHandler<SqlxApplicationRepo, SqlxJobRepo, SqlxCompanyRepo>;
pub type AppReviewHandler = ReviewHandler<SqlxReviewRepo, SqlxCompanyRepo, SqlxUserRepo>;
pub type AppRoundHandler = RoundHandler<SqlxRoundRepo, SqlxCompanyRepo, SqlxJobRepo, SqlxExperienceRepo>;
pub type AppExperienceHandler =
    ExperienceHandler<SqlxExperienceRepo, SqlxRoundRepo, SqlxCompanyRepo, SqlxUserRepo>;

impl AppState {
    pub fn new(config: &AppConfig, pool: sqlx::PgPool) -> Self {
        let users = SqlxUserRepo::new(pool.clone());
        let companies = SqlxCompanyRepo::new(pool.clone());
        let jobs = SqlxJobRepo::new(pool.clone());
        let applications = SqlxApplicationRepo::new(pool.clone());
        let reviews = SqlxReviewRepo::new(pool.clone());
        let rounds = SqlxRoundRepo::new(pool.clone());
        let experiences = SqlxExperienceRepo::new(pool);

        AppState {
            auth_handler: AuthHandler::new(users.clone(), JwtService::new(config)),
            user_handler: UserHandler::new(users.clone(), applications.clone(), reviews.clone()),
            company_handler: CompanyHandler::new(companies.clone(), jobs.clone(), reviews.clone(), users.clone()),
            job_handler: JobHandler::new(jobs.clone(), companies.clone()),
            application_handler: ApplicationHandler::new(applications, jobs.clone(), companies.clone()),
            review_handler: ReviewHandler::new(reviews, companies.clone(), users.clone()),
            round_handler: RoundHandler::new(rounds.clone(), companies.clone(), jobs, experiences.clone()),
            experience_handler: ExperienceHandler::new(experiences, rounds, companies, users),
            environment: config.env.clone(),
        }
    }
}
