#![allow(dead_code)]

use jsonwebtoken::TokenData;
use mockall::mock;
use uuid::Uuid;

use placify_backend::{
    entities::{
        application::{Application, ApplicationInsert, ApplicationListQuery, ApplicationStatus, UpdateApplicationRequest},
        company::{Company, CompanyBrief, CompanyInsert, CompanyListQuery, CompanyStats, UpdateCompanyRequest},
        experience::{
            ExperienceInsert, ExperienceListQuery, ExperienceStatus, MyExperienceQuery, NestedRound,
            PlacementExperience, UpdateExperienceRequest,
        },
        job::{Job, JobBrief, JobInsert, JobListQuery, UpdateJobRequest},
        pagination::{Page, PageRequest},
        review::{Review, ReviewInsert, ReviewListQuery, UpdateReviewRequest},
        round::{
            AptitudeRound, DsaRound, HrRound, NewAptitudeRound, NewDsaRound, NewHrRound, NewTechRound, Round,
            RoundDetailSet, RoundInsert, TechRound, UpdateRoundRequest,
        },
        token::{Claims, RefreshClaims},
        user::{UpdateProfileRequest, User, UserInsert, UserListQuery, UserSummary},
    },
    errors::{AppError, AuthError},
    repositories::{
        application::ApplicationRepository, company::CompanyRepository, experience::ExperienceRepository,
        job::JobRepository, review::ReviewRepository, round::RoundRepository, token::TokenServiceRepository,
        user::UserRepository,
    },
};

mock! {
    pub UserRepo {}

    #[async_trait::async_trait]
    impl UserRepository for UserRepo {
        async fn check_connection(&self) -> Result<(), AppError>;
        async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
        async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError>;
        async fn create_user(&self, user: &UserInsert) -> Result<User, AppError>;
        async fn record_login(&self, id: &Uuid) -> Result<(), AppError>;
        async fn update_profile(&self, id: &Uuid, patch: &UpdateProfileRequest) -> Result<Option<User>, AppError>;
        async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), AppError>;
        async fn list_users(&self, query: &UserListQuery, page: PageRequest) -> Result<Page<User>, AppError>;
        async fn user_summaries(&self, ids: &[Uuid], with_email: bool) -> Result<Vec<UserSummary>, AppError>;
    }
}

mock! {
    pub CompanyRepo {}

    #[async_trait::async_trait]
    impl CompanyRepository for CompanyRepo {
        async fn list_companies(&self, query: &CompanyListQuery, page: PageRequest) -> Result<Page<Company>, AppError>;
        async fn get_company(&self, id: &Uuid) -> Result<Option<Company>, AppError>;
        async fn create_company(&self, company: &CompanyInsert) -> Result<Company, AppError>;
        async fn update_company(&self, id: &Uuid, patch: &UpdateCompanyRequest) -> Result<Option<Company>, AppError>;
        async fn deactivate_company(&self, id: &Uuid) -> Result<bool, AppError>;
        async fn company_stats(&self, id: &Uuid) -> Result<Option<CompanyStats>, AppError>;
        async fn company_briefs(&self, ids: &[Uuid]) -> Result<Vec<CompanyBrief>, AppError>;
        async fn refresh_rating(&self, id: &Uuid) -> Result<(), AppError>;
    }
}

mock! {
    pub JobRepo {}

    #[async_trait::async_trait]
    impl JobRepository for JobRepo {
        async fn list_jobs(&self, query: &JobListQuery, page: PageRequest) -> Result<Page<Job>, AppError>;
        async fn get_job(&self, id: &Uuid) -> Result<Option<Job>, AppError>;
        async fn create_job(&self, job: &JobInsert) -> Result<Job, AppError>;
        async fn update_job(&self, id: &Uuid, patch: &UpdateJobRequest) -> Result<Option<Job>, AppError>;
        async fn deactivate_job(&self, id: &Uuid) -> Result<bool, AppError>;
        async fn active_jobs_for_companies(&self, company_ids: &[Uuid]) -> Result<Vec<Job>, AppError>;
        async fn job_briefs(&self, ids: &[Uuid]) -> Result<Vec<JobBrief>, AppError>;
    }
}

mock! {
    pub ApplicationRepo {}

    #[async_trait::async_trait]
    impl ApplicationRepository for ApplicationRepo {
        async fn find_by_user_and_job(&self, user_id: &Uuid, job_id: &Uuid) -> Result<Option<Application>, AppError>;
        async fn create_application(&self, application: &ApplicationInsert) -> Result<Application, AppError>;
        async fn get_application(&self, id: &Uuid) -> Result<Option<Application>, AppError>;
        async fn list_for_user(
            &self,
            user_id: &Uuid,
            query: &ApplicationListQuery,
            page: PageRequest,
        ) -> Result<Page<Application>, AppError>;
        async fn list_applications(&self, query: &ApplicationListQuery, page: PageRequest) -> Result<Page<Application>, AppError>;
        async fn all_for_user(&self, user_id: &Uuid) -> Result<Vec<Application>, AppError>;
        async fn update_application(
            &self,
            id: &Uuid,
            patch: &UpdateApplicationRequest,
        ) -> Result<Option<Application>, AppError>;
        async fn update_status(
            &self,
            id: &Uuid,
            status: ApplicationStatus,
            notes: Option<String>,
        ) -> Result<Option<Application>, AppError>;
        async fn withdraw_application(&self, id: &Uuid) -> Result<bool, AppError>;
    }
}

mock! {
    pub ReviewRepo {}

    #[async_trait::async_trait]
    impl ReviewRepository for ReviewRepo {
        async fn review_exists(&self, user_id: &Uuid, company_id: &Uuid) -> Result<bool, AppError>;
        async fn create_review(&self, review: &ReviewInsert) -> Result<Review, AppError>;
        async fn get_review(&self, id: &Uuid) -> Result<Option<Review>, AppError>;
        async fn list_for_company(
            &self,
            company_id: &Uuid,
            query: &ReviewListQuery,
            page: PageRequest,
        ) -> Result<Page<Review>, AppError>;
        async fn list_for_user(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<Review>, AppError>;
        async fn all_for_user(&self, user_id: &Uuid) -> Result<Vec<Review>, AppError>;
        async fn active_for_company(&self, company_id: &Uuid) -> Result<Vec<Review>, AppError>;
        async fn update_review(&self, id: &Uuid, patch: &UpdateReviewRequest) -> Result<Option<Review>, AppError>;
        async fn deactivate_review(&self, id: &Uuid) -> Result<bool, AppError>;
        async fn increment_helpful(&self, id: &Uuid) -> Result<Option<Review>, AppError>;
        async fn increment_report(&self, id: &Uuid) -> Result<Option<Review>, AppError>;
    }
}

mock! {
    pub RoundRepo {}

    #[async_trait::async_trait]
    impl RoundRepository for RoundRepo {
        async fn create_round(&self, round: &RoundInsert) -> Result<Round, AppError>;
        async fn get_round(&self, id: &Uuid) -> Result<Option<Round>, AppError>;
        async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Round>, AppError>;
        async fn rounds_for_experiences(&self, experience_ids: &[Uuid]) -> Result<Vec<Round>, AppError>;
        async fn update_round(&self, id: &Uuid, patch: &UpdateRoundRequest) -> Result<Option<Round>, AppError>;
        async fn deactivate_round(&self, id: &Uuid) -> Result<bool, AppError>;
        async fn add_aptitude(&self, round_id: &Uuid, detail: &NewAptitudeRound) -> Result<AptitudeRound, AppError>;
        async fn add_tech(&self, round_id: &Uuid, detail: &NewTechRound) -> Result<TechRound, AppError>;
        async fn add_dsa(&self, round_id: &Uuid, detail: &NewDsaRound) -> Result<DsaRound, AppError>;
        async fn add_hr(&self, round_id: &Uuid, detail: &NewHrRound) -> Result<HrRound, AppError>;
        async fn load_details(&self, round_ids: &[Uuid]) -> Result<RoundDetailSet, AppError>;
    }
}

mock! {
    pub ExperienceRepo {}

    #[async_trait::async_trait]
    impl ExperienceRepository for ExperienceRepo {
        async fn create_with_rounds(
            &self,
            experience: &ExperienceInsert,
            rounds: Vec<NestedRound>,
        ) -> Result<PlacementExperience, AppError>;
        async fn get_experience(&self, id: &Uuid) -> Result<Option<PlacementExperience>, AppError>;
        async fn list_public(
            &self,
            query: &ExperienceListQuery,
            page: PageRequest,
        ) -> Result<Page<PlacementExperience>, AppError>;
        async fn list_for_user(
            &self,
            user_id: &Uuid,
            query: &MyExperienceQuery,
            page: PageRequest,
        ) -> Result<Page<PlacementExperience>, AppError>;
        async fn list_pending(&self, page: PageRequest) -> Result<Page<PlacementExperience>, AppError>;
        async fn moderate(
            &self,
            id: &Uuid,
            status: ExperienceStatus,
            admin_notes: Option<String>,
            reviewer: &Uuid,
        ) -> Result<Option<PlacementExperience>, AppError>;
        async fn update_experience(
            &self,
            id: &Uuid,
            patch: &UpdateExperienceRequest,
        ) -> Result<Option<PlacementExperience>, AppError>;
        async fn deactivate_experience(&self, id: &Uuid) -> Result<bool, AppError>;
        async fn increment_views(&self, id: &Uuid) -> Result<(), AppError>;
        async fn vote_helpful(&self, id: &Uuid) -> Result<Option<PlacementExperience>, AppError>;
    }
}

mock! {
    pub TokenService {}

    impl TokenServiceRepository for TokenService {
        fn create_jwt(&self, user: &User) -> Result<String, AuthError>;
        fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError>;
        fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;
        fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError>;
    }
}
