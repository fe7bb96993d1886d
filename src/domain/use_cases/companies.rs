use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{policy::Identity, use_cases::distinct_ids},
    entities::{
        company::{
            Company, CompanyDetail, CompanyInsert, CompanyListQuery, CompanyStats, CompanyWithJobs,
            NewCompanyRequest, UpdateCompanyRequest,
        },
        job::Job,
        pagination::{PageRequest, Pagination},
        review::ReviewView,
        user::UserSummary,
    },
    errors::AppError,
    repositories::{
        company::CompanyRepository, job::JobRepository, review::ReviewRepository, user::UserRepository,
    },
    utils::valid_uuid::valid_uuid,
};

fn company_not_found() -> AppError {
    AppError::NotFound("Company not found".to_string())
}

pub struct CompanyHandler<C, J, R, U>
where
    C: CompanyRepository,
    J: JobRepository,
    R: ReviewRepository,
    U: UserRepository,
{
    pub company_repo: C,
    pub job_repo: J,
    pub review_repo: R,
    pub user_repo: U,
}

impl<C, J, R, U> CompanyHandler<C, J, R, U>
where
    C: CompanyRepository,
    J: JobRepository,
    R: ReviewRepository,
    U: UserRepository,
{
    pub fn new(company_repo: C, job_repo: J, review_repo: R, user_repo: U) -> Self {
        CompanyHandler {
            company_repo,
            job_repo,
            review_repo,
            user_repo,
        }
    }

    /// Active companies, each with its active jobs.
    pub async fn list_companies(
        &self,
        query: &CompanyListQuery,
    ) -> Result<(Vec<CompanyWithJobs>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let companies = self.company_repo.list_companies(query, page).await?;
        let pagination = Pagination::new(page, companies.total);

        let ids: Vec<Uuid> = companies.rows.iter().map(|c| c.id).collect();
        let mut jobs_by_company: HashMap<Uuid, Vec<Job>> = HashMap::new();
        for job in self.job_repo.active_jobs_for_companies(&ids).await? {
            jobs_by_company.entry(job.company_id).or_default().push(job);
        }

        let rows = companies
            .rows
            .into_iter()
            .map(|company| {
                let jobs = jobs_by_company.remove(&company.id).unwrap_or_default();
                CompanyWithJobs { company, jobs }
            })
            .collect();

        Ok((rows, pagination))
    }

    /// Inactive companies are only visible to admins.
    async fn visible_company(&self, id: &str, viewer: Option<&Identity>) -> Result<Company, AppError> {
        let company_id = valid_uuid(id)?;
        let company = self
            .company_repo
            .get_company(&company_id)
            .await?
            .ok_or_else(company_not_found)?;

        if !company.is_active && !viewer.is_some_and(Identity::is_admin) {
            return Err(company_not_found());
        }
        Ok(company)
    }

    pub async fn get_company(&self, id: &str, viewer: Option<&Identity>) -> Result<CompanyDetail, AppError> {
        let company = self.visible_company(id, viewer).await?;
        let company_id = company.id;

        let jobs = self.job_repo.active_jobs_for_companies(&[company_id]).await?;
        let reviews = self.review_repo.active_for_company(&company_id).await?;

        let author_ids = distinct_ids(reviews.iter().map(|r| r.user_id));
        let authors: HashMap<Uuid, UserSummary> = self
            .user_repo
            .user_summaries(&author_ids, false)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let reviews = reviews
            .into_iter()
            .map(|review| {
                let author = authors.get(&review.user_id).cloned();
                ReviewView::project(review, author, viewer)
            })
            .collect();

        Ok(CompanyDetail { company, jobs, reviews })
    }

    pub async fn company_stats(&self, id: &str, viewer: Option<&Identity>) -> Result<CompanyStats, AppError> {
        let company = self.visible_company(id, viewer).await?;
        self.company_repo
            .company_stats(&company.id)
            .await?
            .ok_or_else(company_not_found)
    }

    pub async fn create_company(&self, request: NewCompanyRequest) -> Result<Company, AppError> {
        request.validate()?;

        let insert = CompanyInsert::from(request);
        let company = self.company_repo.create_company(&insert).await?;

        tracing::info!(company_id = %company.id, "Company created");
        Ok(company)
    }

    pub async fn update_company(&self, id: &str, request: UpdateCompanyRequest) -> Result<Company, AppError> {
        request.validate()?;
        let company_id = valid_uuid(id)?;

        self.company_repo
            .update_company(&company_id, &request)
            .await?
            .ok_or_else(company_not_found)
    }

    pub async fn delete_company(&self, id: &str) -> Result<(), AppError> {
        let company_id = valid_uuid(id)?;
        if !self.company_repo.deactivate_company(&company_id).await? {
            return Err(company_not_found());
        }

        tracing::info!(company_id = %company_id, "Company deactivated");
        Ok(())
    }
}
