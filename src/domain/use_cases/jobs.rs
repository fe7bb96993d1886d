use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{policy::Identity, use_cases::distinct_ids},
    entities::{
        company::CompanyBrief,
        job::{Job, JobInsert, JobListQuery, JobWithCompany, NewJobRequest, UpdateJobRequest},
        pagination::{PageRequest, Pagination},
    },
    errors::{AppError, FieldError},
    repositories::{company::CompanyRepository, job::JobRepository},
    utils::valid_uuid::valid_uuid,
};

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

pub struct JobHandler<J, C>
where
    J: JobRepository,
    C: CompanyRepository,
{
    pub job_repo: J,
    pub company_repo: C,
}

impl<J, C> JobHandler<J, C>
where
    J: JobRepository,
    C: CompanyRepository,
{
    pub fn new(job_repo: J, company_repo: C) -> Self {
        JobHandler { job_repo, company_repo }
    }

    async fn with_companies(&self, jobs: Vec<Job>) -> Result<Vec<JobWithCompany>, AppError> {
        let company_ids = distinct_ids(jobs.iter().map(|j| j.company_id));
        let companies: HashMap<Uuid, CompanyBrief> = self
            .company_repo
            .company_briefs(&company_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(jobs
            .into_iter()
            .map(|job| {
                let company = companies.get(&job.company_id).cloned();
                JobWithCompany { job, company }
            })
            .collect())
    }

    /// Active jobs, newest first, each with its company card.
    pub async fn list_jobs(&self, query: &JobListQuery) -> Result<(Vec<JobWithCompany>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let jobs = self.job_repo.list_jobs(query, page).await?;
        let pagination = Pagination::new(page, jobs.total);

        Ok((self.with_companies(jobs.rows).await?, pagination))
    }

    /// Inactive jobs are only visible to admins.
    pub async fn get_job(&self, id: &str, viewer: Option<&Identity>) -> Result<JobWithCompany, AppError> {
        let job_id = valid_uuid(id)?;
        let job = self.job_repo.get_job(&job_id).await?.ok_or_else(job_not_found)?;

        if !job.is_active && !viewer.is_some_and(Identity::is_admin) {
            return Err(job_not_found());
        }

        let mut jobs = self.with_companies(vec![job]).await?;
        jobs.pop().ok_or_else(job_not_found)
    }

    pub async fn create_job(&self, request: NewJobRequest) -> Result<Job, AppError> {
        request.validate()?;

        match self.company_repo.get_company(&request.company_id).await? {
            Some(company) if company.is_active => {}
            _ => return Err(AppError::NotFound("Company not found".to_string())),
        }

        let insert = JobInsert::from(request);
        let job = self.job_repo.create_job(&insert).await?;

        tracing::info!(job_id = %job.id, company_id = %job.company_id, "Job created");
        Ok(job)
    }

    pub async fn update_job(&self, id: &str, request: UpdateJobRequest) -> Result<Job, AppError> {
        request.validate()?;
        let job_id = valid_uuid(id)?;

        let current = self.job_repo.get_job(&job_id).await?.ok_or_else(job_not_found)?;
        let salary_min = request.salary_min.or(current.salary_min);
        let salary_max = request.salary_max.or(current.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(AppError::ValidationError(vec![FieldError {
                    field: "salaryMin".to_string(),
                    message: "Minimum salary cannot exceed maximum salary".to_string(),
                }]));
            }
        }

        self.job_repo
            .update_job(&job_id, &request)
            .await?
            .ok_or_else(job_not_found)
    }

    pub async fn delete_job(&self, id: &str) -> Result<(), AppError> {
        let job_id = valid_uuid(id)?;
        if !self.job_repo.deactivate_job(&job_id).await? {
            return Err(job_not_found());
        }
        Ok(())
    }
}
