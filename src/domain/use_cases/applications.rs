use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::APPLICATION_TRACKING_PREFIX,
    domain::{
        policy::{ensure_owner_or_admin, Identity},
        use_cases::distinct_ids,
    },
    entities::{
        application::{
            Application, ApplicationInsert, ApplicationListQuery, ApplicationView, NewApplicationRequest,
            UpdateApplicationRequest, UpdateApplicationStatusRequest,
        },
        company::CompanyBrief,
        job::JobBrief,
        pagination::{Page, PageRequest, Pagination},
        user::User,
    },
    errors::AppError,
    repositories::{application::ApplicationRepository, company::CompanyRepository, job::JobRepository},
    utils::{tracking_id::generate_tracking_id, valid_uuid::valid_uuid},
};

fn application_not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

pub struct ApplicationHandler<A, J, C>
where
    A: ApplicationRepository,
    J: JobRepository,
    C: CompanyRepository,
{
    pub application_repo: A,
    pub job_repo: J,
    pub company_repo: C,
}

impl<A, J, C> ApplicationHandler<A, J, C>
where
    A: ApplicationRepository,
    J: JobRepository,
    C: CompanyRepository,
{
    pub fn new(application_repo: A, job_repo: J, company_repo: C) -> Self {
        ApplicationHandler {
            application_repo,
            job_repo,
            company_repo,
        }
    }

    async fn with_briefs(&self, applications: Vec<Application>) -> Result<Vec<ApplicationView>, AppError> {
        let job_ids = distinct_ids(applications.iter().map(|a| a.job_id));
        let company_ids = distinct_ids(applications.iter().map(|a| a.company_id));

        let jobs: HashMap<Uuid, JobBrief> = self
            .job_repo
            .job_briefs(&job_ids)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();
        let companies: HashMap<Uuid, CompanyBrief> = self
            .company_repo
            .company_briefs(&company_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| ApplicationView {
                job: jobs.get(&application.job_id).cloned(),
                company: companies.get(&application.company_id).cloned(),
                application,
            })
            .collect())
    }

    async fn paged_views(
        &self,
        page: PageRequest,
        applications: Page<Application>,
    ) -> Result<(Vec<ApplicationView>, Pagination), AppError> {
        let pagination = Pagination::new(page, applications.total);
        Ok((self.with_briefs(applications.rows).await?, pagination))
    }

    async fn owned_application(&self, identity: &Identity, id: &str) -> Result<Application, AppError> {
        let application_id = valid_uuid(id)?;
        let application = self
            .application_repo
            .get_application(&application_id)
            .await?
            .ok_or_else(application_not_found)?;

        ensure_owner_or_admin(identity, application.user_id)?;
        Ok(application)
    }

    pub async fn my_applications(
        &self,
        identity: &Identity,
        query: &ApplicationListQuery,
    ) -> Result<(Vec<ApplicationView>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let applications = self
            .application_repo
            .list_for_user(&identity.user_id, query, page)
            .await?;
        self.paged_views(page, applications).await
    }

    pub async fn list_applications(
        &self,
        query: &ApplicationListQuery,
    ) -> Result<(Vec<ApplicationView>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let applications = self.application_repo.list_applications(query, page).await?;
        self.paged_views(page, applications).await
    }

    /// Applies `user` to an active job. One application per user and job.
    pub async fn create_application(
        &self,
        user: &User,
        request: NewApplicationRequest,
    ) -> Result<Application, AppError> {
        request.validate()?;

        let job = match self.job_repo.get_job(&request.job_id).await? {
            Some(job) if job.is_active => job,
            _ => return Err(AppError::NotFound("Job not found or no longer active".to_string())),
        };

        if self
            .application_repo
            .find_by_user_and_job(&user.id, &job.id)
            .await?
            .is_some()
        {
            tracing::warn!(user_id = %user.id, job_id = %job.id, "Duplicate application rejected");
            return Err(AppError::Conflict("You have already applied for this job".to_string()));
        }

        let insert = ApplicationInsert {
            user_id: user.id,
            job_id: job.id,
            company_id: job.company_id,
            resume_version: request.resume_version.or_else(|| user.resume.clone()),
            cover_letter: request.cover_letter,
            expected_salary: request.expected_salary,
            availability_date: request.availability_date,
            notes: request.notes,
            tracking_id: generate_tracking_id(APPLICATION_TRACKING_PREFIX),
        };

        let application = self.application_repo.create_application(&insert).await?;

        tracing::info!(
            application_id = %application.id,
            tracking_id = %application.tracking_id,
            "Application submitted"
        );
        Ok(application)
    }

    pub async fn get_application(&self, identity: &Identity, id: &str) -> Result<ApplicationView, AppError> {
        let application = self.owned_application(identity, id).await?;
        let mut views = self.with_briefs(vec![application]).await?;
        views.pop().ok_or_else(application_not_found)
    }

    pub async fn update_application(
        &self,
        identity: &Identity,
        id: &str,
        request: UpdateApplicationRequest,
    ) -> Result<Application, AppError> {
        request.validate()?;
        let application = self.owned_application(identity, id).await?;

        self.application_repo
            .update_application(&application.id, &request)
            .await?
            .ok_or_else(application_not_found)
    }

    /// Moves an application along the hiring pipeline.
    pub async fn update_status(
        &self,
        id: &str,
        request: UpdateApplicationStatusRequest,
    ) -> Result<Application, AppError> {
        request.validate()?;
        let application_id = valid_uuid(id)?;

        let application = self
            .application_repo
            .get_application(&application_id)
            .await?
            .ok_or_else(application_not_found)?;

        if !application.status.can_transition_to(request.status) {
            return Err(AppError::BadRequest(format!(
                "Cannot change application status from {} to {}",
                status_label(&application.status),
                status_label(&request.status)
            )));
        }

        let updated = self
            .application_repo
            .update_status(&application_id, request.status, request.notes)
            .await?
            .ok_or_else(application_not_found)?;

        tracing::info!(application_id = %updated.id, status = %status_label(&updated.status), "Application status updated");
        Ok(updated)
    }

    pub async fn withdraw_application(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
        let application = self.owned_application(identity, id).await?;
        if !self.application_repo.withdraw_application(&application.id).await? {
            return Err(application_not_found());
        }
        Ok(())
    }
}

fn status_label<T: serde::Serialize>(status: &T) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
