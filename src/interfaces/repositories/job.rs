use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    entities::{
        job::{Job, JobBrief, JobInsert, JobListQuery, UpdateJobRequest},
        pagination::{Page, PageRequest},
    },
    errors::AppError,
    repositories::sqlx_repo::{like_pattern, push_search, search_term, SqlxJobRepo, UpdateBuilder},
};

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn list_jobs(&self, query: &JobListQuery, page: PageRequest) -> Result<Page<Job>, AppError>;
    async fn get_job(&self, id: &Uuid) -> Result<Option<Job>, AppError>;
    async fn create_job(&self, job: &JobInsert) -> Result<Job, AppError>;
    async fn update_job(&self, id: &Uuid, patch: &UpdateJobRequest) -> Result<Option<Job>, AppError>;
    async fn deactivate_job(&self, id: &Uuid) -> Result<bool, AppError>;
    async fn active_jobs_for_companies(&self, company_ids: &[Uuid]) -> Result<Vec<Job>, AppError>;
    async fn job_briefs(&self, ids: &[Uuid]) -> Result<Vec<JobBrief>, AppError>;
}

impl SqlxJobRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxJobRepo { pool }
    }
}

const SEARCH_COLUMNS: [&str; 2] = ["title", "description"];

fn push_job_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &JobListQuery) {
    if let Some(location) = search_term(&query.location) {
        builder.push(" AND location ILIKE ").push_bind(like_pattern(location));
    }
    if let Some(job_type) = query.job_type {
        builder.push(" AND job_type = ").push_bind(job_type);
    }
    if let Some(work_mode) = query.work_mode {
        builder.push(" AND work_mode = ").push_bind(work_mode);
    }
    if let Some(company_id) = query.company_id {
        builder.push(" AND company_id = ").push_bind(company_id);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(builder, &SEARCH_COLUMNS, term);
    }
}

#[async_trait]
impl JobRepository for SqlxJobRepo {
    async fn list_jobs(&self, query: &JobListQuery, page: PageRequest) -> Result<Page<Job>, AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE is_active = TRUE");
        push_job_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::new("SELECT * FROM jobs WHERE is_active = TRUE");
        push_job_filters(&mut builder, query);
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder.build_query_as::<Job>().fetch_all(&self.pool).await?;

        Ok(Page { rows, total })
    }

    async fn get_job(&self, id: &Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    async fn create_job(&self, job: &JobInsert) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                company_id, title, description, requirements, responsibilities,
                skills_required, location, job_type, work_mode, experience,
                salary_min, salary_max, application_deadline, cgpa_requirement,
                eligible_branches, eligible_graduation_years
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(job.company_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.responsibilities)
        .bind(&job.skills_required)
        .bind(&job.location)
        .bind(job.job_type)
        .bind(job.work_mode)
        .bind(&job.experience)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(job.application_deadline)
        .bind(job.cgpa_requirement)
        .bind(&job.eligible_branches)
        .bind(&job.eligible_graduation_years)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    async fn update_job(&self, id: &Uuid, patch: &UpdateJobRequest) -> Result<Option<Job>, AppError> {
        let mut update = UpdateBuilder::new("jobs");
        update
            .set("title", patch.title.as_deref().map(|s| s.trim().to_string()))
            .set("description", patch.description.clone())
            .patch_list("requirements", &patch.requirements)
            .patch_list("responsibilities", &patch.responsibilities)
            .patch_list("skills_required", &patch.skills_required)
            .set("location", patch.location.as_deref().map(|s| s.trim().to_string()))
            .set("job_type", patch.job_type)
            .set("work_mode", patch.work_mode)
            .patch("experience", &patch.experience)
            .set("salary_min", patch.salary_min)
            .set("salary_max", patch.salary_max)
            .set("application_deadline", patch.application_deadline)
            .set("cgpa_requirement", patch.cgpa_requirement)
            .patch_list("eligible_branches", &patch.eligible_branches)
            .patch_list("eligible_graduation_years", &patch.eligible_graduation_years)
            .set("is_active", patch.is_active);

        let mut builder = update.where_id(*id);
        let job = builder.build_query_as::<Job>().fetch_optional(&self.pool).await?;

        Ok(job)
    }

    async fn deactivate_job(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE jobs SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn active_jobs_for_companies(&self, company_ids: &[Uuid]) -> Result<Vec<Job>, AppError> {
        if company_ids.is_empty() {
            return Ok(Vec::new());
        }

        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE company_id = ANY($1) AND is_active = TRUE ORDER BY created_at DESC",
        )
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    async fn job_briefs(&self, ids: &[Uuid]) -> Result<Vec<JobBrief>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let briefs = sqlx::query_as::<_, JobBrief>(
            "SELECT id, title, location, job_type, work_mode FROM jobs WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(briefs)
    }
}
