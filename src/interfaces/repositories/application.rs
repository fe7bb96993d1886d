use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    entities::{
        application::{
            Application, ApplicationInsert, ApplicationListQuery, ApplicationStatus, UpdateApplicationRequest,
        },
        pagination::{Page, PageRequest},
    },
    errors::AppError,
    repositories::sqlx_repo::{push_search, search_term, SqlxApplicationRepo, UpdateBuilder},
};

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn find_by_user_and_job(&self, user_id: &Uuid, job_id: &Uuid) -> Result<Option<Application>, AppError>;
    /// Inserts the application and bumps the job's `total_applications` atomically.
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

impl SqlxApplicationRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxApplicationRepo { pool }
    }
}

const SEARCH_COLUMNS: [&str; 3] = ["tracking_id", "cover_letter", "notes"];

fn push_application_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &ApplicationListQuery) {
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(job_id) = query.job_id {
        builder.push(" AND job_id = ").push_bind(job_id);
    }
    if let Some(company_id) = query.company_id {
        builder.push(" AND company_id = ").push_bind(company_id);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(builder, &SEARCH_COLUMNS, term);
    }
}

impl SqlxApplicationRepo {
    async fn fetch_page(
        &self,
        owner: Option<Uuid>,
        query: &ApplicationListQuery,
        page: PageRequest,
    ) -> Result<Page<Application>, AppError> {
        let scoped = |select: &str| {
            let mut builder: QueryBuilder<'static, Postgres> =
                QueryBuilder::new(format!("{} FROM applications WHERE is_active = TRUE", select));
            if let Some(user_id) = owner {
                builder.push(" AND user_id = ").push_bind(user_id);
            }
            push_application_filters(&mut builder, query);
            builder
        };

        let mut count = scoped("SELECT COUNT(*)");
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut builder = scoped("SELECT *");
        builder.push(" ORDER BY application_date DESC");
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder.build_query_as::<Application>().fetch_all(&self.pool).await?;

        Ok(Page { rows, total })
    }
}

#[async_trait]
impl ApplicationRepository for SqlxApplicationRepo {
    async fn find_by_user_and_job(&self, user_id: &Uuid, job_id: &Uuid) -> Result<Option<Application>, AppError> {
        let application = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn create_application(&self, application: &ApplicationInsert) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                user_id, job_id, company_id, resume_version, cover_letter,
                expected_salary, availability_date, notes, tracking_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(application.user_id)
        .bind(application.job_id)
        .bind(application.company_id)
        .bind(&application.resume_version)
        .bind(&application.cover_letter)
        .bind(application.expected_salary)
        .bind(application.availability_date)
        .bind(&application.notes)
        .bind(&application.tracking_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("You have already applied for this job".to_string())
            }
            _ => AppError::from(e),
        })?;

        sqlx::query("UPDATE jobs SET total_applications = total_applications + 1 WHERE id = $1")
            .bind(application.job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_application(&self, id: &Uuid) -> Result<Option<Application>, AppError> {
        let application = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(application)
    }

    async fn list_for_user(
        &self,
        user_id: &Uuid,
        query: &ApplicationListQuery,
        page: PageRequest,
    ) -> Result<Page<Application>, AppError> {
        self.fetch_page(Some(*user_id), query, page).await
    }

    async fn list_applications(&self, query: &ApplicationListQuery, page: PageRequest) -> Result<Page<Application>, AppError> {
        self.fetch_page(None, query, page).await
    }

    async fn all_for_user(&self, user_id: &Uuid) -> Result<Vec<Application>, AppError> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY application_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn update_application(
        &self,
        id: &Uuid,
        patch: &UpdateApplicationRequest,
    ) -> Result<Option<Application>, AppError> {
        let mut update = UpdateBuilder::new("applications");
        update
            .raw("last_updated = NOW()")
            .patch("cover_letter", &patch.cover_letter)
            .set("expected_salary", patch.expected_salary)
            .set("availability_date", patch.availability_date)
            .patch("notes", &patch.notes)
            .patch("resume_version", &patch.resume_version);

        let mut builder = update.where_id(*id);
        let application = builder.build_query_as::<Application>().fetch_optional(&self.pool).await?;

        Ok(application)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<Option<Application>, AppError> {
        let mut update = UpdateBuilder::new("applications");
        update
            .raw("last_updated = NOW()")
            .set("status", Some(status))
            .set("notes", notes);

        let mut builder = update.where_id(*id);
        let application = builder.build_query_as::<Application>().fetch_optional(&self.pool).await?;

        Ok(application)
    }

    async fn withdraw_application(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE applications SET is_active = FALSE, last_updated = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
