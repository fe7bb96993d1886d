use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    entities::{
        company::{Company, CompanyBrief, CompanyInsert, CompanyListQuery, CompanyStats, UpdateCompanyRequest},
        pagination::{Page, PageRequest},
    },
    errors::AppError,
    repositories::sqlx_repo::{push_search, search_term, SqlxCompanyRepo, UpdateBuilder},
};

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn list_companies(&self, query: &CompanyListQuery, page: PageRequest) -> Result<Page<Company>, AppError>;
    async fn get_company(&self, id: &Uuid) -> Result<Option<Company>, AppError>;
    async fn create_company(&self, company: &CompanyInsert) -> Result<Company, AppError>;
    async fn update_company(&self, id: &Uuid, patch: &UpdateCompanyRequest) -> Result<Option<Company>, AppError>;
    async fn deactivate_company(&self, id: &Uuid) -> Result<bool, AppError>;
    async fn company_stats(&self, id: &Uuid) -> Result<Option<CompanyStats>, AppError>;
    async fn company_briefs(&self, ids: &[Uuid]) -> Result<Vec<CompanyBrief>, AppError>;
    /// Recomputes `average_rating` and `total_reviews` from the active reviews.
    async fn refresh_rating(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxCompanyRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxCompanyRepo { pool }
    }
}

const SEARCH_COLUMNS: [&str; 3] = ["name", "description", "industry"];

fn push_company_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &CompanyListQuery) {
    if let Some(industry) = query.industry.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        builder.push(" AND industry = ").push_bind(industry.to_string());
    }
    if let Some(company_type) = query.company_type {
        builder.push(" AND company_type = ").push_bind(company_type);
    }
    if let Some(tier) = query.tier {
        builder.push(" AND tier = ").push_bind(tier);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(builder, &SEARCH_COLUMNS, term);
    }
}

fn map_name_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Company with this name already exists".to_string())
        }
        _ => AppError::from(e),
    }
}

#[async_trait]
impl CompanyRepository for SqlxCompanyRepo {
    async fn list_companies(&self, query: &CompanyListQuery, page: PageRequest) -> Result<Page<Company>, AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM companies WHERE is_active = TRUE");
        push_company_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let sort_by = query.sort_by.unwrap_or_default();
        let sort_order = query.sort_order.unwrap_or_default();

        let mut builder = QueryBuilder::new("SELECT * FROM companies WHERE is_active = TRUE");
        push_company_filters(&mut builder, query);
        builder
            .push(" ORDER BY ")
            .push(sort_by.column())
            .push(" ")
            .push(sort_order.as_sql())
            .push(", id ASC");
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder.build_query_as::<Company>().fetch_all(&self.pool).await?;

        Ok(Page { rows, total })
    }

    async fn get_company(&self, id: &Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    async fn create_company(&self, company: &CompanyInsert) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                name, description, industry, website, headquarters,
                employee_count, logo, company_type, tier, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&company.name)
        .bind(&company.description)
        .bind(&company.industry)
        .bind(&company.website)
        .bind(&company.headquarters)
        .bind(company.employee_count)
        .bind(&company.logo)
        .bind(company.company_type)
        .bind(company.tier)
        .bind(&company.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(map_name_conflict)
    }

    async fn update_company(&self, id: &Uuid, patch: &UpdateCompanyRequest) -> Result<Option<Company>, AppError> {
        let mut update = UpdateBuilder::new("companies");
        update
            .set("name", patch.name.as_deref().map(|s| s.trim().to_string()))
            .patch("description", &patch.description)
            .patch("industry", &patch.industry)
            .patch("website", &patch.website)
            .patch("headquarters", &patch.headquarters)
            .patch("employee_count", &patch.employee_count)
            .patch("logo", &patch.logo)
            .set("company_type", patch.company_type)
            .set("tier", patch.tier)
            .patch_list("tags", &patch.tags)
            .set("is_active", patch.is_active);

        let mut builder = update.where_id(*id);
        builder
            .build_query_as::<Company>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_name_conflict)
    }

    async fn deactivate_company(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE companies SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn company_stats(&self, id: &Uuid) -> Result<Option<CompanyStats>, AppError> {
        let stats = sqlx::query_as::<_, CompanyStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM jobs WHERE company_id = c.id AND is_active) AS total_jobs,
                (SELECT COUNT(*) FROM applications WHERE company_id = c.id AND is_active) AS total_applications,
                (SELECT COUNT(*) FROM reviews WHERE company_id = c.id AND is_active) AS total_reviews,
                c.average_rating,
                (SELECT COUNT(*) FROM rounds WHERE company_id = c.id AND is_active) AS total_rounds
            FROM companies c
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn company_briefs(&self, ids: &[Uuid]) -> Result<Vec<CompanyBrief>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let briefs = sqlx::query_as::<_, CompanyBrief>(
            "SELECT id, name, logo, industry FROM companies WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(briefs)
    }

    async fn refresh_rating(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE companies SET
                average_rating = COALESCE((
                    SELECT ROUND(AVG(overall_rating)::numeric, 1)::float8
                    FROM reviews
                    WHERE company_id = $1 AND is_active
                ), 0),
                total_reviews = (
                    SELECT COUNT(*)::int FROM reviews WHERE company_id = $1 AND is_active
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
