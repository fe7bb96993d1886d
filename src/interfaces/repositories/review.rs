use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    entities::{
        pagination::{Page, PageRequest, SortOrder},
        review::{Review, ReviewInsert, ReviewListQuery, UpdateReviewRequest},
    },
    errors::AppError,
    repositories::sqlx_repo::{push_search, search_term, SqlxReviewRepo, UpdateBuilder},
};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn review_exists(&self, user_id: &Uuid, company_id: &Uuid) -> Result<bool, AppError>;
    async fn create_review(&self, review: &ReviewInsert) -> Result<Review, AppError>;
    async fn get_review(&self, id: &Uuid) -> Result<Option<Review>, AppError>;
    async fn list_for_company(
        &self,
        company_id: &Uuid,
        query: &ReviewListQuery,
        page: PageRequest,
    ) -> Result<Page<Review>, AppError>;
    /// All of a user's reviews, inactive ones included.
    async fn list_for_user(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<Review>, AppError>;
    async fn all_for_user(&self, user_id: &Uuid) -> Result<Vec<Review>, AppError>;
    async fn active_for_company(&self, company_id: &Uuid) -> Result<Vec<Review>, AppError>;
    async fn update_review(&self, id: &Uuid, patch: &UpdateReviewRequest) -> Result<Option<Review>, AppError>;
    async fn deactivate_review(&self, id: &Uuid) -> Result<bool, AppError>;
    /// Only active reviews are counted; `None` when no active review matched.
    async fn increment_helpful(&self, id: &Uuid) -> Result<Option<Review>, AppError>;
    async fn increment_report(&self, id: &Uuid) -> Result<Option<Review>, AppError>;
}

impl SqlxReviewRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxReviewRepo { pool }
    }

    async fn increment(&self, id: &Uuid, column: &str) -> Result<Option<Review>, AppError> {
        let sql = format!(
            "UPDATE reviews SET {column} = {column} + 1 WHERE id = $1 AND is_active = TRUE RETURNING *"
        );
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }
}

const SEARCH_COLUMNS: [&str; 3] = ["title", "description", "job_role"];

fn push_review_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &ReviewListQuery) {
    if let Some(difficulty) = query.difficulty {
        builder.push(" AND interview_difficulty = ").push_bind(difficulty);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(builder, &SEARCH_COLUMNS, term);
    }
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepo {
    async fn review_exists(&self, user_id: &Uuid, company_id: &Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND company_id = $2)",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_review(&self, review: &ReviewInsert) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                user_id, company_id, job_role, interview_date, overall_rating,
                interview_difficulty, interview_experience, title, description,
                pros, cons, technical_questions, hr_questions, interview_rounds,
                tips, result, salary_offered, would_recommend, is_anonymous
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(review.user_id)
        .bind(review.company_id)
        .bind(&review.job_role)
        .bind(review.interview_date)
        .bind(review.overall_rating)
        .bind(review.interview_difficulty)
        .bind(review.interview_experience)
        .bind(&review.title)
        .bind(&review.description)
        .bind(&review.pros)
        .bind(&review.cons)
        .bind(&review.technical_questions)
        .bind(&review.hr_questions)
        .bind(review.interview_rounds)
        .bind(&review.tips)
        .bind(review.result)
        .bind(review.salary_offered)
        .bind(review.would_recommend)
        .bind(review.is_anonymous)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("You have already reviewed this company".to_string())
            }
            _ => AppError::from(e),
        })
    }

    async fn get_review(&self, id: &Uuid) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn list_for_company(
        &self,
        company_id: &Uuid,
        query: &ReviewListQuery,
        page: PageRequest,
    ) -> Result<Page<Review>, AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM reviews WHERE is_active = TRUE AND company_id = ");
        count.push_bind(*company_id);
        push_review_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let sort_by = query.sort_by.unwrap_or_default();
        let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

        let mut builder = QueryBuilder::new("SELECT * FROM reviews WHERE is_active = TRUE AND company_id = ");
        builder.push_bind(*company_id);
        push_review_filters(&mut builder, query);
        builder
            .push(" ORDER BY ")
            .push(sort_by.column())
            .push(" ")
            .push(sort_order.as_sql())
            .push(", id ASC");
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder.build_query_as::<Review>().fetch_all(&self.pool).await?;

        Ok(Page { rows, total })
    }

    async fn list_for_user(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<Review>, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { rows, total })
    }

    async fn all_for_user(&self, user_id: &Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn active_for_company(&self, company_id: &Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE company_id = $1 AND is_active = TRUE ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn update_review(&self, id: &Uuid, patch: &UpdateReviewRequest) -> Result<Option<Review>, AppError> {
        let mut update = UpdateBuilder::new("reviews");
        update
            .set("job_role", patch.job_role.as_deref().map(|s| s.trim().to_string()))
            .set("interview_date", patch.interview_date)
            .set("overall_rating", patch.overall_rating)
            .set("interview_difficulty", patch.interview_difficulty)
            .set("interview_experience", patch.interview_experience)
            .set("title", patch.title.as_deref().map(|s| s.trim().to_string()))
            .set("description", patch.description.clone())
            .patch_list("pros", &patch.pros)
            .patch_list("cons", &patch.cons)
            .patch_list("technical_questions", &patch.technical_questions)
            .patch_list("hr_questions", &patch.hr_questions)
            .set("interview_rounds", patch.interview_rounds)
            .patch("tips", &patch.tips)
            .set("result", patch.result)
            .set("salary_offered", patch.salary_offered)
            .set("would_recommend", patch.would_recommend)
            .set("is_anonymous", patch.is_anonymous);

        let mut builder = update.where_id(*id);
        let review = builder.build_query_as::<Review>().fetch_optional(&self.pool).await?;

        Ok(review)
    }

    async fn deactivate_review(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE reviews SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_helpful(&self, id: &Uuid) -> Result<Option<Review>, AppError> {
        self.increment(id, "helpful_votes").await
    }

    async fn increment_report(&self, id: &Uuid) -> Result<Option<Review>, AppError> {
        self.increment(id, "report_count").await
    }
}
