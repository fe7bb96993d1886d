use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    entities::{
        experience::{
            ExperienceInsert, ExperienceListQuery, ExperienceStatus, MyExperienceQuery, NestedRound,
            PlacementExperience, UpdateExperienceRequest,
        },
        pagination::{Page, PageRequest},
    },
    errors::AppError,
    repositories::{
        round::{insert_detail, insert_round},
        sqlx_repo::{like_pattern, push_search, search_term, SqlxExperienceRepo, UpdateBuilder},
    },
};

#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    /// Writes the experience, its rounds and their detail rows in one transaction.
    async fn create_with_rounds(
        &self,
        experience: &ExperienceInsert,
        rounds: Vec<NestedRound>,
    ) -> Result<PlacementExperience, AppError>;
    async fn get_experience(&self, id: &Uuid) -> Result<Option<PlacementExperience>, AppError>;
    /// Approved and active experiences, newest first.
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
    /// Pending experiences, oldest first.
    async fn list_pending(&self, page: PageRequest) -> Result<Page<PlacementExperience>, AppError>;
    /// Moves a pending experience to `status`. `None` when it is no longer pending.
    async fn moderate(
        &self,
        id: &Uuid,
        status: ExperienceStatus,
        admin_notes: Option<String>,
        reviewer: &Uuid,
    ) -> Result<Option<PlacementExperience>, AppError>;
    /// Applies only while the record is still pending; `None` otherwise.
    async fn update_experience(
        &self,
        id: &Uuid,
        patch: &UpdateExperienceRequest,
    ) -> Result<Option<PlacementExperience>, AppError>;
    async fn deactivate_experience(&self, id: &Uuid) -> Result<bool, AppError>;
    async fn increment_views(&self, id: &Uuid) -> Result<(), AppError>;
    /// Only approved, active experiences can be voted on.
    async fn vote_helpful(&self, id: &Uuid) -> Result<Option<PlacementExperience>, AppError>;
}

impl SqlxExperienceRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxExperienceRepo { pool }
    }

    async fn fetch_page(
        &self,
        scope: impl Fn(&mut QueryBuilder<'static, Postgres>),
        order: &str,
        page: PageRequest,
    ) -> Result<Page<PlacementExperience>, AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM placement_experiences WHERE is_active = TRUE");
        scope(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::new("SELECT * FROM placement_experiences WHERE is_active = TRUE");
        scope(&mut builder);
        builder.push(" ORDER BY ").push(order);
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder.build_query_as::<PlacementExperience>().fetch_all(&self.pool).await?;

        Ok(Page { rows, total })
    }
}

const SEARCH_COLUMNS: [&str; 3] = ["job_role", "overall_experience", "tips"];

fn push_public_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &ExperienceListQuery) {
    builder.push(" AND status = ").push_bind(ExperienceStatus::Approved);
    if let Some(company_id) = query.company_id {
        builder.push(" AND company_id = ").push_bind(company_id);
    }
    if let Some(job_role) = search_term(&query.job_role) {
        builder.push(" AND job_role ILIKE ").push_bind(like_pattern(job_role));
    }
    if let Some(difficulty) = query.difficulty {
        builder.push(" AND overall_difficulty = ").push_bind(difficulty);
    }
    if let Some(result) = query.placement_result {
        builder.push(" AND placement_result = ").push_bind(result);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(builder, &SEARCH_COLUMNS, term);
    }
}

#[async_trait]
impl ExperienceRepository for SqlxExperienceRepo {
    async fn create_with_rounds(
        &self,
        experience: &ExperienceInsert,
        rounds: Vec<NestedRound>,
    ) -> Result<PlacementExperience, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, PlacementExperience>(
            r#"
            INSERT INTO placement_experiences (
                user_id, company_id, job_role, application_date, placement_result,
                salary_offered, total_rounds, rounds_completed, round_types,
                overall_experience, tips, overall_difficulty, would_recommend,
                is_anonymous, show_salary, tracking_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(experience.user_id)
        .bind(experience.company_id)
        .bind(&experience.job_role)
        .bind(experience.application_date)
        .bind(experience.placement_result)
        .bind(experience.salary_offered)
        .bind(experience.total_rounds)
        .bind(experience.rounds_completed)
        .bind(&experience.round_types)
        .bind(&experience.overall_experience)
        .bind(&experience.tips)
        .bind(experience.overall_difficulty)
        .bind(experience.would_recommend)
        .bind(experience.is_anonymous)
        .bind(experience.show_salary)
        .bind(&experience.tracking_id)
        .fetch_one(&mut *tx)
        .await?;

        for mut nested in rounds {
            nested.round.experience_id = Some(created.id);
            let round = insert_round(&mut *tx, &nested.round).await?;
            if let Some(detail) = &nested.detail {
                insert_detail(&mut *tx, round.id, detail).await?;
            }
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn get_experience(&self, id: &Uuid) -> Result<Option<PlacementExperience>, AppError> {
        let experience = sqlx::query_as::<_, PlacementExperience>("SELECT * FROM placement_experiences WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(experience)
    }

    async fn list_public(
        &self,
        query: &ExperienceListQuery,
        page: PageRequest,
    ) -> Result<Page<PlacementExperience>, AppError> {
        self.fetch_page(|b| push_public_filters(b, query), "created_at DESC", page)
            .await
    }

    async fn list_for_user(
        &self,
        user_id: &Uuid,
        query: &MyExperienceQuery,
        page: PageRequest,
    ) -> Result<Page<PlacementExperience>, AppError> {
        let user_id = *user_id;
        let status = query.status;
        self.fetch_page(
            move |b| {
                b.push(" AND user_id = ").push_bind(user_id);
                if let Some(status) = status {
                    b.push(" AND status = ").push_bind(status);
                }
            },
            "created_at DESC",
            page,
        )
        .await
    }

    async fn list_pending(&self, page: PageRequest) -> Result<Page<PlacementExperience>, AppError> {
        self.fetch_page(
            |b| {
                b.push(" AND status = ").push_bind(ExperienceStatus::Pending);
            },
            "created_at ASC",
            page,
        )
        .await
    }

    async fn moderate(
        &self,
        id: &Uuid,
        status: ExperienceStatus,
        admin_notes: Option<String>,
        reviewer: &Uuid,
    ) -> Result<Option<PlacementExperience>, AppError> {
        let experience = sqlx::query_as::<_, PlacementExperience>(
            r#"
            UPDATE placement_experiences
            SET status = $1,
                admin_notes = COALESCE($2, admin_notes),
                reviewed_by = $3,
                reviewed_at = NOW(),
                updated_at = NOW()
            WHERE id = $4 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(admin_notes)
        .bind(reviewer)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(experience)
    }

    async fn update_experience(
        &self,
        id: &Uuid,
        patch: &UpdateExperienceRequest,
    ) -> Result<Option<PlacementExperience>, AppError> {
        let round_types = patch
            .round_types
            .as_ref()
            .map(|kinds| kinds.iter().map(|k| k.as_str().to_string()).collect::<Vec<String>>());

        let mut update = UpdateBuilder::new("placement_experiences");
        update
            .set("job_role", patch.job_role.as_deref().map(|s| s.trim().to_string()))
            .set("application_date", patch.application_date)
            .set("placement_result", patch.placement_result)
            .set("salary_offered", patch.salary_offered)
            .set("total_rounds", patch.total_rounds)
            .set("round_types", round_types)
            .set("overall_experience", patch.overall_experience.clone())
            .patch("tips", &patch.tips)
            .set("overall_difficulty", patch.overall_difficulty)
            .set("would_recommend", patch.would_recommend)
            .set("is_anonymous", patch.is_anonymous)
            .set("show_salary", patch.show_salary);

        let mut builder = update.where_id_and(*id, "status = 'pending'");
        let experience = builder
            .build_query_as::<PlacementExperience>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(experience)
    }

    async fn deactivate_experience(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE placement_experiences SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE placement_experiences SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn vote_helpful(&self, id: &Uuid) -> Result<Option<PlacementExperience>, AppError> {
        let experience = sqlx::query_as::<_, PlacementExperience>(
            r#"
            UPDATE placement_experiences
            SET helpful_votes = helpful_votes + 1
            WHERE id = $1 AND status = 'approved' AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(experience)
    }
}
