use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgConnection, PgPool};

use crate::{
    entities::{
        common::Difficulty,
        round::{
            AptitudeRound, DsaRound, HrRound, InterviewMode, NewAptitudeRound, NewDsaRound, NewHrRound,
            NewTechRound, Round, RoundDetail, RoundDetailSet, RoundInsert, TechRound, UpdateRoundRequest,
            DEFAULT_PROGRAMMING_LANGUAGE,
        },
    },
    errors::AppError,
    repositories::sqlx_repo::{SqlxRoundRepo, UpdateBuilder},
};

#[async_trait]
pub trait RoundRepository: Send + Sync {
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
    /// Detail rows of every kind for the given rounds.
    async fn load_details(&self, round_ids: &[Uuid]) -> Result<RoundDetailSet, AppError>;
}

impl SqlxRoundRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxRoundRepo { pool }
    }
}

// ───── Shared SQL ────────────────────────────────────────────────────
//
// Plain functions over a connection so the experience repository can reuse
// them inside its transaction.

pub(crate) async fn insert_round(conn: &mut PgConnection, round: &RoundInsert) -> Result<Round, sqlx::Error> {
    sqlx::query_as::<_, Round>(
        r#"
        INSERT INTO rounds (
            company_id, user_id, job_id, experience_id, job_role, application_date,
            status, current_round, total_rounds, package, notes
        )
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(round.company_id)
    .bind(round.user_id)
    .bind(round.job_id)
    .bind(round.experience_id)
    .bind(&round.job_role)
    .bind(round.application_date)
    .bind(round.status)
    .bind(round.current_round)
    .bind(round.total_rounds)
    .bind(round.package)
    .bind(&round.notes)
    .fetch_one(conn)
    .await
}

pub(crate) async fn insert_aptitude(
    conn: &mut PgConnection,
    round_id: Uuid,
    detail: &NewAptitudeRound,
) -> Result<AptitudeRound, sqlx::Error> {
    sqlx::query_as::<_, AptitudeRound>(
        r#"
        INSERT INTO aptitude_rounds (
            round_id, round_number, date, duration, total_questions, attempted_questions,
            correct_answers, topics, difficulty, platform, result, score, cutoff_score,
            feedback, tips, is_negative_marking
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(round_id)
    .bind(detail.round_number.unwrap_or(1))
    .bind(detail.date)
    .bind(detail.duration)
    .bind(detail.total_questions)
    .bind(detail.attempted_questions)
    .bind(detail.correct_answers)
    .bind(&detail.topics)
    .bind(detail.difficulty.unwrap_or_default())
    .bind(&detail.platform)
    .bind(detail.result.unwrap_or_default())
    .bind(detail.score)
    .bind(detail.cutoff_score)
    .bind(&detail.feedback)
    .bind(&detail.tips)
    .bind(detail.is_negative_marking)
    .fetch_one(conn)
    .await
}

pub(crate) async fn insert_tech(
    conn: &mut PgConnection,
    round_id: Uuid,
    detail: &NewTechRound,
) -> Result<TechRound, sqlx::Error> {
    sqlx::query_as::<_, TechRound>(
        r#"
        INSERT INTO tech_rounds (
            round_id, round_number, date, duration, interview_type, interviewer_name,
            interviewer_position, topics, technical_skills, questions_asked, difficulty,
            result, performance, feedback, tips, code_submitted, platform
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(round_id)
    .bind(detail.round_number.unwrap_or(1))
    .bind(detail.date)
    .bind(detail.duration)
    .bind(detail.interview_type.unwrap_or(InterviewMode::Video))
    .bind(&detail.interviewer_name)
    .bind(&detail.interviewer_position)
    .bind(&detail.topics)
    .bind(&detail.technical_skills)
    .bind(&detail.questions_asked)
    .bind(detail.difficulty.unwrap_or_default())
    .bind(detail.result.unwrap_or_default())
    .bind(detail.performance.unwrap_or_default())
    .bind(&detail.feedback)
    .bind(&detail.tips)
    .bind(&detail.code_submitted)
    .bind(&detail.platform)
    .fetch_one(conn)
    .await
}

pub(crate) async fn insert_dsa(
    conn: &mut PgConnection,
    round_id: Uuid,
    detail: &NewDsaRound,
) -> Result<DsaRound, sqlx::Error> {
    sqlx::query_as::<_, DsaRound>(
        r#"
        INSERT INTO dsa_rounds (
            round_id, round_number, date, duration, interview_type, platform,
            total_problems, solved_problems, problems, topics, difficulty,
            programming_language, result, score, time_complexity, space_complexity,
            code_submitted, feedback, tips, interviewer_name
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        RETURNING *
        "#,
    )
    .bind(round_id)
    .bind(detail.round_number.unwrap_or(1))
    .bind(detail.date)
    .bind(detail.duration)
    .bind(detail.interview_type.unwrap_or(InterviewMode::CodingTest))
    .bind(&detail.platform)
    .bind(detail.total_problems)
    .bind(detail.solved_problems)
    .bind(&detail.problems)
    .bind(&detail.topics)
    .bind(detail.difficulty.unwrap_or(Difficulty::Medium))
    .bind(
        detail
            .programming_language
            .clone()
            .unwrap_or_else(|| DEFAULT_PROGRAMMING_LANGUAGE.to_string()),
    )
    .bind(detail.result.unwrap_or_default())
    .bind(detail.score)
    .bind(&detail.time_complexity)
    .bind(&detail.space_complexity)
    .bind(&detail.code_submitted)
    .bind(&detail.feedback)
    .bind(&detail.tips)
    .bind(&detail.interviewer_name)
    .fetch_one(conn)
    .await
}

pub(crate) async fn insert_hr(
    conn: &mut PgConnection,
    round_id: Uuid,
    detail: &NewHrRound,
) -> Result<HrRound, sqlx::Error> {
    sqlx::query_as::<_, HrRound>(
        r#"
        INSERT INTO hr_rounds (
            round_id, round_number, date, duration, interview_type, interviewer_name,
            interviewer_position, questions_asked, topics, difficulty, result, performance,
            feedback, tips, company_values, cultural_fit, communication, salary_discussed,
            salary_expectation, negotiation_status, platform
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
        RETURNING *
        "#,
    )
    .bind(round_id)
    .bind(detail.round_number.unwrap_or(1))
    .bind(detail.date)
    .bind(detail.duration)
    .bind(detail.interview_type.unwrap_or(InterviewMode::Video))
    .bind(&detail.interviewer_name)
    .bind(&detail.interviewer_position)
    .bind(&detail.questions_asked)
    .bind(&detail.topics)
    .bind(detail.difficulty.unwrap_or_default())
    .bind(detail.result.unwrap_or_default())
    .bind(detail.performance.unwrap_or_default())
    .bind(&detail.feedback)
    .bind(&detail.tips)
    .bind(&detail.company_values)
    .bind(detail.cultural_fit.unwrap_or_default())
    .bind(detail.communication.unwrap_or_default())
    .bind(detail.salary_discussed)
    .bind(detail.salary_expectation)
    .bind(detail.negotiation_status.unwrap_or_default())
    .bind(&detail.platform)
    .fetch_one(conn)
    .await
}

pub(crate) async fn insert_detail(
    conn: &mut PgConnection,
    round_id: Uuid,
    detail: &RoundDetail,
) -> Result<(), sqlx::Error> {
    match detail {
        RoundDetail::Aptitude(d) => insert_aptitude(conn, round_id, d).await.map(|_| ()),
        RoundDetail::Tech(d) => insert_tech(conn, round_id, d).await.map(|_| ()),
        RoundDetail::Dsa(d) => insert_dsa(conn, round_id, d).await.map(|_| ()),
        RoundDetail::Hr(d) => insert_hr(conn, round_id, d).await.map(|_| ()),
    }
}

#[async_trait]
impl RoundRepository for SqlxRoundRepo {
    async fn create_round(&self, round: &RoundInsert) -> Result<Round, AppError> {
        let mut conn = self.pool.acquire().await?;
        let round = insert_round(&mut *conn, round).await?;
        Ok(round)
    }

    async fn get_round(&self, id: &Uuid) -> Result<Option<Round>, AppError> {
        let round = sqlx::query_as::<_, Round>("SELECT * FROM rounds WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(round)
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Round>, AppError> {
        let rounds = sqlx::query_as::<_, Round>(
            "SELECT * FROM rounds WHERE user_id = $1 AND is_active = TRUE ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rounds)
    }

    async fn rounds_for_experiences(&self, experience_ids: &[Uuid]) -> Result<Vec<Round>, AppError> {
        if experience_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rounds = sqlx::query_as::<_, Round>(
            r#"
            SELECT * FROM rounds
            WHERE experience_id = ANY($1) AND is_active = TRUE
            ORDER BY application_date ASC, created_at ASC
            "#,
        )
        .bind(experience_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rounds)
    }

    async fn update_round(&self, id: &Uuid, patch: &UpdateRoundRequest) -> Result<Option<Round>, AppError> {
        let mut update = UpdateBuilder::new("rounds");
        update
            .set("job_role", patch.job_role.as_deref().map(|s| s.trim().to_string()))
            .set("application_date", patch.application_date)
            .set("status", patch.status)
            .set("current_round", patch.current_round)
            .set("total_rounds", patch.total_rounds)
            .set("package", patch.package)
            .patch("notes", &patch.notes);

        let mut builder = update.where_id(*id);
        let round = builder.build_query_as::<Round>().fetch_optional(&self.pool).await?;

        Ok(round)
    }

    async fn deactivate_round(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE rounds SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_aptitude(&self, round_id: &Uuid, detail: &NewAptitudeRound) -> Result<AptitudeRound, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_aptitude(&mut *conn, *round_id, detail).await?)
    }

    async fn add_tech(&self, round_id: &Uuid, detail: &NewTechRound) -> Result<TechRound, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_tech(&mut *conn, *round_id, detail).await?)
    }

    async fn add_dsa(&self, round_id: &Uuid, detail: &NewDsaRound) -> Result<DsaRound, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_dsa(&mut *conn, *round_id, detail).await?)
    }

    async fn add_hr(&self, round_id: &Uuid, detail: &NewHrRound) -> Result<HrRound, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_hr(&mut *conn, *round_id, detail).await?)
    }

    async fn load_details(&self, round_ids: &[Uuid]) -> Result<RoundDetailSet, AppError> {
        if round_ids.is_empty() {
            return Ok(RoundDetailSet::default());
        }

        let aptitude = sqlx::query_as::<_, AptitudeRound>(
            "SELECT * FROM aptitude_rounds WHERE round_id = ANY($1) ORDER BY round_number, date",
        )
        .bind(round_ids)
        .fetch_all(&self.pool)
        .await?;

        let tech = sqlx::query_as::<_, TechRound>(
            "SELECT * FROM tech_rounds WHERE round_id = ANY($1) ORDER BY round_number, date",
        )
        .bind(round_ids)
        .fetch_all(&self.pool)
        .await?;

        let dsa = sqlx::query_as::<_, DsaRound>(
            "SELECT * FROM dsa_rounds WHERE round_id = ANY($1) ORDER BY round_number, date",
        )
        .bind(round_ids)
        .fetch_all(&self.pool)
        .await?;

        let hr = sqlx::query_as::<_, HrRound>(
            "SELECT * FROM hr_rounds WHERE round_id = ANY($1) ORDER BY round_number, date",
        )
        .bind(round_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(RoundDetailSet { aptitude, tech, dsa, hr })
    }
}
