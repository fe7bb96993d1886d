use async_trait::async_trait;
use uuid::Uuid;
use sqlx::QueryBuilder;

use crate::{
    entities::{
        pagination::{Page, PageRequest},
        user::{UpdateProfileRequest, User, UserInsert, UserListQuery, UserSummary},
    },
    errors::AppError,
    repositories::sqlx_repo::{push_search, search_term, SqlxUserRepo, UpdateBuilder},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError>;
    async fn create_user(&self, user: &UserInsert) -> Result<User, AppError>;
    async fn record_login(&self, id: &Uuid) -> Result<(), AppError>;
    async fn update_profile(&self, id: &Uuid, patch: &UpdateProfileRequest) -> Result<Option<User>, AppError>;
    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), AppError>;
    async fn list_users(&self, query: &UserListQuery, page: PageRequest) -> Result<Page<User>, AppError>;
    /// Author cards for the given ids; `with_email` is for admin views only.
    async fn user_summaries(&self, ids: &[Uuid], with_email: bool) -> Result<Vec<UserSummary>, AppError>;
}

impl SqlxUserRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxUserRepo { pool }
    }
}

const SEARCH_COLUMNS: [&str; 3] = ["first_name", "last_name", "email"];

fn push_user_filters(builder: &mut QueryBuilder<'static, sqlx::Postgres>, query: &UserListQuery) {
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(builder, &SEARCH_COLUMNS, term);
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn create_user(&self, user: &UserInsert) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (
                first_name, last_name, email, password_hash, phone_number,
                university, degree, branch, graduation_year, current_cgpa,
                tenth_percentage, twelfth_percentage, skills, role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(&user.university)
        .bind(&user.degree)
        .bind(&user.branch)
        .bind(user.graduation_year)
        .bind(user.current_cgpa)
        .bind(user.tenth_percentage)
        .bind(user.twelfth_percentage)
        .bind(&user.skills)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            _ => AppError::from(e),
        })
    }

    async fn record_login(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_profile(&self, id: &Uuid, patch: &UpdateProfileRequest) -> Result<Option<User>, AppError> {
        let mut update = UpdateBuilder::new("users");
        update
            .set("first_name", patch.first_name.clone())
            .set("last_name", patch.last_name.clone())
            .patch("phone_number", &patch.phone_number)
            .patch("university", &patch.university)
            .patch("degree", &patch.degree)
            .patch("branch", &patch.branch)
            .set("graduation_year", patch.graduation_year)
            .set("current_cgpa", patch.current_cgpa)
            .set("tenth_percentage", patch.tenth_percentage)
            .set("twelfth_percentage", patch.twelfth_percentage)
            .patch_list("skills", &patch.skills)
            .patch("resume", &patch.resume)
            .patch("profile_picture", &patch.profile_picture);

        let mut builder = update.where_id(*id);
        let user = builder.build_query_as::<User>().fetch_optional(&self.pool).await?;

        Ok(user)
    }

    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn list_users(&self, query: &UserListQuery, page: PageRequest) -> Result<Page<User>, AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filters(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        push_user_filters(&mut builder, query);
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok(Page { rows, total })
    }

    async fn user_summaries(&self, ids: &[Uuid], with_email: bool) -> Result<Vec<UserSummary>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = if with_email {
            "SELECT id, first_name, last_name, university, email FROM users WHERE id = ANY($1)"
        } else {
            "SELECT id, first_name, last_name, university, NULL::text AS email FROM users WHERE id = ANY($1)"
        };

        let summaries = sqlx::query_as::<_, UserSummary>(sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(summaries)
    }
}
