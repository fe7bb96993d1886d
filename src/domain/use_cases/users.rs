use serde::Serialize;

use crate::{
    entities::{
        application::Application,
        pagination::{PageRequest, Pagination},
        review::Review,
        user::{PublicUser, UserListQuery},
    },
    errors::AppError,
    repositories::{application::ApplicationRepository, review::ReviewRepository, user::UserRepository},
    utils::valid_uuid::valid_uuid,
};

/// A user as seen from the admin console, with their activity.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: PublicUser,
    pub applications: Vec<Application>,
    pub reviews: Vec<Review>,
}

pub struct UserHandler<U, A, R>
where
    U: UserRepository,
    A: ApplicationRepository,
    R: ReviewRepository,
{
    pub user_repo: U,
    pub application_repo: A,
    pub review_repo: R,
}

impl<U, A, R> UserHandler<U, A, R>
where
    U: UserRepository,
    A: ApplicationRepository,
    R: ReviewRepository,
{
    pub fn new(user_repo: U, application_repo: A, review_repo: R) -> Self {
        UserHandler {
            user_repo,
            application_repo,
            review_repo,
        }
    }

    pub async fn list_users(&self, query: &UserListQuery) -> Result<(Vec<PublicUser>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let users = self.user_repo.list_users(query, page).await?;
        let pagination = Pagination::new(page, users.total);

        Ok((users.rows.into_iter().map(PublicUser::from).collect(), pagination))
    }

    pub async fn get_user(&self, id: &str) -> Result<UserDetail, AppError> {
        let user_id = valid_uuid(id)?;
        let user = self
            .user_repo
            .get_user_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let applications = self.application_repo.all_for_user(&user_id).await?;
        let reviews = self.review_repo.all_for_user(&user_id).await?;

        Ok(UserDetail {
            user: user.into(),
            applications,
            reviews,
        })
    }
}
