use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        policy::{ensure_owner_or_admin, is_privileged, Identity},
        use_cases::distinct_ids,
    },
    entities::{
        pagination::{PageQuery, PageRequest, Pagination},
        review::{NewReviewRequest, Review, ReviewListQuery, ReviewView, UpdateReviewRequest},
        user::UserSummary,
    },
    errors::AppError,
    repositories::{company::CompanyRepository, review::ReviewRepository, user::UserRepository},
    utils::valid_uuid::valid_uuid,
};

fn review_not_found() -> AppError {
    AppError::NotFound("Review not found".to_string())
}

pub struct ReviewHandler<R, C, U>
where
    R: ReviewRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub review_repo: R,
    pub company_repo: C,
    pub user_repo: U,
}

impl<R, C, U> ReviewHandler<R, C, U>
where
    R: ReviewRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub fn new(review_repo: R, company_repo: C, user_repo: U) -> Self {
        ReviewHandler {
            review_repo,
            company_repo,
            user_repo,
        }
    }

    async fn project(&self, reviews: Vec<Review>, viewer: Option<&Identity>) -> Result<Vec<ReviewView>, AppError> {
        let author_ids = distinct_ids(reviews.iter().map(|r| r.user_id));
        let authors: HashMap<Uuid, UserSummary> = self
            .user_repo
            .user_summaries(&author_ids, false)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let author = authors.get(&review.user_id).cloned();
                ReviewView::project(review, author, viewer)
            })
            .collect())
    }

    async fn owned_review(&self, identity: &Identity, id: &str) -> Result<Review, AppError> {
        let review_id = valid_uuid(id)?;
        let review = self
            .review_repo
            .get_review(&review_id)
            .await?
            .ok_or_else(review_not_found)?;

        ensure_owner_or_admin(identity, review.user_id)?;
        Ok(review)
    }

    /// Active reviews for one company, with authors hidden on anonymous reviews.
    pub async fn company_reviews(
        &self,
        company_id: &str,
        query: &ReviewListQuery,
        viewer: Option<&Identity>,
    ) -> Result<(Vec<ReviewView>, Pagination), AppError> {
        let company_id = valid_uuid(company_id)?;
        let page = PageRequest::new(query.page, query.limit);

        let reviews = self.review_repo.list_for_company(&company_id, query, page).await?;
        let pagination = Pagination::new(page, reviews.total);

        Ok((self.project(reviews.rows, viewer).await?, pagination))
    }

    pub async fn my_reviews(&self, identity: &Identity, query: &PageQuery) -> Result<(Vec<Review>, Pagination), AppError> {
        let page = query.request();
        let reviews = self.review_repo.list_for_user(&identity.user_id, page).await?;
        let pagination = Pagination::new(page, reviews.total);
        Ok((reviews.rows, pagination))
    }

    /// One review per user and company. Keeps the company rating in step.
    pub async fn create_review(&self, identity: &Identity, request: NewReviewRequest) -> Result<Review, AppError> {
        request.validate()?;

        match self.company_repo.get_company(&request.company_id).await? {
            Some(company) if company.is_active => {}
            _ => return Err(AppError::NotFound("Company not found".to_string())),
        }

        if self
            .review_repo
            .review_exists(&identity.user_id, &request.company_id)
            .await?
        {
            tracing::warn!(user_id = %identity.user_id, company_id = %request.company_id, "Duplicate review rejected");
            return Err(AppError::Conflict("You have already reviewed this company".to_string()));
        }

        let insert = request.into_insert(identity.user_id);
        let review = self.review_repo.create_review(&insert).await?;
        self.company_repo.refresh_rating(&review.company_id).await?;

        tracing::info!(review_id = %review.id, company_id = %review.company_id, "Review created");
        Ok(review)
    }

    /// Inactive reviews are only visible to their author and admins.
    pub async fn get_review(&self, id: &str, viewer: Option<&Identity>) -> Result<ReviewView, AppError> {
        let review_id = valid_uuid(id)?;
        let review = self
            .review_repo
            .get_review(&review_id)
            .await?
            .ok_or_else(review_not_found)?;

        if !review.is_active && !is_privileged(viewer, review.user_id) {
            return Err(review_not_found());
        }

        let mut views = self.project(vec![review], viewer).await?;
        views.pop().ok_or_else(review_not_found)
    }

    pub async fn update_review(
        &self,
        identity: &Identity,
        id: &str,
        request: UpdateReviewRequest,
    ) -> Result<Review, AppError> {
        request.validate()?;
        let request = request.normalized();
        let review = self.owned_review(identity, id).await?;

        let updated = self
            .review_repo
            .update_review(&review.id, &request)
            .await?
            .ok_or_else(review_not_found)?;
        self.company_repo.refresh_rating(&updated.company_id).await?;

        Ok(updated)
    }

    pub async fn delete_review(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
        let review = self.owned_review(identity, id).await?;
        if !self.review_repo.deactivate_review(&review.id).await? {
            return Err(review_not_found());
        }
        self.company_repo.refresh_rating(&review.company_id).await?;

        tracing::info!(review_id = %review.id, "Review deactivated");
        Ok(())
    }

    pub async fn mark_helpful(&self, id: &str) -> Result<Review, AppError> {
        let review_id = valid_uuid(id)?;
        self.review_repo
            .increment_helpful(&review_id)
            .await?
            .ok_or_else(review_not_found)
    }

    pub async fn report_review(&self, id: &str) -> Result<Review, AppError> {
        let review_id = valid_uuid(id)?;
        let review = self
            .review_repo
            .increment_report(&review_id)
            .await?
            .ok_or_else(review_not_found)?;

        tracing::warn!(review_id = %review.id, report_count = review.report_count, "Review reported");
        Ok(review)
    }
}
