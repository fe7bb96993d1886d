use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::EXPERIENCE_TRACKING_PREFIX,
    domain::{
        policy::{ensure_owner_or_admin, is_privileged, Identity},
        use_cases::distinct_ids,
    },
    entities::{
        company::CompanyBrief,
        experience::{
            ExperienceListQuery, ExperienceStatus, ExperienceView, ModerationRequest, MyExperienceQuery,
            NewExperienceRequest, PlacementExperience, UpdateExperienceRequest,
        },
        pagination::{Page, PageQuery, PageRequest, Pagination},
        round::RoundWithDetails,
        user::UserSummary,
    },
    errors::AppError,
    repositories::{
        company::CompanyRepository, experience::ExperienceRepository, round::RoundRepository,
        user::UserRepository,
    },
    utils::{tracking_id::generate_tracking_id, valid_uuid::valid_uuid},
};

fn experience_not_found() -> AppError {
    AppError::NotFound("Placement experience not found".to_string())
}

fn only_pending_editable() -> AppError {
    AppError::BadRequest("Only pending experiences can be edited".to_string())
}

pub struct ExperienceHandler<E, R, C, U>
where
    E: ExperienceRepository,
    R: RoundRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub experience_repo: E,
    pub round_repo: R,
    pub company_repo: C,
    pub user_repo: U,
}

impl<E, R, C, U> ExperienceHandler<E, R, C, U>
where
    E: ExperienceRepository,
    R: RoundRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub fn new(experience_repo: E, round_repo: R, company_repo: C, user_repo: U) -> Self {
        ExperienceHandler {
            experience_repo,
            round_repo,
            company_repo,
            user_repo,
        }
    }

    /// Joins company cards, submitter summaries and nested rounds onto a batch
    /// of experiences. No privacy projection is applied here.
    async fn assemble(
        &self,
        experiences: Vec<PlacementExperience>,
        with_email: bool,
    ) -> Result<Vec<ExperienceView>, AppError> {
        let ids: Vec<Uuid> = experiences.iter().map(|e| e.id).collect();
        let company_ids = distinct_ids(experiences.iter().map(|e| e.company_id));
        let user_ids = distinct_ids(experiences.iter().map(|e| e.user_id));

        let companies: HashMap<Uuid, CompanyBrief> = self
            .company_repo
            .company_briefs(&company_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let students: HashMap<Uuid, UserSummary> = self
            .user_repo
            .user_summaries(&user_ids, with_email)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let rounds = self.round_repo.rounds_for_experiences(&ids).await?;
        let round_ids: Vec<Uuid> = rounds.iter().map(|r| r.id).collect();
        let details = self.round_repo.load_details(&round_ids).await?;

        let mut rounds_by_experience: HashMap<Uuid, Vec<RoundWithDetails>> = HashMap::new();
        for round in details.attach(rounds) {
            if let Some(experience_id) = round.round.experience_id {
                rounds_by_experience.entry(experience_id).or_default().push(round);
            }
        }

        Ok(experiences
            .into_iter()
            .map(|experience| {
                let company = companies.get(&experience.company_id).cloned();
                let student = students.get(&experience.user_id).cloned();
                let rounds = rounds_by_experience.remove(&experience.id).unwrap_or_default();
                ExperienceView::new(experience, company, student, rounds)
            })
            .collect())
    }

    async fn paged(
        &self,
        page: PageRequest,
        experiences: Page<PlacementExperience>,
        with_email: bool,
    ) -> Result<(Vec<ExperienceView>, Pagination), AppError> {
        let pagination = Pagination::new(page, experiences.total);
        Ok((self.assemble(experiences.rows, with_email).await?, pagination))
    }

    async fn owned_experience(&self, identity: &Identity, id: &str) -> Result<PlacementExperience, AppError> {
        let experience_id = valid_uuid(id)?;
        let experience = self
            .experience_repo
            .get_experience(&experience_id)
            .await?
            .ok_or_else(experience_not_found)?;

        ensure_owner_or_admin(identity, experience.user_id)?;
        Ok(experience)
    }

    /// The public feed: approved and active only, projected for `viewer`.
    pub async fn list_public(
        &self,
        query: &ExperienceListQuery,
        viewer: Option<&Identity>,
    ) -> Result<(Vec<ExperienceView>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let experiences = self.experience_repo.list_public(query, page).await?;
        let (views, pagination) = self.paged(page, experiences, false).await?;

        Ok((views.into_iter().map(|v| v.project(viewer)).collect(), pagination))
    }

    pub async fn my_experiences(
        &self,
        identity: &Identity,
        query: &MyExperienceQuery,
    ) -> Result<(Vec<ExperienceView>, Pagination), AppError> {
        let page = PageRequest::new(query.page, query.limit);
        let experiences = self
            .experience_repo
            .list_for_user(&identity.user_id, query, page)
            .await?;
        self.paged(page, experiences, false).await
    }

    /// The moderation queue, oldest first. Submitter emails are included.
    pub async fn pending(&self, query: &PageQuery) -> Result<(Vec<ExperienceView>, Pagination), AppError> {
        let page = query.request();
        let experiences = self.experience_repo.list_pending(page).await?;
        self.paged(page, experiences, true).await
    }

    /// Stores the experience with its nested rounds. It awaits moderation.
    pub async fn create_experience(
        &self,
        identity: &Identity,
        request: NewExperienceRequest,
    ) -> Result<PlacementExperience, AppError> {
        request.validate()?;

        match self.company_repo.get_company(&request.company_id).await? {
            Some(company) if company.is_active => {}
            _ => return Err(AppError::NotFound("Company not found".to_string())),
        }

        let tracking_id = generate_tracking_id(EXPERIENCE_TRACKING_PREFIX);
        let (insert, rounds) = request.into_insert(identity.user_id, tracking_id);
        let experience = self.experience_repo.create_with_rounds(&insert, rounds).await?;

        tracing::info!(
            experience_id = %experience.id,
            tracking_id = %experience.tracking_id,
            rounds = experience.rounds_completed,
            "Placement experience submitted for review"
        );
        Ok(experience)
    }

    /// Reads one experience.
    ///
    /// Hidden records (inactive or not yet approved) are only readable by the
    /// submitter and admins. Views are counted for everyone but the submitter.
    pub async fn get_experience(&self, id: &str, viewer: Option<&Identity>) -> Result<ExperienceView, AppError> {
        let experience_id = valid_uuid(id)?;
        let mut experience = self
            .experience_repo
            .get_experience(&experience_id)
            .await?
            .ok_or_else(experience_not_found)?;

        let privileged = is_privileged(viewer, experience.user_id);
        if !experience.is_active && !privileged {
            return Err(experience_not_found());
        }
        if experience.status != ExperienceStatus::Approved && !privileged {
            return Err(AppError::Forbidden(
                "This placement experience is not yet available".to_string(),
            ));
        }

        let is_owner = viewer.is_some_and(|v| v.user_id == experience.user_id);
        if experience.status == ExperienceStatus::Approved && !is_owner {
            self.experience_repo.increment_views(&experience.id).await?;
            experience.views += 1;
        }

        let mut views = self.assemble(vec![experience], false).await?;
        let view = views.pop().ok_or_else(experience_not_found)?;
        Ok(view.project(viewer))
    }

    pub async fn moderate(
        &self,
        admin: &Identity,
        id: &str,
        request: ModerationRequest,
    ) -> Result<PlacementExperience, AppError> {
        request.validate()?;
        let experience_id = valid_uuid(id)?;

        if self.experience_repo.get_experience(&experience_id).await?.is_none() {
            return Err(experience_not_found());
        }

        let status = ExperienceStatus::from(request.status);
        let experience = self
            .experience_repo
            .moderate(&experience_id, status, request.admin_notes, &admin.user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Only pending experiences can be moderated".to_string()))?;

        tracing::info!(
            experience_id = %experience.id,
            reviewer = %admin.user_id,
            status = ?experience.status,
            "Placement experience moderated"
        );
        Ok(experience)
    }

    /// Submitters may edit an experience until it has been moderated.
    pub async fn update_experience(
        &self,
        identity: &Identity,
        id: &str,
        request: UpdateExperienceRequest,
    ) -> Result<PlacementExperience, AppError> {
        request.validate()?;
        let experience = self.owned_experience(identity, id).await?;

        if experience.status != ExperienceStatus::Pending {
            return Err(only_pending_editable());
        }

        // a moderation decision can land between the read and the write
        self.experience_repo
            .update_experience(&experience.id, &request)
            .await?
            .ok_or_else(only_pending_editable)
    }

    pub async fn delete_experience(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
        let experience = self.owned_experience(identity, id).await?;
        if !self.experience_repo.deactivate_experience(&experience.id).await? {
            return Err(experience_not_found());
        }
        Ok(())
    }

    pub async fn vote_helpful(&self, id: &str) -> Result<PlacementExperience, AppError> {
        let experience_id = valid_uuid(id)?;
        self.experience_repo
            .vote_helpful(&experience_id)
            .await?
            .ok_or_else(experience_not_found)
    }
}
