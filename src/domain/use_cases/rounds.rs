use validator::Validate;

use crate::{
    domain::policy::{ensure_owner_or_admin, Identity},
    entities::{
        experience::{ExperienceStatus, PlacementExperience},
        round::{
            AptitudeRound, DsaRound, HrRound, NewAptitudeRound, NewDsaRound, NewHrRound, NewRoundRequest, NewTechRound,
            Round, RoundWithDetails, TechRound, UpdateRoundRequest,
        },
    },
    errors::AppError,
    repositories::{
        company::CompanyRepository, experience::ExperienceRepository, job::JobRepository, round::RoundRepository,
    },
    utils::valid_uuid::valid_uuid,
};

fn round_not_found() -> AppError {
    AppError::NotFound("Round not found".to_string())
}

/// Rounds of a moderated experience are part of what the admin signed off
/// on; only admins may change them afterwards.
fn ensure_experience_editable(identity: &Identity, experience: &PlacementExperience) -> Result<(), AppError> {
    if experience.status != ExperienceStatus::Pending && !identity.is_admin() {
        return Err(AppError::BadRequest(
            "Rounds of a moderated placement experience cannot be changed".to_string(),
        ));
    }
    Ok(())
}

pub struct RoundHandler<R, C, J, E>
where
    R: RoundRepository,
    C: CompanyRepository,
    J: JobRepository,
    E: ExperienceRepository,
{
    pub round_repo: R,
    pub company_repo: C,
    pub job_repo: J,
    pub experience_repo: E,
}

impl<R, C, J, E> RoundHandler<R, C, J, E>
where
    R: RoundRepository,
    C: CompanyRepository,
    J: JobRepository,
    E: ExperienceRepository,
{
    pub fn new(round_repo: R, company_repo: C, job_repo: J, experience_repo: E) -> Self {
        RoundHandler {
            round_repo,
            company_repo,
            job_repo,
            experience_repo,
        }
    }

    async fn owned_round(&self, identity: &Identity, id: &str) -> Result<Round, AppError> {
        let round_id = valid_uuid(id)?;
        let round = self.round_repo.get_round(&round_id).await?.ok_or_else(round_not_found)?;

        ensure_owner_or_admin(identity, round.user_id)?;
        Ok(round)
    }

    /// `owned_round`, plus the moderation gate of the experience it belongs to.
    async fn mutable_round(&self, identity: &Identity, id: &str) -> Result<Round, AppError> {
        let round = self.owned_round(identity, id).await?;
        if let Some(experience_id) = round.experience_id {
            if let Some(experience) = self.experience_repo.get_experience(&experience_id).await? {
                ensure_experience_editable(identity, &experience)?;
            }
        }
        Ok(round)
    }

    /// The caller's active rounds with every detail row, newest first.
    pub async fn my_rounds(&self, identity: &Identity) -> Result<Vec<RoundWithDetails>, AppError> {
        let rounds = self.round_repo.list_for_user(&identity.user_id).await?;
        let ids: Vec<_> = rounds.iter().map(|r| r.id).collect();
        let details = self.round_repo.load_details(&ids).await?;
        Ok(details.attach(rounds))
    }

    pub async fn create_round(&self, identity: &Identity, request: NewRoundRequest) -> Result<Round, AppError> {
        request.validate()?;

        if self.company_repo.get_company(&request.company_id).await?.is_none() {
            return Err(AppError::NotFound("Company not found".to_string()));
        }

        if let Some(job_id) = request.job_id {
            match self.job_repo.get_job(&job_id).await? {
                Some(job) if job.company_id == request.company_id => {}
                Some(_) => {
                    return Err(AppError::BadRequest(
                        "Job does not belong to the given company".to_string(),
                    ));
                }
                None => return Err(AppError::NotFound("Job not found".to_string())),
            }
        }

        if let Some(experience_id) = request.experience_id {
            let experience = self
                .experience_repo
                .get_experience(&experience_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Placement experience not found".to_string()))?;
            ensure_owner_or_admin(identity, experience.user_id)?;
            ensure_experience_editable(identity, &experience)?;
        }

        let insert = request.into_insert(identity.user_id);
        let round = self.round_repo.create_round(&insert).await?;

        tracing::info!(round_id = %round.id, company_id = %round.company_id, "Round created");
        Ok(round)
    }

    pub async fn get_round(&self, identity: &Identity, id: &str) -> Result<RoundWithDetails, AppError> {
        let round = self.owned_round(identity, id).await?;
        let company = self
            .company_repo
            .company_briefs(&[round.company_id])
            .await?
            .into_iter()
            .next();

        let details = self.round_repo.load_details(&[round.id]).await?;
        let mut rounds = details.attach(vec![round]);
        let mut round = rounds.pop().ok_or_else(round_not_found)?;
        round.company = company;
        Ok(round)
    }

    pub async fn update_round(
        &self,
        identity: &Identity,
        id: &str,
        request: UpdateRoundRequest,
    ) -> Result<Round, AppError> {
        request.validate()?;
        let round = self.mutable_round(identity, id).await?;

        self.round_repo
            .update_round(&round.id, &request)
            .await?
            .ok_or_else(round_not_found)
    }

    pub async fn delete_round(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
        let round = self.mutable_round(identity, id).await?;
        if !self.round_repo.deactivate_round(&round.id).await? {
            return Err(round_not_found());
        }
        Ok(())
    }

    pub async fn add_aptitude(
        &self,
        identity: &Identity,
        id: &str,
        detail: NewAptitudeRound,
    ) -> Result<AptitudeRound, AppError> {
        detail.validate()?;
        let round = self.mutable_round(identity, id).await?;
        self.round_repo.add_aptitude(&round.id, &detail).await
    }

    pub async fn add_tech(&self, identity: &Identity, id: &str, detail: NewTechRound) -> Result<TechRound, AppError> {
        detail.validate()?;
        let round = self.mutable_round(identity, id).await?;
        self.round_repo.add_tech(&round.id, &detail).await
    }

    pub async fn add_dsa(&self, identity: &Identity, id: &str, detail: NewDsaRound) -> Result<DsaRound, AppError> {
        detail.validate()?;
        let round = self.mutable_round(identity, id).await?;
        self.round_repo.add_dsa(&round.id, &detail).await
    }

    pub async fn add_hr(&self, identity: &Identity, id: &str, detail: NewHrRound) -> Result<HrRound, AppError> {
        detail.validate()?;
        let round = self.mutable_round(identity, id).await?;
        self.round_repo.add_hr(&round.id, &detail).await
    }
}
