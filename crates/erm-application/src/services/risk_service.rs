//! Risk Application Service
//!
//! Risk register use cases: listing, CRUD, explicit status changes, cascade
//! deletion and the dashboard aggregates.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use erm_domain::entities::Risk;
use erm_domain::repositories::RiskFilter;
use erm_domain::value_objects::{
    CategoryId, OrganizationId, Permission, RiskId, RiskStatus, UserId,
};

use super::recalculation::RiskRecalculator;
use crate::dto::{
    Actor, AssessmentDto, CreateRiskCommand, MitigationDto, Page, PageRequest, RiskDto,
    RiskOverviewDto, UpdateRiskCommand,
};
use crate::errors::{ApplicationError, ApplicationResult};
use crate::events::{ApplicationEvent, EventPublisher};
use crate::ports::{Repositories, UnitOfWork};

/// Number of risks returned by `top_risks` when the caller gives no limit
pub const DEFAULT_TOP_RISKS: usize = 10;

/// Risk Application Service
pub struct RiskService {
    repos: Repositories,
    uow: Arc<UnitOfWork>,
    events: Arc<dyn EventPublisher>,
    recalculator: RiskRecalculator,
}

impl RiskService {
    /// Create a new RiskService with injected dependencies
    pub fn new(repos: Repositories, uow: Arc<UnitOfWork>, events: Arc<dyn EventPublisher>) -> Self {
        let recalculator = RiskRecalculator::new(repos.clone(), Arc::clone(&events));
        Self {
            repos,
            uow,
            events,
            recalculator,
        }
    }

    /// Risks of the caller's organization, newest first
    pub async fn list_risks(
        &self,
        actor: &Actor,
        filter: RiskFilter,
        page: PageRequest,
    ) -> ApplicationResult<Page<RiskDto>> {
        actor.require(Permission::Read)?;
        let filter = RiskFilter {
            organization_id: Some(actor.organization_id),
            ..filter
        };
        let mut risks = self.repos.risks.find_all(&filter).await?;
        risks.sort_by_key(|risk| Reverse(risk.id()));
        Ok(Page::paginate(risks, page).map(|risk| RiskDto::from_domain(&risk)))
    }

    pub async fn get_risk(&self, actor: &Actor, id: RiskId) -> ApplicationResult<RiskDto> {
        actor.require(Permission::Read)?;
        let risk = self.recalculator.load_risk(actor.organization_id, id).await?;
        Ok(RiskDto::from_domain(&risk))
    }

    /// Register a new risk; it starts `Identified` with score 0
    #[instrument(skip(self, cmd), fields(user = %actor.user_id))]
    pub async fn create_risk(
        &self,
        actor: &Actor,
        cmd: CreateRiskCommand,
    ) -> ApplicationResult<RiskDto> {
        actor.require(Permission::Create)?;
        let owner_id = cmd.owner_id.unwrap_or(actor.user_id);

        let risk = self
            .uow
            .execute(async {
                self.check_category(actor.organization_id, cmd.category_id)
                    .await?;
                self.check_owner(actor.organization_id, owner_id).await?;

                let risk = Risk::new(
                    self.repos.risks.next_id().await?,
                    actor.organization_id,
                    owner_id,
                    cmd.category_id,
                    cmd.title,
                    cmd.description,
                )?;
                self.repos.risks.save(&risk).await?;
                Ok(risk)
            })
            .await?;

        info!(risk_id = %risk.id(), "Risk created");
        self.events
            .publish(ApplicationEvent::RiskCreated {
                risk_id: risk.id(),
                title: risk.title().to_string(),
                timestamp: Utc::now(),
            })
            .await;

        Ok(RiskDto::from_domain(&risk))
    }

    /// Edit title, description, category or owner
    pub async fn update_risk(
        &self,
        actor: &Actor,
        id: RiskId,
        cmd: UpdateRiskCommand,
    ) -> ApplicationResult<RiskDto> {
        actor.require(Permission::Update)?;

        let risk = self
            .uow
            .execute(async {
                let mut risk = self.recalculator.load_risk(actor.organization_id, id).await?;
                if let Some(title) = cmd.title {
                    risk.update_title(title)?;
                }
                if let Some(description) = cmd.description {
                    risk.update_description(Some(description))?;
                }
                if let Some(category_id) = cmd.category_id {
                    self.check_category(actor.organization_id, category_id)
                        .await?;
                    risk.recategorize(category_id);
                }
                if let Some(owner_id) = cmd.owner_id {
                    self.check_owner(actor.organization_id, owner_id).await?;
                    risk.reassign(owner_id);
                }
                self.repos.risks.save(&risk).await?;
                Ok(risk)
            })
            .await?;

        self.events
            .publish(ApplicationEvent::RiskUpdated {
                risk_id: id,
                timestamp: Utc::now(),
            })
            .await;

        Ok(RiskDto::from_domain(&risk))
    }

    /// Set the lifecycle status explicitly
    ///
    /// This is the only way into or out of `Closed`. Any other target status
    /// is immediately re-derived from assessments and actions, so it only
    /// sticks when it agrees with them.
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn update_risk_status(
        &self,
        actor: &Actor,
        id: RiskId,
        status: RiskStatus,
    ) -> ApplicationResult<RiskDto> {
        actor.require(Permission::Create)?;

        let (from, risk) = self
            .uow
            .execute(async {
                let mut risk = self.recalculator.load_risk(actor.organization_id, id).await?;
                let from = risk.status();
                risk.set_status(status);
                self.repos.risks.save(&risk).await?;
                let risk = if status == RiskStatus::Closed {
                    risk
                } else {
                    self.recalculator.recalculate(id).await?
                };
                Ok((from, risk))
            })
            .await?;

        if from != risk.status() {
            info!(risk_id = %id, from = %from, to = %risk.status(), "Risk status changed");
            self.events
                .publish(ApplicationEvent::RiskStatusChanged {
                    risk_id: id,
                    from,
                    to: risk.status(),
                    timestamp: Utc::now(),
                })
                .await;
        }

        Ok(RiskDto::from_domain(&risk))
    }

    /// Delete a risk together with its assessments and mitigation actions
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn delete_risk(&self, actor: &Actor, id: RiskId) -> ApplicationResult<()> {
        actor.require(Permission::Delete)?;

        let (assessments_removed, actions_removed) = self
            .uow
            .execute(async {
                self.recalculator.load_risk(actor.organization_id, id).await?;
                let assessments = self.repos.assessments.delete_by_risk(id).await?;
                let actions = self.repos.mitigations.delete_by_risk(id).await?;
                self.repos.risks.delete(id).await?;
                Ok((assessments, actions))
            })
            .await?;

        info!(
            risk_id = %id,
            assessments_removed,
            actions_removed,
            "Risk deleted"
        );
        self.events
            .publish(ApplicationEvent::RiskDeleted {
                risk_id: id,
                assessments_removed,
                actions_removed,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }

    /// Force a recomputation of score and status
    pub async fn recalculate(&self, actor: &Actor, id: RiskId) -> ApplicationResult<RiskDto> {
        actor.require(Permission::Update)?;
        let risk = self
            .uow
            .execute(async {
                self.recalculator.load_risk(actor.organization_id, id).await?;
                self.recalculator.recalculate(id).await
            })
            .await?;
        Ok(RiskDto::from_domain(&risk))
    }

    /// Counts by status and severity band for the caller's organization
    pub async fn overview(&self, actor: &Actor) -> ApplicationResult<RiskOverviewDto> {
        actor.require(Permission::Read)?;
        let risks = self
            .repos
            .risks
            .find_all(&RiskFilter::for_organization(actor.organization_id))
            .await?;
        Ok(RiskOverviewDto::from_risks(&risks))
    }

    /// Highest scoring open risks, ties broken by newest first
    pub async fn top_risks(
        &self,
        actor: &Actor,
        limit: Option<usize>,
    ) -> ApplicationResult<Vec<RiskDto>> {
        actor.require(Permission::Read)?;
        let mut risks: Vec<Risk> = self
            .repos
            .risks
            .find_all(&RiskFilter::for_organization(actor.organization_id))
            .await?
            .into_iter()
            .filter(|risk| !risk.is_closed() && risk.risk_score() > 0)
            .collect();
        risks.sort_by_key(|risk| Reverse((risk.risk_score(), risk.id())));
        Ok(risks
            .iter()
            .take(limit.unwrap_or(DEFAULT_TOP_RISKS))
            .map(RiskDto::from_domain)
            .collect())
    }

    /// Assessments of one risk, latest first
    pub async fn risk_assessments(
        &self,
        actor: &Actor,
        id: RiskId,
    ) -> ApplicationResult<Vec<AssessmentDto>> {
        actor.require(Permission::Read)?;
        self.recalculator.load_risk(actor.organization_id, id).await?;
        let mut scored = self.recalculator.scored_assessments(id).await?;
        scored.sort_by_key(|s| Reverse(s.assessment.recency_key()));
        Ok(scored.iter().map(AssessmentDto::from_scored).collect())
    }

    /// Mitigation actions of one risk, earliest due first
    pub async fn risk_mitigations(
        &self,
        actor: &Actor,
        id: RiskId,
    ) -> ApplicationResult<Vec<MitigationDto>> {
        actor.require(Permission::Read)?;
        self.recalculator.load_risk(actor.organization_id, id).await?;
        let mut actions = self.repos.mitigations.find_by_risk(id).await?;
        actions.sort_by_key(|action| (action.due_date, action.id));
        Ok(actions.iter().map(MitigationDto::from_domain).collect())
    }

    async fn check_category(
        &self,
        organization_id: OrganizationId,
        category_id: CategoryId,
    ) -> ApplicationResult<()> {
        match self.repos.categories.find_by_id(category_id).await? {
            Some(category) if category.organization_id == organization_id => Ok(()),
            _ => Err(ApplicationError::ValidationFailed(format!(
                "Invalid risk category: {}",
                category_id
            ))),
        }
    }

    async fn check_owner(
        &self,
        organization_id: OrganizationId,
        owner_id: UserId,
    ) -> ApplicationResult<()> {
        match self.repos.users.find_by_id(owner_id).await? {
            Some(user) if user.organization_id() == organization_id => Ok(()),
            _ => Err(ApplicationError::ValidationFailed(format!(
                "Invalid risk owner: {}",
                owner_id
            ))),
        }
    }
}
