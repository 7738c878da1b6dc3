//! Assessment Application Service
//!
//! Every mutation recomputes the owning risk before returning.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use erm_domain::entities::Assessment;
use erm_domain::repositories::{AssessmentFilter, RiskFilter};
use erm_domain::scoring::RiskScoringEngine;
use erm_domain::value_objects::{AssessmentId, ImpactId, LikelihoodId, Permission, RiskId};

use super::recalculation::{RiskRecalculator, ScaleLookup};
use crate::dto::{
    Actor, AssessmentDto, CreateAssessmentCommand, Page, PageRequest, UpdateAssessmentCommand,
};
use crate::errors::{ApplicationError, ApplicationResult};
use crate::events::{ApplicationEvent, EventPublisher};
use crate::ports::{Repositories, UnitOfWork};

/// Assessment Application Service
pub struct AssessmentService {
    repos: Repositories,
    uow: Arc<UnitOfWork>,
    events: Arc<dyn EventPublisher>,
    recalculator: RiskRecalculator,
}

impl AssessmentService {
    pub fn new(repos: Repositories, uow: Arc<UnitOfWork>, events: Arc<dyn EventPublisher>) -> Self {
        let recalculator = RiskRecalculator::new(repos.clone(), Arc::clone(&events));
        Self {
            repos,
            uow,
            events,
            recalculator,
        }
    }

    /// Assessments on risks of the caller's organization, latest first
    pub async fn list_assessments(
        &self,
        actor: &Actor,
        filter: AssessmentFilter,
        page: PageRequest,
    ) -> ApplicationResult<Page<AssessmentDto>> {
        actor.require(Permission::Read)?;
        let visible: HashSet<RiskId> = self
            .repos
            .risks
            .find_all(&RiskFilter::for_organization(actor.organization_id))
            .await?
            .iter()
            .map(|risk| risk.id())
            .collect();

        let assessments: Vec<Assessment> = self
            .repos
            .assessments
            .find_all(&filter)
            .await?
            .into_iter()
            .filter(|assessment| visible.contains(&assessment.risk_id))
            .collect();

        let scales = ScaleLookup::load(&self.repos).await?;
        let mut scored = scales.score_all(assessments);
        scored.sort_by_key(|s| Reverse(s.assessment.recency_key()));
        Ok(Page::paginate(scored, page).map(|s| AssessmentDto::from_scored(&s)))
    }

    pub async fn get_assessment(
        &self,
        actor: &Actor,
        id: AssessmentId,
    ) -> ApplicationResult<AssessmentDto> {
        actor.require(Permission::Read)?;
        let assessment = self.load(actor, id).await?;
        let scales = ScaleLookup::load(&self.repos).await?;
        Ok(AssessmentDto::from_scored(&scales.score(assessment)))
    }

    /// Record an assessment by the calling user
    #[instrument(skip(self, cmd), fields(user = %actor.user_id, risk_id = %cmd.risk_id))]
    pub async fn create_assessment(
        &self,
        actor: &Actor,
        cmd: CreateAssessmentCommand,
    ) -> ApplicationResult<AssessmentDto> {
        actor.require(Permission::Update)?;

        let assessment = self
            .uow
            .execute(async {
                self.recalculator
                    .load_risk(actor.organization_id, cmd.risk_id)
                    .await?;
                self.check_scales(cmd.likelihood_id, cmd.impact_id).await?;

                let assessment = Assessment::new(
                    self.repos.assessments.next_id().await?,
                    cmd.risk_id,
                    cmd.likelihood_id,
                    cmd.impact_id,
                    cmd.assessment_date.unwrap_or_else(Utc::now),
                    actor.user_id,
                    cmd.notes,
                )?;
                self.repos.assessments.save(&assessment).await?;
                self.recalculator.recalculate(assessment.risk_id).await?;
                Ok(assessment)
            })
            .await?;

        info!(assessment_id = %assessment.id, "Assessment recorded");
        self.events
            .publish(ApplicationEvent::AssessmentRecorded {
                assessment_id: assessment.id,
                risk_id: assessment.risk_id,
                timestamp: Utc::now(),
            })
            .await;

        self.to_dto(assessment).await
    }

    /// Edit an assessment; moving it to another risk recomputes both risks
    pub async fn update_assessment(
        &self,
        actor: &Actor,
        id: AssessmentId,
        cmd: UpdateAssessmentCommand,
    ) -> ApplicationResult<AssessmentDto> {
        actor.require(Permission::Update)?;

        let assessment = self
            .uow
            .execute(async {
                let mut assessment = self.load(actor, id).await?;
                let previous_risk = assessment.risk_id;

                if let Some(risk_id) = cmd.risk_id {
                    self.recalculator
                        .load_risk(actor.organization_id, risk_id)
                        .await?;
                    assessment.move_to(risk_id);
                }
                if cmd.likelihood_id.is_some() || cmd.impact_id.is_some() {
                    let likelihood_id = cmd.likelihood_id.unwrap_or(assessment.likelihood_id);
                    let impact_id = cmd.impact_id.unwrap_or(assessment.impact_id);
                    self.check_scales(likelihood_id, impact_id).await?;
                    assessment.rescore(likelihood_id, impact_id);
                }
                if let Some(date) = cmd.assessment_date {
                    assessment.reschedule(date)?;
                }
                if let Some(notes) = cmd.notes {
                    assessment.annotate(Some(notes))?;
                }

                self.repos.assessments.save(&assessment).await?;
                self.recalculator.recalculate(assessment.risk_id).await?;
                if previous_risk != assessment.risk_id {
                    self.recalculator.recalculate(previous_risk).await?;
                }
                Ok(assessment)
            })
            .await?;

        self.to_dto(assessment).await
    }

    /// Remove an assessment and recompute its risk
    #[instrument(skip(self), fields(user = %actor.user_id))]
    pub async fn delete_assessment(&self, actor: &Actor, id: AssessmentId) -> ApplicationResult<()> {
        actor.require(Permission::Delete)?;

        let risk_id = self
            .uow
            .execute(async {
                let assessment = self.load(actor, id).await?;
                self.repos.assessments.delete(id).await?;
                self.recalculator.recalculate(assessment.risk_id).await?;
                Ok(assessment.risk_id)
            })
            .await?;

        info!(assessment_id = %id, risk_id = %risk_id, "Assessment deleted");
        self.events
            .publish(ApplicationEvent::AssessmentDeleted {
                assessment_id: id,
                risk_id,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }

    /// The assessment that currently determines the risk's score
    pub async fn latest_for_risk(
        &self,
        actor: &Actor,
        risk_id: RiskId,
    ) -> ApplicationResult<Option<AssessmentDto>> {
        actor.require(Permission::Read)?;
        self.recalculator
            .load_risk(actor.organization_id, risk_id)
            .await?;
        let scored = self.recalculator.scored_assessments(risk_id).await?;
        Ok(RiskScoringEngine::latest(&scored).map(AssessmentDto::from_scored))
    }

    /// All assessments of one risk, latest first
    pub async fn assessments_for_risk(
        &self,
        actor: &Actor,
        risk_id: RiskId,
    ) -> ApplicationResult<Vec<AssessmentDto>> {
        actor.require(Permission::Read)?;
        self.recalculator
            .load_risk(actor.organization_id, risk_id)
            .await?;
        let mut scored = self.recalculator.scored_assessments(risk_id).await?;
        scored.sort_by_key(|s| Reverse(s.assessment.recency_key()));
        Ok(scored.iter().map(AssessmentDto::from_scored).collect())
    }

    /// Load an assessment whose risk belongs to the caller's organization
    async fn load(&self, actor: &Actor, id: AssessmentId) -> ApplicationResult<Assessment> {
        let assessment = self
            .repos
            .assessments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Assessment", id))?;
        self.recalculator
            .load_risk(actor.organization_id, assessment.risk_id)
            .await
            .map_err(|err| match err {
                ApplicationError::NotFound { .. } => ApplicationError::not_found("Assessment", id),
                other => other,
            })?;
        Ok(assessment)
    }

    async fn check_scales(
        &self,
        likelihood_id: LikelihoodId,
        impact_id: ImpactId,
    ) -> ApplicationResult<()> {
        if self.repos.scales.find_likelihood(likelihood_id).await?.is_none() {
            return Err(ApplicationError::ValidationFailed(format!(
                "Unknown likelihood: {}",
                likelihood_id
            )));
        }
        if self.repos.scales.find_impact(impact_id).await?.is_none() {
            return Err(ApplicationError::ValidationFailed(format!(
                "Unknown impact: {}",
                impact_id
            )));
        }
        Ok(())
    }

    async fn to_dto(&self, assessment: Assessment) -> ApplicationResult<AssessmentDto> {
        let scales = ScaleLookup::load(&self.repos).await?;
        Ok(AssessmentDto::from_scored(&scales.score(assessment)))
    }
}
