//! Risk recomputation shared by every service that mutates risk children
//!
//! After an assessment or mitigation action is written, the owning risk is
//! re-evaluated with [`RiskScoringEngine`] and saved when its score or status
//! changed. Callers run this inside the same unit of work as the write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use erm_domain::entities::{Assessment, Impact, Likelihood, Risk, ScoredAssessment};
use erm_domain::scoring::RiskScoringEngine;
use erm_domain::value_objects::{ImpactId, LikelihoodId, OrganizationId, RiskId};

use crate::errors::{ApplicationError, ApplicationResult};
use crate::events::{ApplicationEvent, EventPublisher};
use crate::ports::Repositories;

/// Likelihood and impact scales loaded once per operation
pub(crate) struct ScaleLookup {
    likelihoods: HashMap<LikelihoodId, Likelihood>,
    impacts: HashMap<ImpactId, Impact>,
}

impl ScaleLookup {
    pub(crate) async fn load(repos: &Repositories) -> ApplicationResult<Self> {
        let likelihoods = repos.scales.list_likelihoods().await?;
        let impacts = repos.scales.list_impacts().await?;
        Ok(Self {
            likelihoods: likelihoods.into_iter().map(|l| (l.id, l)).collect(),
            impacts: impacts.into_iter().map(|i| (i.id, i)).collect(),
        })
    }

    /// Attach scale scores; unresolved references stay `None`
    pub(crate) fn score(&self, assessment: Assessment) -> ScoredAssessment {
        let likelihood = self.likelihoods.get(&assessment.likelihood_id);
        let impact = self.impacts.get(&assessment.impact_id);
        ScoredAssessment::resolve(assessment, likelihood, impact)
    }

    pub(crate) fn score_all(&self, assessments: Vec<Assessment>) -> Vec<ScoredAssessment> {
        assessments.into_iter().map(|a| self.score(a)).collect()
    }
}

/// Re-evaluates and persists a risk's derived score and status
#[derive(Clone)]
pub(crate) struct RiskRecalculator {
    repos: Repositories,
    events: Arc<dyn EventPublisher>,
}

impl RiskRecalculator {
    pub(crate) fn new(repos: Repositories, events: Arc<dyn EventPublisher>) -> Self {
        Self { repos, events }
    }

    /// Load a risk, hiding risks of other organizations
    pub(crate) async fn load_risk(
        &self,
        organization_id: OrganizationId,
        risk_id: RiskId,
    ) -> ApplicationResult<Risk> {
        self.repos
            .risks
            .find_by_id(risk_id)
            .await?
            .filter(|risk| risk.organization_id() == organization_id)
            .ok_or_else(|| ApplicationError::not_found("Risk", risk_id))
    }

    /// All assessments of a risk with their scale scores
    pub(crate) async fn scored_assessments(
        &self,
        risk_id: RiskId,
    ) -> ApplicationResult<Vec<ScoredAssessment>> {
        let assessments = self.repos.assessments.find_by_risk(risk_id).await?;
        let scales = ScaleLookup::load(&self.repos).await?;
        Ok(scales.score_all(assessments))
    }

    /// Recompute score and status of one risk and save it if anything changed
    pub(crate) async fn recalculate(&self, risk_id: RiskId) -> ApplicationResult<Risk> {
        let mut risk = self
            .repos
            .risks
            .find_by_id(risk_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Risk", risk_id))?;

        let assessments = self.scored_assessments(risk_id).await?;
        let actions = self.repos.mitigations.find_by_risk(risk_id).await?;
        let evaluation = RiskScoringEngine::evaluate(&risk, &assessments, &actions);

        if risk.apply_evaluation(&evaluation) {
            self.repos.risks.save(&risk).await?;
            debug!(
                risk_id = %risk_id,
                score = evaluation.score,
                status = %evaluation.status,
                "Risk recalculated"
            );
            self.events
                .publish(ApplicationEvent::RiskRecalculated {
                    risk_id,
                    score: evaluation.score,
                    status: evaluation.status,
                    timestamp: Utc::now(),
                })
                .await;
        }

        Ok(risk)
    }
}
