//! Assessment DTOs and commands

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use erm_domain::entities::ScoredAssessment;
use erm_domain::value_objects::{AssessmentId, ImpactId, LikelihoodId, RiskId, UserId};

/// Command to record an assessment; the assessor is the calling user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssessmentCommand {
    pub risk_id: RiskId,
    pub likelihood_id: LikelihoodId,
    pub impact_id: ImpactId,
    /// Defaults to now
    pub assessment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial update of an assessment; `None` leaves a field as is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssessmentCommand {
    /// Moving to another risk recomputes both risks
    pub risk_id: Option<RiskId>,
    pub likelihood_id: Option<LikelihoodId>,
    pub impact_id: Option<ImpactId>,
    pub assessment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Assessment with its resolved scale scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDto {
    pub id: AssessmentId,
    pub risk_id: RiskId,
    pub likelihood_id: LikelihoodId,
    pub impact_id: ImpactId,
    pub likelihood_score: Option<u8>,
    pub impact_score: Option<u8>,
    /// `None` when a scale reference no longer resolves
    pub score: Option<u32>,
    pub assessment_date: DateTime<Utc>,
    pub assessor_id: UserId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentDto {
    pub fn from_scored(scored: &ScoredAssessment) -> Self {
        let assessment = &scored.assessment;
        Self {
            id: assessment.id,
            risk_id: assessment.risk_id,
            likelihood_id: assessment.likelihood_id,
            impact_id: assessment.impact_id,
            likelihood_score: scored.likelihood_score,
            impact_score: scored.impact_score,
            score: scored.score(),
            assessment_date: assessment.assessment_date,
            assessor_id: assessment.assessor_id,
            notes: assessment.notes.clone(),
            created_at: assessment.created_at,
            updated_at: assessment.updated_at,
        }
    }
}
