//! Assessment entity: a timestamped likelihood/impact judgment against a risk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::risk::MAX_TEXT_LENGTH;
use super::scale::{Impact, Likelihood};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{AssessmentId, ImpactId, LikelihoodId, RiskId, UserId};

/// Likelihood/impact judgment recorded by an assessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub risk_id: RiskId,
    pub likelihood_id: LikelihoodId,
    pub impact_id: ImpactId,
    pub assessment_date: DateTime<Utc>,
    pub assessor_id: UserId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    /// Record a new assessment
    ///
    /// The assessment date may not lie in the future.
    pub fn new(
        id: AssessmentId,
        risk_id: RiskId,
        likelihood_id: LikelihoodId,
        impact_id: ImpactId,
        assessment_date: DateTime<Utc>,
        assessor_id: UserId,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        Self::validate_date(assessment_date, now)?;
        Self::validate_notes(notes.as_deref())?;

        Ok(Self {
            id,
            risk_id,
            likelihood_id,
            impact_id,
            assessment_date,
            assessor_id,
            notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Change the assessment date
    pub fn reschedule(&mut self, assessment_date: DateTime<Utc>) -> DomainResult<()> {
        let now = Utc::now();
        Self::validate_date(assessment_date, now)?;
        self.assessment_date = assessment_date;
        self.updated_at = now;
        Ok(())
    }

    /// Replace the likelihood/impact judgment
    pub fn rescore(&mut self, likelihood_id: LikelihoodId, impact_id: ImpactId) {
        self.likelihood_id = likelihood_id;
        self.impact_id = impact_id;
        self.updated_at = Utc::now();
    }

    /// Replace the notes
    pub fn annotate(&mut self, notes: Option<String>) -> DomainResult<()> {
        Self::validate_notes(notes.as_deref())?;
        self.notes = notes;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attach the assessment to another risk
    pub fn move_to(&mut self, risk_id: RiskId) {
        self.risk_id = risk_id;
        self.updated_at = Utc::now();
    }

    /// Ordering key for "latest" selection: date first, then creation order
    pub fn recency_key(&self) -> (DateTime<Utc>, AssessmentId) {
        (self.assessment_date, self.id)
    }

    fn validate_date(date: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
        if date > now {
            return Err(DomainError::validation(
                "assessment_date",
                "Assessment date cannot be in the future",
            ));
        }
        Ok(())
    }

    fn validate_notes(notes: Option<&str>) -> DomainResult<()> {
        if notes.is_some_and(|n| n.chars().count() > MAX_TEXT_LENGTH) {
            return Err(DomainError::validation(
                "notes",
                format!("Notes cannot exceed {} characters", MAX_TEXT_LENGTH),
            ));
        }
        Ok(())
    }
}

/// An assessment together with its resolved scale scores
///
/// A missing score means the referenced likelihood or impact entry could not
/// be resolved. Such assessments never count as the latest one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAssessment {
    pub assessment: Assessment,
    pub likelihood_score: Option<u8>,
    pub impact_score: Option<u8>,
}

impl ScoredAssessment {
    /// Pair an assessment with whatever scale entries could be resolved
    pub fn resolve(
        assessment: Assessment,
        likelihood: Option<&Likelihood>,
        impact: Option<&Impact>,
    ) -> Self {
        Self {
            assessment,
            likelihood_score: likelihood.map(|l| l.score),
            impact_score: impact.map(|i| i.score),
        }
    }

    /// Build directly from raw scores
    pub fn with_scores(assessment: Assessment, likelihood_score: u8, impact_score: u8) -> Self {
        Self {
            assessment,
            likelihood_score: Some(likelihood_score),
            impact_score: Some(impact_score),
        }
    }

    /// `likelihood * impact`, or `None` when either score is missing or off-scale
    pub fn score(&self) -> Option<u32> {
        let likelihood = self.likelihood_score.filter(|s| Likelihood::SCALE.contains(s))?;
        let impact = self.impact_score.filter(|s| Impact::SCALE.contains(s))?;
        Some(u32::from(likelihood) * u32::from(impact))
    }

    pub fn is_valid(&self) -> bool {
        self.score().is_some()
    }
}
