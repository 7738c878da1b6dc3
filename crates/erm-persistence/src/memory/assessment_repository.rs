//! In-Memory Assessment Repository Implementation

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::Assessment,
    errors::DomainResult,
    repositories::{AssessmentFilter, AssessmentRepository},
    value_objects::{AssessmentId, RiskId},
};

use super::sequence::IdSequence;
use crate::error::PersistenceError;

/// Thread-safe in-memory implementation of AssessmentRepository
#[derive(Debug)]
pub struct InMemoryAssessmentRepository {
    assessments: RwLock<BTreeMap<AssessmentId, Assessment>>,
    sequence: IdSequence,
}

impl Default for InMemoryAssessmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self {
            assessments: RwLock::new(BTreeMap::new()),
            sequence: IdSequence::new("assessments"),
        }
    }

    /// Get the current count of assessments (for testing)
    pub fn count(&self) -> usize {
        self.assessments.read().len()
    }

    /// Clear all assessments (for testing)
    pub fn clear(&self) {
        self.assessments.write().clear();
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryAssessmentRepository {
    async fn next_id(&self) -> DomainResult<AssessmentId> {
        Ok(AssessmentId::new(self.sequence.next()?))
    }

    async fn save(&self, assessment: &Assessment) -> DomainResult<()> {
        self.sequence.observe(assessment.id.value());
        self.assessments
            .write()
            .insert(assessment.id, assessment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AssessmentId) -> DomainResult<Option<Assessment>> {
        Ok(self.assessments.read().get(&id).cloned())
    }

    async fn find_by_risk(&self, risk_id: RiskId) -> DomainResult<Vec<Assessment>> {
        let filter = AssessmentFilter {
            risk_id: Some(risk_id),
            ..AssessmentFilter::default()
        };
        self.find_all(&filter).await
    }

    async fn find_all(&self, filter: &AssessmentFilter) -> DomainResult<Vec<Assessment>> {
        let assessments = self.assessments.read();
        Ok(assessments
            .values()
            .filter(|assessment| filter.matches(assessment))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: AssessmentId) -> DomainResult<()> {
        self.assessments
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::not_found("Assessment", id).into())
    }

    async fn delete_by_risk(&self, risk_id: RiskId) -> DomainResult<usize> {
        let mut assessments = self.assessments.write();
        let before = assessments.len();
        assessments.retain(|_, assessment| assessment.risk_id != risk_id);
        Ok(before - assessments.len())
    }
}
