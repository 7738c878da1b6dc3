//! In-Memory Mitigation Action Repository Implementation

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::MitigationAction,
    errors::DomainResult,
    repositories::{MitigationActionRepository, MitigationFilter},
    value_objects::{MitigationActionId, RiskId},
};

use super::sequence::IdSequence;
use crate::error::PersistenceError;

/// Thread-safe in-memory implementation of MitigationActionRepository
#[derive(Debug)]
pub struct InMemoryMitigationRepository {
    actions: RwLock<BTreeMap<MitigationActionId, MitigationAction>>,
    sequence: IdSequence,
}

impl Default for InMemoryMitigationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMitigationRepository {
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(BTreeMap::new()),
            sequence: IdSequence::new("mitigation_actions"),
        }
    }

    /// Get the current count of actions (for testing)
    pub fn count(&self) -> usize {
        self.actions.read().len()
    }

    /// Clear all actions (for testing)
    pub fn clear(&self) {
        self.actions.write().clear();
    }
}

#[async_trait]
impl MitigationActionRepository for InMemoryMitigationRepository {
    async fn next_id(&self) -> DomainResult<MitigationActionId> {
        Ok(MitigationActionId::new(self.sequence.next()?))
    }

    async fn save(&self, action: &MitigationAction) -> DomainResult<()> {
        self.sequence.observe(action.id.value());
        self.actions.write().insert(action.id, action.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: MitigationActionId) -> DomainResult<Option<MitigationAction>> {
        Ok(self.actions.read().get(&id).cloned())
    }

    async fn find_by_risk(&self, risk_id: RiskId) -> DomainResult<Vec<MitigationAction>> {
        let filter = MitigationFilter {
            risk_id: Some(risk_id),
            ..MitigationFilter::default()
        };
        self.find_all(&filter).await
    }

    async fn find_all(&self, filter: &MitigationFilter) -> DomainResult<Vec<MitigationAction>> {
        let actions = self.actions.read();
        Ok(actions
            .values()
            .filter(|action| filter.matches(action))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: MitigationActionId) -> DomainResult<()> {
        self.actions
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::not_found("MitigationAction", id).into())
    }

    async fn delete_by_risk(&self, risk_id: RiskId) -> DomainResult<usize> {
        let mut actions = self.actions.write();
        let before = actions.len();
        actions.retain(|_, action| action.risk_id != risk_id);
        Ok(before - actions.len())
    }
}
