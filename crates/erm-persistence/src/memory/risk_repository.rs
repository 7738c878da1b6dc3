//! In-Memory Risk Repository Implementation

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::Risk,
    errors::DomainResult,
    repositories::{RiskFilter, RiskRepository},
    value_objects::RiskId,
};

use super::sequence::IdSequence;
use crate::error::PersistenceError;

/// Thread-safe in-memory implementation of RiskRepository
///
/// Rows are kept in a `BTreeMap` so listings come back in id (creation) order.
#[derive(Debug)]
pub struct InMemoryRiskRepository {
    risks: RwLock<BTreeMap<RiskId, Risk>>,
    sequence: IdSequence,
}

impl Default for InMemoryRiskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRiskRepository {
    /// Create a new empty in-memory risk repository
    pub fn new() -> Self {
        Self {
            risks: RwLock::new(BTreeMap::new()),
            sequence: IdSequence::new("risks"),
        }
    }

    /// Create with initial risks (useful for testing)
    pub fn with_risks(risks: Vec<Risk>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.risks.write();
            for risk in risks {
                repo.sequence.observe(risk.id().value());
                map.insert(risk.id(), risk);
            }
        }
        repo
    }

    /// Get the current count of risks (for testing)
    pub fn count(&self) -> usize {
        self.risks.read().len()
    }

    /// Clear all risks (for testing)
    pub fn clear(&self) {
        self.risks.write().clear();
    }
}

#[async_trait]
impl RiskRepository for InMemoryRiskRepository {
    async fn next_id(&self) -> DomainResult<RiskId> {
        Ok(RiskId::new(self.sequence.next()?))
    }

    async fn save(&self, risk: &Risk) -> DomainResult<()> {
        self.sequence.observe(risk.id().value());
        self.risks.write().insert(risk.id(), risk.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RiskId) -> DomainResult<Option<Risk>> {
        Ok(self.risks.read().get(&id).cloned())
    }

    async fn find_all(&self, filter: &RiskFilter) -> DomainResult<Vec<Risk>> {
        let risks = self.risks.read();
        Ok(risks
            .values()
            .filter(|risk| filter.matches(risk))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: RiskId) -> DomainResult<()> {
        self.risks
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::not_found("Risk", id).into())
    }

    async fn exists(&self, id: RiskId) -> DomainResult<bool> {
        Ok(self.risks.read().contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erm_domain::value_objects::{CategoryId, OrganizationId, RiskStatus, UserId};

    fn create_test_risk(repo: &InMemoryRiskRepository, org: i64, title: &str) -> Risk {
        let id = repo.sequence.next().unwrap();
        Risk::new(
            RiskId::new(id),
            OrganizationId::new(org),
            UserId::new(1),
            CategoryId::new(1),
            title.to_string(),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = InMemoryRiskRepository::new();
        let risk = create_test_risk(&repo, 1, "Currency exposure");
        repo.save(&risk).await.unwrap();

        let found = repo.find_by_id(risk.id()).await.unwrap();
        assert_eq!(found.map(|r| r.title().to_string()), Some("Currency exposure".to_string()));
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let repo = InMemoryRiskRepository::new();
        assert!(repo.find_by_id(RiskId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_id_is_monotonic() {
        let repo = InMemoryRiskRepository::new();
        let a = repo.next_id().await.unwrap();
        let b = repo.next_id().await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_find_all_filters_and_orders() {
        let repo = InMemoryRiskRepository::new();
        let mut closed = create_test_risk(&repo, 1, "Closed one");
        closed.set_status(RiskStatus::Closed);
        let other_org = create_test_risk(&repo, 2, "Other org");
        let open = create_test_risk(&repo, 1, "Open one");

        repo.save(&open).await.unwrap();
        repo.save(&other_org).await.unwrap();
        repo.save(&closed).await.unwrap();

        let org_one = repo
            .find_all(&RiskFilter::for_organization(OrganizationId::new(1)))
            .await
            .unwrap();
        let ids: Vec<_> = org_one.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![closed.id(), open.id()]);

        let filter = RiskFilter {
            status: Some(RiskStatus::Closed),
            ..RiskFilter::default()
        };
        assert_eq!(repo.find_all(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryRiskRepository::new();
        let risk = create_test_risk(&repo, 1, "To delete");
        repo.save(&risk).await.unwrap();
        assert!(repo.exists(risk.id()).await.unwrap());

        repo.delete(risk.id()).await.unwrap();
        assert!(!repo.exists(risk.id()).await.unwrap());
        assert!(repo.delete(risk.id()).await.is_err());
    }

    #[tokio::test]
    async fn test_with_initial_risks_advances_sequence() {
        let seed = InMemoryRiskRepository::new();
        let risks = vec![
            create_test_risk(&seed, 1, "init-1"),
            create_test_risk(&seed, 1, "init-2"),
        ];
        let repo = InMemoryRiskRepository::with_risks(risks);

        assert_eq!(repo.count(), 2);
        assert_eq!(repo.next_id().await.unwrap(), RiskId::new(3));

        repo.clear();
        assert_eq!(repo.count(), 0);
    }
}
