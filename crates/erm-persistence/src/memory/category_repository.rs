//! In-Memory Risk Category Repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::RiskCategory,
    errors::DomainResult,
    repositories::CategoryRepository,
    value_objects::{CategoryId, OrganizationId},
};

use super::sequence::IdSequence;

/// Thread-safe in-memory implementation of CategoryRepository
#[derive(Debug)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<BTreeMap<CategoryId, RiskCategory>>,
    sequence: IdSequence,
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(BTreeMap::new()),
            sequence: IdSequence::new("risk_categories"),
        }
    }

    pub fn count(&self) -> usize {
        self.categories.read().len()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn next_id(&self) -> DomainResult<CategoryId> {
        Ok(CategoryId::new(self.sequence.next()?))
    }

    async fn save(&self, category: &RiskCategory) -> DomainResult<()> {
        self.sequence.observe(category.id.value());
        self.categories.write().insert(category.id, category.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CategoryId) -> DomainResult<Option<RiskCategory>> {
        Ok(self.categories.read().get(&id).cloned())
    }

    async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> DomainResult<Vec<RiskCategory>> {
        Ok(self
            .categories
            .read()
            .values()
            .filter(|category| category.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_categories_are_scoped_by_organization() {
        let repo = InMemoryCategoryRepository::new();
        for (org, name) in [(1, "Operational"), (1, "Financial"), (2, "Strategic")] {
            let category = RiskCategory::new(
                repo.next_id().await.unwrap(),
                OrganizationId::new(org),
                name,
                None,
            )
            .unwrap();
            repo.save(&category).await.unwrap();
        }

        let first = repo.find_by_organization(OrganizationId::new(1)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(repo.count(), 3);
    }
}
