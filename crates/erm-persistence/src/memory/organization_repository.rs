//! In-Memory Organization Repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::Organization, errors::DomainResult, repositories::OrganizationRepository,
    value_objects::OrganizationId,
};

use super::sequence::IdSequence;
use crate::error::PersistenceError;

/// Thread-safe in-memory implementation of OrganizationRepository
///
/// Names are unique, compared case-insensitively.
#[derive(Debug)]
pub struct InMemoryOrganizationRepository {
    organizations: RwLock<BTreeMap<OrganizationId, Organization>>,
    sequence: IdSequence,
}

impl Default for InMemoryOrganizationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self {
            organizations: RwLock::new(BTreeMap::new()),
            sequence: IdSequence::new("organizations"),
        }
    }

    pub fn count(&self) -> usize {
        self.organizations.read().len()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn next_id(&self) -> DomainResult<OrganizationId> {
        Ok(OrganizationId::new(self.sequence.next()?))
    }

    async fn save(&self, organization: &Organization) -> DomainResult<()> {
        let mut organizations = self.organizations.write();
        let taken = organizations.values().any(|existing| {
            existing.id != organization.id
                && existing.name.eq_ignore_ascii_case(&organization.name)
        });
        if taken {
            return Err(
                PersistenceError::duplicate("Organization", organization.name.as_str()).into(),
            );
        }
        self.sequence.observe(organization.id.value());
        organizations.insert(organization.id, organization.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrganizationId) -> DomainResult<Option<Organization>> {
        Ok(self.organizations.read().get(&id).cloned())
    }
}
