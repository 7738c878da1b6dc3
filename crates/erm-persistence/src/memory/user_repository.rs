//! In-Memory User Repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::User,
    errors::DomainResult,
    repositories::UserRepository,
    value_objects::{OrganizationId, UserId},
};

use super::sequence::IdSequence;
use crate::error::PersistenceError;

/// Thread-safe in-memory implementation of UserRepository
///
/// Emails are unique; saving a second user with a taken email fails.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<UserId, User>>,
    sequence: IdSequence,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            sequence: IdSequence::new("users"),
        }
    }

    pub fn count(&self) -> usize {
        self.users.read().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> DomainResult<UserId> {
        Ok(UserId::new(self.sequence.next()?))
    }

    async fn save(&self, user: &User) -> DomainResult<()> {
        let mut users = self.users.write();
        let taken = users
            .values()
            .any(|existing| existing.id() != user.id() && existing.email() == user.email());
        if taken {
            return Err(PersistenceError::duplicate("User", user.email()).into());
        }
        self.sequence.observe(user.id().value());
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> DomainResult<Vec<User>> {
        Ok(self
            .users
            .read()
            .values()
            .filter(|user| user.organization_id() == organization_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: UserId) -> DomainResult<()> {
        self.users
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::not_found("User", id).into())
    }
}
