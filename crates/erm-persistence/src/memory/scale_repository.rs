//! In-Memory Likelihood/Impact Scale Repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use erm_domain::{
    entities::{Impact, Likelihood},
    errors::DomainResult,
    repositories::ScaleRepository,
    value_objects::{ImpactId, LikelihoodId},
};

/// Reference scales held in memory
///
/// `new()` seeds the standard 1-5 likelihood and 1-10 impact scales.
#[derive(Debug)]
pub struct InMemoryScaleRepository {
    likelihoods: RwLock<BTreeMap<LikelihoodId, Likelihood>>,
    impacts: RwLock<BTreeMap<ImpactId, Impact>>,
}

impl Default for InMemoryScaleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScaleRepository {
    /// Repository seeded with the standard scales
    pub fn new() -> Self {
        Self::with_scales(Likelihood::standard_scale(), Impact::standard_scale())
    }

    /// Repository holding exactly the given entries
    pub fn with_scales(likelihoods: Vec<Likelihood>, impacts: Vec<Impact>) -> Self {
        Self {
            likelihoods: RwLock::new(likelihoods.into_iter().map(|l| (l.id, l)).collect()),
            impacts: RwLock::new(impacts.into_iter().map(|i| (i.id, i)).collect()),
        }
    }

    /// Remove a likelihood entry (for testing unresolved references)
    pub fn remove_likelihood(&self, id: LikelihoodId) -> Option<Likelihood> {
        self.likelihoods.write().remove(&id)
    }

    /// Remove an impact entry (for testing unresolved references)
    pub fn remove_impact(&self, id: ImpactId) -> Option<Impact> {
        self.impacts.write().remove(&id)
    }
}

#[async_trait]
impl ScaleRepository for InMemoryScaleRepository {
    async fn find_likelihood(&self, id: LikelihoodId) -> DomainResult<Option<Likelihood>> {
        Ok(self.likelihoods.read().get(&id).cloned())
    }

    async fn find_impact(&self, id: ImpactId) -> DomainResult<Option<Impact>> {
        Ok(self.impacts.read().get(&id).cloned())
    }

    async fn list_likelihoods(&self) -> DomainResult<Vec<Likelihood>> {
        Ok(self.likelihoods.read().values().cloned().collect())
    }

    async fn list_impacts(&self) -> DomainResult<Vec<Impact>> {
        Ok(self.impacts.read().values().cloned().collect())
    }
}
