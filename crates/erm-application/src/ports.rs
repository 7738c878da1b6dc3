//! Application ports
//!
//! Abstractions the application layer depends on that are not repositories.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use erm_domain::repositories::{
    AssessmentRepository, CategoryRepository, MitigationActionRepository, OrganizationRepository,
    RiskRepository, ScaleRepository, UserRepository,
};

use crate::errors::ApplicationResult;

/// Repository handles the services are constructed with
#[derive(Clone)]
pub struct Repositories {
    pub risks: Arc<dyn RiskRepository>,
    pub assessments: Arc<dyn AssessmentRepository>,
    pub mitigations: Arc<dyn MitigationActionRepository>,
    pub scales: Arc<dyn ScaleRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Transaction boundary for write use cases
///
/// Work passed to [`UnitOfWork::execute`] runs while holding an exclusive
/// write guard, so a mutation and the risk recomputation that follows it are
/// never interleaved with another write. Reads do not go through the unit of
/// work. There is no rollback: the in-memory stores apply each save directly.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    write_guard: Mutex<()>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute work within the transaction boundary
    pub async fn execute<T, F>(&self, work: F) -> ApplicationResult<T>
    where
        F: Future<Output = ApplicationResult<T>>,
    {
        let _guard = self.write_guard.lock().await;
        work.await
    }
}
