//! Application state for the API server

use std::sync::Arc;

use chrono::Duration;

use erm_application::events::{EventPublisher, TracingEventPublisher};
use erm_application::{
    AssessmentService, AuthService, AuthSettings, MitigationService, PageRequest,
    ReferenceDataService, Repositories, RiskService, UnitOfWork,
};
use erm_config::{AppConfig, PaginationConfig};
use erm_persistence::{
    InMemoryAssessmentRepository, InMemoryCategoryRepository, InMemoryMitigationRepository,
    InMemoryOrganizationRepository, InMemoryRiskRepository, InMemoryScaleRepository,
    InMemoryUserRepository,
};

/// Application state shared across all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Risk register use cases
    pub risks: Arc<RiskService>,
    /// Assessment use cases
    pub assessments: Arc<AssessmentService>,
    /// Mitigation action use cases
    pub mitigations: Arc<MitigationService>,
    /// Registration, login, token checks and user administration
    pub auth: Arc<AuthService>,
    /// Scales, categories and organizations
    pub reference: Arc<ReferenceDataService>,
    /// Page size limits
    pub pagination: PaginationConfig,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire the services over the given repositories
    pub fn new(
        repos: Repositories,
        events: Arc<dyn EventPublisher>,
        config: &AppConfig,
    ) -> Self {
        let uow = Arc::new(UnitOfWork::new());
        let settings = AuthSettings {
            jwt_secret: config.auth.jwt_secret.clone(),
            token_ttl: Duration::hours(config.auth.token_ttl_hours),
            bcrypt_cost: config.auth.bcrypt_cost,
        };

        Self {
            risks: Arc::new(RiskService::new(
                repos.clone(),
                Arc::clone(&uow),
                Arc::clone(&events),
            )),
            assessments: Arc::new(AssessmentService::new(
                repos.clone(),
                Arc::clone(&uow),
                Arc::clone(&events),
            )),
            mitigations: Arc::new(MitigationService::new(
                repos.clone(),
                Arc::clone(&uow),
                Arc::clone(&events),
            )),
            auth: Arc::new(AuthService::new(
                repos.clone(),
                Arc::clone(&uow),
                events,
                settings,
            )),
            reference: Arc::new(ReferenceDataService::new(repos)),
            pagination: config.pagination.clone(),
            start_time: std::time::Instant::now(),
        }
    }

    /// State backed by fresh in-memory repositories
    ///
    /// Events go to the `erm::events` tracing target.
    pub fn in_memory(config: &AppConfig) -> Self {
        let repos = Repositories {
            risks: Arc::new(InMemoryRiskRepository::new()),
            assessments: Arc::new(InMemoryAssessmentRepository::new()),
            mitigations: Arc::new(InMemoryMitigationRepository::new()),
            scales: Arc::new(InMemoryScaleRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            organizations: Arc::new(InMemoryOrganizationRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        };
        Self::new(repos, Arc::new(TracingEventPublisher), config)
    }

    /// Page request clamped to the configured limits
    pub fn page_request(&self, page: Option<u32>, page_size: Option<u32>) -> PageRequest {
        PageRequest::with_limits(
            page,
            page_size,
            self.pagination.default_page_size,
            self.pagination.max_page_size,
        )
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
