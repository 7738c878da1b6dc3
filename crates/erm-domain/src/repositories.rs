//! Repository interfaces for data persistence
//!
//! These interfaces define the contracts for data access. Implementations
//! are provided by infrastructure crates; the domain layer defines only the
//! traits and the filter value objects they accept.

use async_trait::async_trait;

use crate::{entities::*, errors::*, value_objects::*};

/// Filter for risk listings; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFilter {
    pub organization_id: Option<OrganizationId>,
    pub status: Option<RiskStatus>,
    pub category_id: Option<CategoryId>,
    pub owner_id: Option<UserId>,
}

impl RiskFilter {
    /// Restrict to one organization
    pub fn for_organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, risk: &Risk) -> bool {
        self.organization_id
            .map_or(true, |id| risk.organization_id() == id)
            && self.status.map_or(true, |status| risk.status() == status)
            && self.category_id.map_or(true, |id| risk.category_id() == id)
            && self.owner_id.map_or(true, |id| risk.owner_id() == id)
    }
}

/// Filter for assessment listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentFilter {
    pub risk_id: Option<RiskId>,
    pub assessor_id: Option<UserId>,
}

impl AssessmentFilter {
    pub fn matches(&self, assessment: &Assessment) -> bool {
        self.risk_id.map_or(true, |id| assessment.risk_id == id)
            && self.assessor_id.map_or(true, |id| assessment.assessor_id == id)
    }
}

/// Filter for mitigation action listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MitigationFilter {
    pub risk_id: Option<RiskId>,
    pub assigned_to: Option<UserId>,
    pub status: Option<MitigationStatus>,
}

impl MitigationFilter {
    pub fn matches(&self, action: &MitigationAction) -> bool {
        self.risk_id.map_or(true, |id| action.risk_id == id)
            && self.assigned_to.map_or(true, |id| action.assigned_to == id)
            && self.status.map_or(true, |status| action.status == status)
    }
}

/// Repository for risk entities
#[async_trait]
pub trait RiskRepository: Send + Sync {
    /// Reserve the next identifier
    async fn next_id(&self) -> DomainResult<RiskId>;

    /// Insert or replace a risk
    async fn save(&self, risk: &Risk) -> DomainResult<()>;

    async fn find_by_id(&self, id: RiskId) -> DomainResult<Option<Risk>>;

    /// Risks matching the filter, in id order
    async fn find_all(&self, filter: &RiskFilter) -> DomainResult<Vec<Risk>>;

    async fn delete(&self, id: RiskId) -> DomainResult<()>;

    async fn exists(&self, id: RiskId) -> DomainResult<bool>;
}

/// Repository for assessment entities
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn next_id(&self) -> DomainResult<AssessmentId>;

    async fn save(&self, assessment: &Assessment) -> DomainResult<()>;

    async fn find_by_id(&self, id: AssessmentId) -> DomainResult<Option<Assessment>>;

    /// All assessments of one risk, in id order
    async fn find_by_risk(&self, risk_id: RiskId) -> DomainResult<Vec<Assessment>>;

    async fn find_all(&self, filter: &AssessmentFilter) -> DomainResult<Vec<Assessment>>;

    async fn delete(&self, id: AssessmentId) -> DomainResult<()>;

    /// Remove every assessment of a risk, returning how many were removed
    async fn delete_by_risk(&self, risk_id: RiskId) -> DomainResult<usize>;
}

/// Repository for mitigation action entities
#[async_trait]
pub trait MitigationActionRepository: Send + Sync {
    async fn next_id(&self) -> DomainResult<MitigationActionId>;

    async fn save(&self, action: &MitigationAction) -> DomainResult<()>;

    async fn find_by_id(&self, id: MitigationActionId) -> DomainResult<Option<MitigationAction>>;

    async fn find_by_risk(&self, risk_id: RiskId) -> DomainResult<Vec<MitigationAction>>;

    async fn find_all(&self, filter: &MitigationFilter) -> DomainResult<Vec<MitigationAction>>;

    async fn delete(&self, id: MitigationActionId) -> DomainResult<()>;

    async fn delete_by_risk(&self, risk_id: RiskId) -> DomainResult<usize>;
}

/// Read-only access to the likelihood and impact reference scales
#[async_trait]
pub trait ScaleRepository: Send + Sync {
    async fn find_likelihood(&self, id: LikelihoodId) -> DomainResult<Option<Likelihood>>;

    async fn find_impact(&self, id: ImpactId) -> DomainResult<Option<Impact>>;

    async fn list_likelihoods(&self) -> DomainResult<Vec<Likelihood>>;

    async fn list_impacts(&self) -> DomainResult<Vec<Impact>>;
}

/// Repository for risk categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn next_id(&self) -> DomainResult<CategoryId>;

    async fn save(&self, category: &RiskCategory) -> DomainResult<()>;

    async fn find_by_id(&self, id: CategoryId) -> DomainResult<Option<RiskCategory>>;

    async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> DomainResult<Vec<RiskCategory>>;
}

/// Repository for organizations
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn next_id(&self) -> DomainResult<OrganizationId>;

    /// Insert or replace; names are unique
    async fn save(&self, organization: &Organization) -> DomainResult<()>;

    async fn find_by_id(&self, id: OrganizationId) -> DomainResult<Option<Organization>>;
}

/// Repository for platform users
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn next_id(&self) -> DomainResult<UserId>;

    async fn save(&self, user: &User) -> DomainResult<()>;

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    /// Lookup by normalized (lower-case) email
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Users of one organization, in id order
    async fn find_by_organization(&self, organization_id: OrganizationId)
        -> DomainResult<Vec<User>>;

    async fn delete(&self, id: UserId) -> DomainResult<()>;
}
