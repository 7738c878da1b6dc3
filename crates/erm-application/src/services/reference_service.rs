//! Reference data: likelihood/impact scales, risk categories and the
//! organizations they belong to

use chrono::{DateTime, Utc};
use tracing::info;

use erm_domain::entities::{Organization, RiskCategory};
use erm_domain::value_objects::{OrganizationId, Permission};

use crate::dto::{Actor, CategoryDto, OrganizationDto, ScaleEntryDto};
use crate::errors::{ApplicationError, ApplicationResult};
use crate::ports::Repositories;

/// Access to reference data
pub struct ReferenceDataService {
    repos: Repositories,
}

impl ReferenceDataService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Likelihood scale, lowest score first
    pub async fn list_likelihoods(&self, actor: &Actor) -> ApplicationResult<Vec<ScaleEntryDto>> {
        actor.require(Permission::Read)?;
        let mut likelihoods = self.repos.scales.list_likelihoods().await?;
        likelihoods.sort_by_key(|l| (l.score, l.id));
        Ok(likelihoods.iter().map(ScaleEntryDto::from).collect())
    }

    /// Impact scale, lowest score first
    pub async fn list_impacts(&self, actor: &Actor) -> ApplicationResult<Vec<ScaleEntryDto>> {
        actor.require(Permission::Read)?;
        let mut impacts = self.repos.scales.list_impacts().await?;
        impacts.sort_by_key(|i| (i.score, i.id));
        Ok(impacts.iter().map(ScaleEntryDto::from).collect())
    }

    /// Categories of the caller's organization
    pub async fn list_categories(&self, actor: &Actor) -> ApplicationResult<Vec<CategoryDto>> {
        actor.require(Permission::Read)?;
        let mut categories = self
            .repos
            .categories
            .find_by_organization(actor.organization_id)
            .await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories.iter().map(CategoryDto::from).collect())
    }

    /// The caller's organization; readable by every member
    pub async fn current_organization(&self, actor: &Actor) -> ApplicationResult<OrganizationDto> {
        let organization = self
            .repos
            .organizations
            .find_by_id(actor.organization_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Organization", actor.organization_id))?;
        Ok(OrganizationDto::from_domain(&organization, Utc::now()))
    }

    /// Create the organization unless it already exists
    ///
    /// Returns `false` when it was already present; its details are kept.
    pub async fn ensure_organization(
        &self,
        id: OrganizationId,
        name: &str,
        industry: &str,
        subscription_start: DateTime<Utc>,
        subscription_end: DateTime<Utc>,
    ) -> ApplicationResult<bool> {
        if self.repos.organizations.find_by_id(id).await?.is_some() {
            return Ok(false);
        }
        let organization =
            Organization::new(id, name, industry, subscription_start, subscription_end)?;
        self.repos.organizations.save(&organization).await?;
        info!(organization_id = %id, name = %organization.name, "Organization created");
        Ok(true)
    }

    /// Create any of the named categories the organization lacks
    ///
    /// Returns how many were created.
    pub async fn seed_categories(
        &self,
        organization_id: OrganizationId,
        names: &[String],
    ) -> ApplicationResult<usize> {
        let existing = self
            .repos
            .categories
            .find_by_organization(organization_id)
            .await?;
        let mut created = 0;
        for name in names {
            if existing.iter().any(|c| c.name.eq_ignore_ascii_case(name.trim())) {
                continue;
            }
            let category = RiskCategory::new(
                self.repos.categories.next_id().await?,
                organization_id,
                name.as_str(),
                None,
            )?;
            self.repos.categories.save(&category).await?;
            created += 1;
        }
        if created > 0 {
            info!(organization_id = %organization_id, created, "Risk categories seeded");
        }
        Ok(created)
    }
}
