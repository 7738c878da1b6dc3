//! Reference data DTOs: scales, categories and the organization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use erm_domain::entities::{Impact, Likelihood, Organization, RiskCategory};
use erm_domain::value_objects::{CategoryId, OrganizationId};

/// One entry of the likelihood or impact scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleEntryDto {
    pub id: i64,
    pub level: String,
    pub score: u8,
    pub description: String,
}

impl From<&Likelihood> for ScaleEntryDto {
    fn from(likelihood: &Likelihood) -> Self {
        Self {
            id: likelihood.id.value(),
            level: likelihood.level.clone(),
            score: likelihood.score,
            description: likelihood.description.clone(),
        }
    }
}

impl From<&Impact> for ScaleEntryDto {
    fn from(impact: &Impact) -> Self {
        Self {
            id: impact.id.value(),
            level: impact.level.clone(),
            score: impact.score,
            description: impact.description.clone(),
        }
    }
}

/// Risk category as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: CategoryId,
    pub name: String,
    pub parent_category_id: Option<CategoryId>,
}

impl From<&RiskCategory> for CategoryDto {
    fn from(category: &RiskCategory) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            parent_category_id: category.parent_category_id,
        }
    }
}

/// Organization as exposed to its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDto {
    pub id: OrganizationId,
    pub name: String,
    pub industry: String,
    pub subscription_start: DateTime<Utc>,
    pub subscription_end: DateTime<Utc>,
    pub subscription_active: bool,
}

impl OrganizationDto {
    pub fn from_domain(organization: &Organization, now: DateTime<Utc>) -> Self {
        Self {
            id: organization.id,
            name: organization.name.clone(),
            industry: organization.industry.clone(),
            subscription_start: organization.subscription_start,
            subscription_end: organization.subscription_end,
            subscription_active: organization.is_subscribed_at(now),
        }
    }
}
