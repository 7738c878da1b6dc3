//! Organization-scoped risk categories

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{CategoryId, OrganizationId};

/// Category grouping related risks, optionally nested under a parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub id: CategoryId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub parent_category_id: Option<CategoryId>,
}

impl RiskCategory {
    pub fn new(
        id: CategoryId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        parent_category_id: Option<CategoryId>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Category name cannot be empty"));
        }
        if parent_category_id == Some(id) {
            return Err(DomainError::BusinessRuleViolation {
                rule: "A category cannot be its own parent".to_string(),
            });
        }
        Ok(Self {
            id,
            organization_id,
            name,
            parent_category_id,
        })
    }
}
