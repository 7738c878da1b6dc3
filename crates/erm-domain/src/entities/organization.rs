//! Organization entity: the tenant that owns users, categories and risks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::OrganizationId;

/// Subscribing organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub industry: String,
    pub subscription_start: DateTime<Utc>,
    pub subscription_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(
        id: OrganizationId,
        name: impl Into<String>,
        industry: impl Into<String>,
        subscription_start: DateTime<Utc>,
        subscription_end: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation(
                "name",
                "Organization name cannot be empty",
            ));
        }
        if subscription_end <= subscription_start {
            return Err(DomainError::validation(
                "subscription_end",
                "Subscription end date must be after the start date",
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            industry: industry.into().trim().to_string(),
            subscription_start,
            subscription_end,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the subscription covers the given instant
    pub fn is_subscribed_at(&self, at: DateTime<Utc>) -> bool {
        self.subscription_start <= at && at < self.subscription_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_subscription_must_end_after_start() {
        let start = Utc::now();
        let result = Organization::new(OrganizationId::new(1), "Acme", "Retail", start, start);
        assert!(matches!(result, Err(DomainError::ValidationError { .. })));
    }

    #[test]
    fn test_subscription_window() {
        let start = Utc::now();
        let org = Organization::new(
            OrganizationId::new(1),
            " Acme ",
            "Retail",
            start,
            start + Duration::days(30),
        )
        .unwrap();
        assert_eq!(org.name, "Acme");
        assert!(org.is_subscribed_at(start + Duration::days(1)));
        assert!(!org.is_subscribed_at(start + Duration::days(30)));
    }
}
