//! Risk entity representing an entry in an organization's risk register

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::scoring::RiskEvaluation;
use crate::value_objects::{CategoryId, OrganizationId, RiskId, RiskLevel, RiskStatus, UserId};

/// Maximum length of a risk title
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum length of free-text fields
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// A tracked hazard owned by an organization
///
/// `status` and `risk_score` are derived values: they are only changed through
/// [`Risk::apply_evaluation`] (engine output) or [`Risk::set_status`] (explicit
/// user action such as closing the risk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    id: RiskId,
    organization_id: OrganizationId,
    owner_id: UserId,
    category_id: CategoryId,
    title: String,
    description: Option<String>,
    status: RiskStatus,
    risk_score: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Risk {
    /// Register a new risk in the `Identified` state
    pub fn new(
        id: RiskId,
        organization_id: OrganizationId,
        owner_id: UserId,
        category_id: CategoryId,
        title: String,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let title = Self::validate_title(title)?;
        Self::validate_description(description.as_deref())?;

        let now = Utc::now();
        Ok(Self {
            id,
            organization_id,
            owner_id,
            category_id,
            title,
            description,
            status: RiskStatus::Identified,
            risk_score: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> RiskId {
        self.id
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> RiskStatus {
        self.status
    }

    /// Score of the latest assessment, 0 when unassessed
    pub fn risk_score(&self) -> u32 {
        self.risk_score
    }

    /// Severity band of the current score
    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Update the title with validation
    pub fn update_title(&mut self, title: String) -> DomainResult<()> {
        self.title = Self::validate_title(title)?;
        self.touch();
        Ok(())
    }

    /// Update the free-text description
    pub fn update_description(&mut self, description: Option<String>) -> DomainResult<()> {
        Self::validate_description(description.as_deref())?;
        self.description = description;
        self.touch();
        Ok(())
    }

    /// Reassign the risk owner
    pub fn reassign(&mut self, owner_id: UserId) {
        self.owner_id = owner_id;
        self.touch();
    }

    /// Move the risk to another category
    pub fn recategorize(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.touch();
    }

    /// Explicitly set the lifecycle status (user action)
    pub fn set_status(&mut self, status: RiskStatus) {
        self.status = status;
        self.touch();
    }

    /// Store the engine's latest evaluation
    ///
    /// Returns `true` when either the score or the status changed.
    pub fn apply_evaluation(&mut self, evaluation: &RiskEvaluation) -> bool {
        let changed = self.risk_score != evaluation.score || self.status != evaluation.status;
        if changed {
            self.risk_score = evaluation.score;
            self.status = evaluation.status;
            self.touch();
        }
        changed
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn validate_title(title: String) -> DomainResult<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("title", "Risk title cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("Risk title cannot exceed {} characters", MAX_TITLE_LENGTH),
            ));
        }
        Ok(trimmed.to_string())
    }

    fn validate_description(description: Option<&str>) -> DomainResult<()> {
        if description.is_some_and(|d| d.chars().count() > MAX_TEXT_LENGTH) {
            return Err(DomainError::validation(
                "description",
                format!("Description cannot exceed {} characters", MAX_TEXT_LENGTH),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk() -> Risk {
        Risk::new(
            RiskId::new(1),
            OrganizationId::new(1),
            UserId::new(1),
            CategoryId::new(1),
            "Supplier insolvency".to_string(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_new_risk_is_identified_with_zero_score() {
        let risk = risk();
        assert_eq!(risk.status(), RiskStatus::Identified);
        assert_eq!(risk.risk_score(), 0);
        assert_eq!(risk.level(), RiskLevel::None);
    }

    #[test]
    fn test_title_is_trimmed_and_validated() {
        let mut risk = risk();
        risk.update_title("  Data breach  ".to_string()).unwrap();
        assert_eq!(risk.title(), "Data breach");

        assert!(risk.update_title("   ".to_string()).is_err());
        assert!(risk.update_title("x".repeat(256)).is_err());
        assert!(risk.update_title("x".repeat(255)).is_ok());
    }

    #[test]
    fn test_apply_evaluation_reports_changes() {
        let mut risk = risk();
        let evaluation = RiskEvaluation {
            score: 12,
            status: RiskStatus::Assessed,
            level: RiskLevel::Medium,
        };
        assert!(risk.apply_evaluation(&evaluation));
        assert!(!risk.apply_evaluation(&evaluation));
        assert_eq!(risk.risk_score(), 12);
        assert_eq!(risk.status(), RiskStatus::Assessed);
    }
}
