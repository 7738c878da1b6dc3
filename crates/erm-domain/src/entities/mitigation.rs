//! Mitigation action entity: a remediation task addressing a risk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::risk::MAX_TEXT_LENGTH;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{MitigationActionId, MitigationStatus, RiskId, UserId};

/// Remediation task with its own due date and status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationAction {
    pub id: MitigationActionId,
    pub risk_id: RiskId,
    pub assigned_to: UserId,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: MitigationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MitigationAction {
    /// Plan a new mitigation action
    pub fn new(
        id: MitigationActionId,
        risk_id: RiskId,
        assigned_to: UserId,
        description: String,
        due_date: DateTime<Utc>,
        status: MitigationStatus,
    ) -> DomainResult<Self> {
        let description = Self::validate_description(description)?;
        let now = Utc::now();
        Ok(Self {
            id,
            risk_id,
            assigned_to,
            description,
            due_date,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Past its due date without being completed
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.due_date < now
    }

    /// Flag the action as overdue if it is past due
    ///
    /// Returns `true` when the status changed. `Completed` and already
    /// `Overdue` actions are left untouched.
    pub fn mark_overdue_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == MitigationStatus::Overdue || !self.is_overdue_at(now) {
            return false;
        }
        self.status = MitigationStatus::Overdue;
        self.updated_at = now;
        true
    }

    /// Explicit status change
    pub fn set_status(&mut self, status: MitigationStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn update_description(&mut self, description: String) -> DomainResult<()> {
        self.description = Self::validate_description(description)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move the due date; an `Overdue` status is kept until explicitly changed
    pub fn reschedule(&mut self, due_date: DateTime<Utc>) {
        self.due_date = due_date;
        self.updated_at = Utc::now();
    }

    pub fn reassign(&mut self, assigned_to: UserId) {
        self.assigned_to = assigned_to;
        self.updated_at = Utc::now();
    }

    fn validate_description(description: String) -> DomainResult<String> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(
                "description",
                "Mitigation description cannot be empty",
            ));
        }
        if trimmed.chars().count() > MAX_TEXT_LENGTH {
            return Err(DomainError::validation(
                "description",
                format!("Description cannot exceed {} characters", MAX_TEXT_LENGTH),
            ));
        }
        Ok(trimmed.to_string())
    }
}
