//! Mitigation action DTOs and commands

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use erm_domain::entities::MitigationAction;
use erm_domain::value_objects::{MitigationActionId, MitigationStatus, RiskId, UserId};

/// Command to plan a mitigation action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMitigationCommand {
    pub risk_id: RiskId,
    pub assigned_to: UserId,
    pub description: String,
    pub due_date: DateTime<Utc>,
    /// Defaults to `Planned`
    pub status: Option<MitigationStatus>,
}

/// Partial update of a mitigation action; `None` leaves a field as is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMitigationCommand {
    pub assigned_to: Option<UserId>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<MitigationStatus>,
}

/// Mitigation action as exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationDto {
    pub id: MitigationActionId,
    pub risk_id: RiskId,
    pub assigned_to: UserId,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: MitigationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MitigationDto {
    pub fn from_domain(action: &MitigationAction) -> Self {
        Self {
            id: action.id,
            risk_id: action.risk_id,
            assigned_to: action.assigned_to,
            description: action.description.clone(),
            due_date: action.due_date,
            status: action.status,
            created_at: action.created_at,
            updated_at: action.updated_at,
        }
    }
}

/// Outcome of an overdue sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverdueSweepDto {
    /// Actions flagged `Overdue` by this sweep
    pub marked_overdue: Vec<MitigationActionId>,
    /// Risks whose score or status changed as a result
    pub risks_recalculated: Vec<RiskId>,
}
