//! Risk DTOs and commands

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use erm_domain::entities::Risk;
use erm_domain::value_objects::{
    CategoryId, OrganizationId, RiskId, RiskLevel, RiskStatus, UserId,
};

/// Command to register a new risk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRiskCommand {
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    /// Defaults to the creating user
    pub owner_id: Option<UserId>,
}

/// Partial update of a risk's descriptive fields; `None` leaves a field as is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRiskCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub owner_id: Option<UserId>,
}

/// Risk as exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDto {
    pub id: RiskId,
    pub organization_id: OrganizationId,
    pub owner_id: UserId,
    pub category_id: CategoryId,
    pub title: String,
    pub description: Option<String>,
    pub status: RiskStatus,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RiskDto {
    pub fn from_domain(risk: &Risk) -> Self {
        Self {
            id: risk.id(),
            organization_id: risk.organization_id(),
            owner_id: risk.owner_id(),
            category_id: risk.category_id(),
            title: risk.title().to_string(),
            description: risk.description().map(str::to_string),
            status: risk.status(),
            risk_score: risk.risk_score(),
            risk_level: risk.level(),
            created_at: risk.created_at(),
            updated_at: risk.updated_at(),
        }
    }
}

/// Aggregate view of an organization's risk register
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskOverviewDto {
    pub total: usize,
    /// Count per lifecycle status; every status is present
    pub by_status: BTreeMap<String, usize>,
    /// Count per severity band; every band is present
    pub by_level: BTreeMap<String, usize>,
    /// Mean score over risks that have been scored, 0 when none have
    pub average_score: f64,
    pub highest_score: u32,
}

impl RiskOverviewDto {
    pub fn from_risks(risks: &[Risk]) -> Self {
        let mut by_status: BTreeMap<String, usize> =
            RiskStatus::ALL.iter().map(|s| (s.to_string(), 0)).collect();
        let mut by_level: BTreeMap<String, usize> =
            RiskLevel::ALL.iter().map(|l| (l.to_string(), 0)).collect();

        for risk in risks {
            *by_status.entry(risk.status().to_string()).or_default() += 1;
            *by_level.entry(risk.level().to_string()).or_default() += 1;
        }

        let scored: Vec<u32> = risks
            .iter()
            .map(Risk::risk_score)
            .filter(|score| *score > 0)
            .collect();
        let average_score = if scored.is_empty() {
            0.0
        } else {
            f64::from(scored.iter().sum::<u32>()) / scored.len() as f64
        };

        Self {
            total: risks.len(),
            by_status,
            by_level,
            average_score,
            highest_score: scored.iter().copied().max().unwrap_or(0),
        }
    }
}
