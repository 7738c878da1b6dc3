//! Risk scoring and status lifecycle engine
//!
//! Turns a risk's assessments into a numeric score and, together with its
//! mitigation actions, into an aggregate lifecycle status:
//!
//! ```text
//! Identified ──assess──▶ Assessed ──plan action──▶ Mitigating ──complete all──▶ Monitored
//!      ▲                                              ▲     │                        │
//!      └────────── last assessment removed ───────────┴─────┴── new open action ─────┘
//!
//!                 any state ──explicit close──▶ Closed (never left automatically)
//! ```
//!
//! Every function here is pure: inputs are plain values and nothing is
//! persisted. Callers resolve likelihood/impact scores beforehand and store the
//! result afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{MitigationAction, Risk, ScoredAssessment};
use crate::value_objects::{MitigationActionId, RiskLevel, RiskStatus};

/// Score, status and severity band computed for one risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEvaluation {
    pub score: u32,
    pub status: RiskStatus,
    pub level: RiskLevel,
}

/// Result of an overdue sweep over mitigation actions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverdueRefresh {
    /// All input actions, with past-due ones flagged `Overdue`
    pub actions: Vec<MitigationAction>,
    /// Ids whose status changed during the sweep
    pub changed: Vec<MitigationActionId>,
}

impl OverdueRefresh {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Only the actions whose status changed
    pub fn changed_actions(&self) -> impl Iterator<Item = &MitigationAction> {
        self.actions
            .iter()
            .filter(move |action| self.changed.contains(&action.id))
    }
}

/// Stateless scoring engine
pub struct RiskScoringEngine;

impl RiskScoringEngine {
    /// Most recent assessment with resolvable scores
    ///
    /// Latest means the greatest `assessment_date`; on equal dates the highest
    /// id (most recently created) wins, so the result does not depend on input
    /// order.
    pub fn latest(assessments: &[ScoredAssessment]) -> Option<&ScoredAssessment> {
        assessments
            .iter()
            .filter(|scored| scored.is_valid())
            .max_by_key(|scored| scored.assessment.recency_key())
    }

    /// `likelihood * impact` of the latest assessment, 0 when there is none
    pub fn compute_score(assessments: &[ScoredAssessment]) -> u32 {
        Self::latest(assessments)
            .and_then(ScoredAssessment::score)
            .unwrap_or(0)
    }

    /// Lifecycle status implied by the risk's assessments and actions
    ///
    /// A `Closed` risk stays closed; only an explicit user action reopens it.
    pub fn compute_status(
        risk: &Risk,
        assessments: &[ScoredAssessment],
        actions: &[MitigationAction],
    ) -> RiskStatus {
        if risk.is_closed() {
            return RiskStatus::Closed;
        }
        if Self::latest(assessments).is_none() {
            return RiskStatus::Identified;
        }
        if actions.is_empty() {
            return RiskStatus::Assessed;
        }
        if actions.iter().any(|action| action.status.is_open()) {
            RiskStatus::Mitigating
        } else {
            RiskStatus::Monitored
        }
    }

    /// Score, status and level in one pass
    pub fn evaluate(
        risk: &Risk,
        assessments: &[ScoredAssessment],
        actions: &[MitigationAction],
    ) -> RiskEvaluation {
        let score = Self::compute_score(assessments);
        RiskEvaluation {
            score,
            status: Self::compute_status(risk, assessments, actions),
            level: RiskLevel::from_score(score),
        }
    }

    /// Flag every open action whose due date has passed as `Overdue`
    ///
    /// `Completed` actions are never touched and `Overdue` is never
    /// downgraded, even if the due date has since moved into the future.
    pub fn refresh_overdue_actions(
        actions: &[MitigationAction],
        now: DateTime<Utc>,
    ) -> OverdueRefresh {
        let mut refreshed = Vec::with_capacity(actions.len());
        let mut changed = Vec::new();

        for action in actions {
            let mut action = action.clone();
            if action.mark_overdue_if_due(now) {
                changed.push(action.id);
            }
            refreshed.push(action);
        }

        OverdueRefresh {
            actions: refreshed,
            changed,
        }
    }
}
