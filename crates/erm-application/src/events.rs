//! Application layer events
//!
//! Application events represent completed use cases that are significant
//! to external consumers (audit logs, notifications).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use erm_domain::value_objects::{
    AssessmentId, MitigationActionId, MitigationStatus, RiskId, RiskStatus, UserId,
};

/// Application-level event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApplicationEvent {
    // === Risk Events ===
    /// Risk was registered
    RiskCreated {
        risk_id: RiskId,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Risk details were edited
    RiskUpdated {
        risk_id: RiskId,
        timestamp: DateTime<Utc>,
    },

    /// Score or status changed after recomputation
    RiskRecalculated {
        risk_id: RiskId,
        score: u32,
        status: RiskStatus,
        timestamp: DateTime<Utc>,
    },

    /// Status set explicitly by a user
    RiskStatusChanged {
        risk_id: RiskId,
        from: RiskStatus,
        to: RiskStatus,
        timestamp: DateTime<Utc>,
    },

    /// Risk and all of its children were removed
    RiskDeleted {
        risk_id: RiskId,
        assessments_removed: usize,
        actions_removed: usize,
        timestamp: DateTime<Utc>,
    },

    // === Assessment Events ===
    /// Assessment was recorded
    AssessmentRecorded {
        assessment_id: AssessmentId,
        risk_id: RiskId,
        timestamp: DateTime<Utc>,
    },

    /// Assessment was removed
    AssessmentDeleted {
        assessment_id: AssessmentId,
        risk_id: RiskId,
        timestamp: DateTime<Utc>,
    },

    // === Mitigation Events ===
    /// Mitigation action was planned
    MitigationPlanned {
        action_id: MitigationActionId,
        risk_id: RiskId,
        timestamp: DateTime<Utc>,
    },

    /// Mitigation action changed status
    MitigationStatusChanged {
        action_id: MitigationActionId,
        status: MitigationStatus,
        timestamp: DateTime<Utc>,
    },

    /// Mitigation action was removed
    MitigationDeleted {
        action_id: MitigationActionId,
        risk_id: RiskId,
        timestamp: DateTime<Utc>,
    },

    // === User Events ===
    /// User account was created
    UserRegistered {
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },

    /// User logged in
    UserLoggedIn {
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },

    /// Profile, role or password was changed
    UserUpdated {
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },

    /// User account was removed by an administrator
    UserDeleted {
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },
}

impl ApplicationEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            ApplicationEvent::RiskCreated { .. } => "RiskCreated",
            ApplicationEvent::RiskUpdated { .. } => "RiskUpdated",
            ApplicationEvent::RiskRecalculated { .. } => "RiskRecalculated",
            ApplicationEvent::RiskStatusChanged { .. } => "RiskStatusChanged",
            ApplicationEvent::RiskDeleted { .. } => "RiskDeleted",
            ApplicationEvent::AssessmentRecorded { .. } => "AssessmentRecorded",
            ApplicationEvent::AssessmentDeleted { .. } => "AssessmentDeleted",
            ApplicationEvent::MitigationPlanned { .. } => "MitigationPlanned",
            ApplicationEvent::MitigationStatusChanged { .. } => "MitigationStatusChanged",
            ApplicationEvent::MitigationDeleted { .. } => "MitigationDeleted",
            ApplicationEvent::UserRegistered { .. } => "UserRegistered",
            ApplicationEvent::UserLoggedIn { .. } => "UserLoggedIn",
            ApplicationEvent::UserUpdated { .. } => "UserUpdated",
            ApplicationEvent::UserDeleted { .. } => "UserDeleted",
        }
    }

    /// Get the event timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ApplicationEvent::RiskCreated { timestamp, .. }
            | ApplicationEvent::RiskUpdated { timestamp, .. }
            | ApplicationEvent::RiskRecalculated { timestamp, .. }
            | ApplicationEvent::RiskStatusChanged { timestamp, .. }
            | ApplicationEvent::RiskDeleted { timestamp, .. }
            | ApplicationEvent::AssessmentRecorded { timestamp, .. }
            | ApplicationEvent::AssessmentDeleted { timestamp, .. }
            | ApplicationEvent::MitigationPlanned { timestamp, .. }
            | ApplicationEvent::MitigationStatusChanged { timestamp, .. }
            | ApplicationEvent::MitigationDeleted { timestamp, .. }
            | ApplicationEvent::UserRegistered { timestamp, .. }
            | ApplicationEvent::UserLoggedIn { timestamp, .. }
            | ApplicationEvent::UserUpdated { timestamp, .. }
            | ApplicationEvent::UserDeleted { timestamp, .. } => *timestamp,
        }
    }
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an application event
    async fn publish(&self, event: ApplicationEvent);
}

/// Publisher that writes every event to the `erm::events` tracing target
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: ApplicationEvent) {
        tracing::info!(
            target: "erm::events",
            event_type = event.event_type(),
            timestamp = %event.timestamp(),
            ?event,
            "application event"
        );
    }
}

/// In-memory event collector for testing
#[derive(Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<ApplicationEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<ApplicationEvent> {
        self.events.lock().clone()
    }

    /// Event type names in publication order
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event_type()).collect()
    }

    /// Clear collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: ApplicationEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = ApplicationEvent::RiskCreated {
            risk_id: RiskId::new(1),
            title: "Supplier insolvency".into(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "RiskCreated");
    }

    #[tokio::test]
    async fn test_in_memory_publisher() {
        let publisher = InMemoryEventPublisher::new();

        publisher
            .publish(ApplicationEvent::UserRegistered {
                user_id: UserId::new(3),
                timestamp: Utc::now(),
            })
            .await;

        assert_eq!(publisher.event_types(), vec!["UserRegistered"]);
        publisher.clear();
        assert!(publisher.events().is_empty());
    }
}
