//! Application Services
//!
//! Each service orchestrates one group of use cases:
//!
//! ```text
//! ┌──────────────────┐  ┌───────────────────┐  ┌───────────────────┐
//! │   RiskService    │  │ AssessmentService │  │ MitigationService │
//! └────────┬─────────┘  └─────────┬─────────┘  └─────────┬─────────┘
//!          └──────────────┬───────┴──────────────────────┘
//!                         ▼
//!                 RiskRecalculator ──▶ RiskScoringEngine (domain)
//!
//! ┌──────────────────┐  ┌──────────────────────┐
//! │   AuthService    │  │ ReferenceDataService │
//! └──────────────────┘  └──────────────────────┘
//! ```
//!
//! Services run their writes inside the shared [`UnitOfWork`](crate::ports::UnitOfWork)
//! and publish [`ApplicationEvent`](crate::events::ApplicationEvent)s once the
//! work has committed.

mod assessment_service;
mod auth_service;
mod mitigation_service;
mod recalculation;
mod reference_service;
mod risk_service;

pub use assessment_service::AssessmentService;
pub use auth_service::{AuthService, AuthSettings, SELF_REGISTERED_ROLE};
pub use mitigation_service::MitigationService;
pub use reference_service::ReferenceDataService;
pub use risk_service::{RiskService, DEFAULT_TOP_RISKS};
