//! ERM Application Layer
//!
//! The Application Layer implements use cases by orchestrating domain entities
//! and domain services. Its services coordinate multi-step workflows, keep
//! every risk's derived score and status current after each write, check the
//! caller's permissions and emit application events.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Application Layer                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Services          │ DTOs              │ Ports              │ Events    │
//! │  ─────────         │ ────              │ ─────              │ ──────    │
//! │  RiskService       │ CreateRiskCommand │ Repositories       │ AppEvent  │
//! │  AssessmentService │ RiskDto, Page<T>  │ UnitOfWork         │           │
//! │  MitigationService │ AssessmentDto     │ EventPublisher     │           │
//! │  AuthService       │ Actor, Claims     │                    │           │
//! │  ReferenceData...  │ OrganizationDto   │                    │           │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ depends on
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                                     │
//! │  Entities, Value Objects, Scoring Engine, Repository Traits             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Responsibilities
//!
//! - **Use Case Orchestration**: Coordinate multi-step workflows
//! - **Transaction Boundaries**: Wrap each write and its recomputation in the UnitOfWork
//! - **Authorization**: Every use case takes the calling [`Actor`] and checks its role
//! - **DTO Mapping**: Convert domain objects to presentation-safe DTOs
//! - **Error Mapping**: Translate domain errors to application-level errors
//!
//! # Non-Goals
//!
//! - Domain logic (belongs in Domain Layer)
//! - Storage (belongs in the persistence crate)
//! - HTTP handling (belongs in the API crate)

pub mod dto;
pub mod errors;
pub mod events;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use dto::*;
pub use errors::{ApplicationError, ApplicationResult};
pub use events::{ApplicationEvent, EventPublisher};
pub use ports::{Repositories, UnitOfWork};
pub use services::*;
