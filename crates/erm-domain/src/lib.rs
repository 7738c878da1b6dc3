//! ERM domain layer
//!
//! Entities, value objects and repository contracts for the risk register,
//! plus the [`scoring::RiskScoringEngine`] that derives a risk's score and
//! lifecycle status from its assessments and mitigation actions.
//!
//! The crate performs no I/O. Infrastructure crates implement the traits in
//! [`repositories`]; the application layer orchestrates them.

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod scoring;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::{DomainError, DomainResult};
pub use scoring::{OverdueRefresh, RiskEvaluation, RiskScoringEngine};
pub use value_objects::*;
