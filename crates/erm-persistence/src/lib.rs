//! ERM Persistence Layer
//!
//! Infrastructure layer providing repository implementations for the
//! repository interfaces defined in `erm-domain`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Infrastructure Layer                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  memory/                                                         │
//! │  InMemoryRiskRepository        InMemoryAssessmentRepository      │
//! │  InMemoryMitigationRepository  InMemoryScaleRepository           │
//! │  InMemoryCategoryRepository    InMemoryUserRepository            │
//! │  InMemoryOrganizationRepository                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ implements
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Domain Layer                               │
//! │  RiskRepository, AssessmentRepository, ScaleRepository, ...      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use erm_persistence::memory::InMemoryRiskRepository;
//! use erm_domain::repositories::RiskRepository;
//! use std::sync::Arc;
//!
//! let repo: Arc<dyn RiskRepository> = Arc::new(InMemoryRiskRepository::new());
//! ```

pub mod error;
pub mod memory;

pub use error::PersistenceError;

pub use memory::{
    InMemoryAssessmentRepository, InMemoryCategoryRepository, InMemoryMitigationRepository,
    InMemoryOrganizationRepository, InMemoryRiskRepository, InMemoryScaleRepository,
    InMemoryUserRepository,
};
