//! In-Memory Repository Implementations
//!
//! Thread-safe in-memory implementations of domain repository interfaces.
//! Each table allocates its own increasing identifiers.

mod assessment_repository;
mod category_repository;
mod mitigation_repository;
mod organization_repository;
mod risk_repository;
mod scale_repository;
mod sequence;
mod user_repository;

pub use assessment_repository::InMemoryAssessmentRepository;
pub use category_repository::InMemoryCategoryRepository;
pub use mitigation_repository::InMemoryMitigationRepository;
pub use organization_repository::InMemoryOrganizationRepository;
pub use risk_repository::InMemoryRiskRepository;
pub use scale_repository::InMemoryScaleRepository;
pub use user_repository::InMemoryUserRepository;
