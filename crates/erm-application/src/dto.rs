//! Data Transfer Objects (DTOs) for layer boundary crossing
//!
//! DTOs prevent domain model leakage to the presentation layer.
//! They provide a stable API contract while allowing domain internals to evolve.

pub mod assessment;
pub mod auth;
pub mod mitigation;
pub mod pagination;
pub mod risk;
pub mod scale;

pub use assessment::*;
pub use auth::*;
pub use mitigation::*;
pub use pagination::*;
pub use risk::*;
pub use scale::*;
