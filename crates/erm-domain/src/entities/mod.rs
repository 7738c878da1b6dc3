//! Core domain entities with business logic and validation
//!
//! This module contains the domain entities organized by responsibility:
//! - `risk`: Risk register entry and its derived score/status
//! - `assessment`: Likelihood/impact judgments against a risk
//! - `mitigation`: Remediation tasks tracked against a risk
//! - `scale`: Likelihood and impact reference scales
//! - `category`: Organization-scoped risk categories
//! - `organization`: Tenants owning users, categories and risks
//! - `user`: Platform users and their roles

mod assessment;
mod category;
mod mitigation;
mod organization;
mod risk;
mod scale;
mod user;

pub use assessment::*;
pub use category::*;
pub use mitigation::*;
pub use organization::*;
pub use risk::*;
pub use scale::*;
pub use user::*;
