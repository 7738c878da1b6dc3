#![warn(missing_docs)]

//! ERM RESTful API
//!
//! Exposes the risk register over HTTP: authentication, risks, assessments,
//! mitigation actions, reference data and user administration. All routes
//! except health, login and registration require a bearer token; errors use
//! the `{"error": {"type", "message"}}` envelope.

pub mod bootstrap;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod server;
pub mod state;

pub use server::ApiServer;
pub use state::AppState;
