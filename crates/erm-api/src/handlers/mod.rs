//! API route handlers

use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

pub mod assessments;
pub mod auth;
pub mod health;
pub mod mitigations;
pub mod reference;
pub mod risks;
pub mod users;

/// Parse a status or role name from a request
pub(crate) fn parse_name<T>(value: &str) -> ApiResult<T>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(ApiError::BadRequest)
}
