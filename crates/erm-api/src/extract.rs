//! Request extractors

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body whose parse failures use the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
