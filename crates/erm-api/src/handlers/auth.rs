//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};

use erm_application::dto::{Actor, ChangePasswordCommand, LoginCommand, RegisterCommand};
use erm_domain::value_objects::OrganizationId;

use crate::{
    error::ApiResult,
    extract::ApiJson,
    models::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UserResponse},
    state::AppState,
};

/// Register a new account in an existing organization
///
/// New accounts receive the ReadOnly role and can do nothing until an
/// administrator of the organization assigns a working role.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid email or weak password"),
        (status = 404, description = "Organization not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth
        .register(RegisterCommand {
            name: request.name,
            email: request.email,
            password: request.password,
            organization_id: OrganizationId::new(request.organization_id),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Authenticate user
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authentication successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let token = state
        .auth
        .login(LoginCommand {
            email: request.email,
            password: request.password,
        })
        .await?;
    Ok(Json(token.into()))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.auth.current_user(&actor).await?;
    Ok(Json(user.into()))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "New password too weak"),
        (status = 401, description = "Current password wrong")
    ),
    security(("bearer" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .change_password(
            &actor,
            ChangePasswordCommand {
                current_password: request.current_password,
                new_password: request.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
