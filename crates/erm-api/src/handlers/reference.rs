//! Reference data handlers: likelihood and impact scales, risk categories and
//! the caller's organization

use axum::{extract::State, Extension, Json};

use erm_application::dto::Actor;

use crate::{
    error::ApiResult,
    models::{CategoryResponse, OrganizationResponse, ScaleEntryResponse},
    state::AppState,
};

/// Likelihood scale, lowest score first
#[utoipa::path(
    get,
    path = "/api/v1/likelihoods",
    responses((status = 200, description = "Likelihood scale", body = [ScaleEntryResponse])),
    security(("bearer" = []))
)]
pub async fn list_likelihoods(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<ScaleEntryResponse>>> {
    let entries = state.reference.list_likelihoods(&actor).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Impact scale, lowest score first
#[utoipa::path(
    get,
    path = "/api/v1/impacts",
    responses((status = 200, description = "Impact scale", body = [ScaleEntryResponse])),
    security(("bearer" = []))
)]
pub async fn list_impacts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<ScaleEntryResponse>>> {
    let entries = state.reference.list_impacts(&actor).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Risk categories of the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/risk-categories",
    responses((status = 200, description = "Risk categories", body = [CategoryResponse])),
    security(("bearer" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = state.reference.list_categories(&actor).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// The caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/organization",
    responses(
        (status = 200, description = "Organization", body = OrganizationResponse),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer" = []))
)]
pub async fn current_organization(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<OrganizationResponse>> {
    let organization = state.reference.current_organization(&actor).await?;
    Ok(Json(organization.into()))
}
