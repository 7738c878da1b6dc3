//! Assessment API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use erm_application::dto::{Actor, CreateAssessmentCommand, UpdateAssessmentCommand};
use erm_domain::repositories::AssessmentFilter;
use erm_domain::value_objects::{AssessmentId, ImpactId, LikelihoodId, RiskId, UserId};

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    models::{
        AssessmentPage, AssessmentResponse, CreateAssessmentRequest, ListAssessmentsQuery,
        PageResponse, UpdateAssessmentRequest,
    },
    state::AppState,
};

/// List assessments visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/assessments",
    params(ListAssessmentsQuery),
    responses(
        (status = 200, description = "Page of assessments", body = AssessmentPage)
    ),
    security(("bearer" = []))
)]
pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListAssessmentsQuery>,
) -> ApiResult<Json<PageResponse<AssessmentResponse>>> {
    let filter = AssessmentFilter {
        risk_id: query.risk_id.map(RiskId::new),
        assessor_id: query.assessor_id.map(UserId::new),
    };
    let page = state.page_request(query.page, query.page_size);
    let assessments = state
        .assessments
        .list_assessments(&actor, filter, page)
        .await?;
    Ok(Json(PageResponse::from_page(assessments)))
}

/// Record an assessment and rescore its risk
#[utoipa::path(
    post,
    path = "/api/v1/assessments",
    request_body = CreateAssessmentRequest,
    responses(
        (status = 201, description = "Assessment recorded", body = AssessmentResponse),
        (status = 400, description = "Unknown likelihood or impact"),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(request): ApiJson<CreateAssessmentRequest>,
) -> ApiResult<(StatusCode, Json<AssessmentResponse>)> {
    let assessment = state
        .assessments
        .create_assessment(
            &actor,
            CreateAssessmentCommand {
                risk_id: RiskId::new(request.risk_id),
                likelihood_id: LikelihoodId::new(request.likelihood_id),
                impact_id: ImpactId::new(request.impact_id),
                assessment_date: request.assessment_date,
                notes: request.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(assessment.into())))
}

/// Get an assessment
#[utoipa::path(
    get,
    path = "/api/v1/assessments/{id}",
    params(("id" = i64, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Assessment", body = AssessmentResponse),
        (status = 404, description = "Assessment not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AssessmentResponse>> {
    let assessment = state
        .assessments
        .get_assessment(&actor, AssessmentId::new(id))
        .await?;
    Ok(Json(assessment.into()))
}

/// Edit an assessment; moving it to another risk rescores both
#[utoipa::path(
    put,
    path = "/api/v1/assessments/{id}",
    params(("id" = i64, Path, description = "Assessment ID")),
    request_body = UpdateAssessmentRequest,
    responses(
        (status = 200, description = "Assessment updated", body = AssessmentResponse),
        (status = 400, description = "Unknown likelihood or impact"),
        (status = 404, description = "Assessment or risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_assessment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateAssessmentRequest>,
) -> ApiResult<Json<AssessmentResponse>> {
    let assessment = state
        .assessments
        .update_assessment(
            &actor,
            AssessmentId::new(id),
            UpdateAssessmentCommand {
                risk_id: request.risk_id.map(RiskId::new),
                likelihood_id: request.likelihood_id.map(LikelihoodId::new),
                impact_id: request.impact_id.map(ImpactId::new),
                assessment_date: request.assessment_date,
                notes: request.notes,
            },
        )
        .await?;
    Ok(Json(assessment.into()))
}

/// Delete an assessment and rescore its risk
#[utoipa::path(
    delete,
    path = "/api/v1/assessments/{id}",
    params(("id" = i64, Path, description = "Assessment ID")),
    responses(
        (status = 204, description = "Assessment deleted"),
        (status = 404, description = "Assessment not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_assessment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .assessments
        .delete_assessment(&actor, AssessmentId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All assessments of one risk, latest first
#[utoipa::path(
    get,
    path = "/api/v1/assessments/risk/{risk_id}",
    params(("risk_id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Assessments", body = [AssessmentResponse]),
        (status = 404, description = "Risk not found")
    ),
    security(("bearer" = []))
)]
pub async fn assessments_for_risk(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(risk_id): Path<i64>,
) -> ApiResult<Json<Vec<AssessmentResponse>>> {
    let assessments = state
        .assessments
        .assessments_for_risk(&actor, RiskId::new(risk_id))
        .await?;
    Ok(Json(assessments.into_iter().map(Into::into).collect()))
}

/// The assessment currently driving a risk's score
#[utoipa::path(
    get,
    path = "/api/v1/assessments/risk/{risk_id}/latest",
    params(("risk_id" = i64, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Latest assessment", body = AssessmentResponse),
        (status = 404, description = "Risk not found or not assessed")
    ),
    security(("bearer" = []))
)]
pub async fn latest_assessment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(risk_id): Path<i64>,
) -> ApiResult<Json<AssessmentResponse>> {
    let risk_id = RiskId::new(risk_id);
    let assessment = state
        .assessments
        .latest_for_risk(&actor, risk_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No assessment for risk {}", risk_id)))?;
    Ok(Json(assessment.into()))
}
