//! API route definitions

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    handlers::{assessments, auth, health, mitigations, reference, risks, users},
    middleware::{logging_middleware, require_auth},
    state::AppState,
};

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
}

/// Routes behind bearer authentication
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Session user
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/password", put(auth::change_password))
        // Risk register
        .route(
            "/api/v1/risks",
            get(risks::list_risks).post(risks::create_risk),
        )
        .route("/api/v1/risks/overview", get(risks::overview))
        .route("/api/v1/risks/top", get(risks::top_risks))
        .route(
            "/api/v1/risks/:id",
            get(risks::get_risk)
                .put(risks::update_risk)
                .delete(risks::delete_risk),
        )
        .route("/api/v1/risks/:id/status", put(risks::update_risk_status))
        .route(
            "/api/v1/risks/:id/recalculate",
            post(risks::recalculate_risk),
        )
        .route(
            "/api/v1/risks/:id/assessments",
            get(risks::risk_assessments),
        )
        .route(
            "/api/v1/risks/:id/mitigations",
            get(risks::risk_mitigations),
        )
        // Assessments
        .route(
            "/api/v1/assessments",
            get(assessments::list_assessments).post(assessments::create_assessment),
        )
        .route(
            "/api/v1/assessments/:id",
            get(assessments::get_assessment)
                .put(assessments::update_assessment)
                .delete(assessments::delete_assessment),
        )
        .route(
            "/api/v1/assessments/risk/:risk_id",
            get(assessments::assessments_for_risk),
        )
        .route(
            "/api/v1/assessments/risk/:risk_id/latest",
            get(assessments::latest_assessment),
        )
        // Mitigation actions
        .route(
            "/api/v1/mitigations",
            get(mitigations::list_mitigations).post(mitigations::create_mitigation),
        )
        .route(
            "/api/v1/mitigations/refresh-overdue",
            post(mitigations::refresh_overdue),
        )
        .route(
            "/api/v1/mitigations/:id",
            get(mitigations::get_mitigation)
                .put(mitigations::update_mitigation)
                .delete(mitigations::delete_mitigation),
        )
        .route(
            "/api/v1/mitigations/:id/status",
            put(mitigations::update_mitigation_status),
        )
        // Reference data
        .route("/api/v1/likelihoods", get(reference::list_likelihoods))
        .route("/api/v1/impacts", get(reference::list_impacts))
        .route("/api/v1/risk-categories", get(reference::list_categories))
        .route("/api/v1/organization", get(reference::current_organization))
        // Own profile
        .route(
            "/api/v1/users/me",
            get(users::get_profile).put(users::update_profile),
        )
        // User administration
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/v1/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/v1/users/:id/role", patch(users::change_role))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Swagger UI routes
pub fn swagger_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// The complete application with middleware and state applied
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(swagger_routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::change_password,
        risks::list_risks,
        risks::create_risk,
        risks::get_risk,
        risks::update_risk,
        risks::delete_risk,
        risks::update_risk_status,
        risks::recalculate_risk,
        risks::risk_assessments,
        risks::risk_mitigations,
        risks::overview,
        risks::top_risks,
        assessments::list_assessments,
        assessments::create_assessment,
        assessments::get_assessment,
        assessments::update_assessment,
        assessments::delete_assessment,
        assessments::assessments_for_risk,
        assessments::latest_assessment,
        mitigations::list_mitigations,
        mitigations::create_mitigation,
        mitigations::get_mitigation,
        mitigations::update_mitigation,
        mitigations::update_mitigation_status,
        mitigations::delete_mitigation,
        mitigations::refresh_overdue,
        reference::list_likelihoods,
        reference::list_impacts,
        reference::list_categories,
        reference::current_organization,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::change_role,
        users::get_profile,
        users::update_profile,
    ),
    components(schemas(
        crate::models::HealthResponse,
        crate::models::RegisterRequest,
        crate::models::LoginRequest,
        crate::models::AuthResponse,
        crate::models::ChangePasswordRequest,
        crate::models::ChangeRoleRequest,
        crate::models::CreateUserRequest,
        crate::models::UpdateUserRequest,
        crate::models::UpdateProfileRequest,
        crate::models::UserResponse,
        crate::models::UserPage,
        crate::models::CreateRiskRequest,
        crate::models::UpdateRiskRequest,
        crate::models::StatusRequest,
        crate::models::RiskResponse,
        crate::models::RiskPage,
        crate::models::RiskOverviewResponse,
        crate::models::CreateAssessmentRequest,
        crate::models::UpdateAssessmentRequest,
        crate::models::AssessmentResponse,
        crate::models::AssessmentPage,
        crate::models::CreateMitigationRequest,
        crate::models::UpdateMitigationRequest,
        crate::models::MitigationResponse,
        crate::models::MitigationPage,
        crate::models::OverdueSweepResponse,
        crate::models::ScaleEntryResponse,
        crate::models::CategoryResponse,
        crate::models::OrganizationResponse,
    )),
    modifiers(&SecurityAddon),
    info(
        title = "ERM API",
        version = "1.0.0",
        description = "Enterprise risk register: risks, assessments, mitigation actions and role-based access"
    )
)]
pub struct ApiDoc;
