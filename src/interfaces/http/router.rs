//! API Router with Swagger UI
//!
//! Every route group carries its own [`RoleGate`]; groups sharing a path
//! are merged per method, so `GET /api/expedientes` and
//! `POST /api/expedientes` can admit different callers.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::AuthService;
use crate::domain::{ProcedureBackend, Role, UserProfile};
use crate::interfaces::http::common::{ApiResponse, FieldError};
use crate::interfaces::http::middleware::{auth_gate, GateState, RoleGate};
use crate::interfaces::http::modules::{
    auth, expedientes, health, indicios, metrics, reportes, request_id, usuarios,
};

/// State shared by every `/api` handler
#[derive(Clone)]
pub struct ApiState {
    pub backend: Arc<dyn ProcedureBackend>,
    pub auth: Arc<AuthService>,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(backend: Arc<dyn ProcedureBackend>, auth: AuthService) -> Self {
        Self {
            backend,
            auth: Arc::new(auth),
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            backend: Arc::clone(&s.backend),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Per-IP request budget: `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub window: Duration,
    pub max_requests: u32,
}

/// Cross-cutting layers; the default is what handler tests run against.
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Single origin allowed to call the API with credentials
    pub cors_allowed_origin: Option<String>,
    pub rate_limit: Option<RateLimit>,
    /// Put the panic message in 500 bodies instead of a generic text
    pub expose_panic_details: bool,
    /// Serve `GET /metrics` from this handle
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::verify,
        // Expedientes
        expedientes::list_expedientes,
        expedientes::get_expediente,
        expedientes::create_expediente,
        expedientes::update_expediente,
        expedientes::submit_for_review,
        expedientes::approve_expediente,
        expedientes::reject_expediente,
        // Indicios
        indicios::list_by_expediente,
        indicios::get_indicio,
        indicios::create_indicio,
        indicios::update_indicio,
        indicios::delete_indicio,
        // Reportes
        reportes::estadisticas,
        reportes::reporte_expedientes,
        reportes::reporte_indicios,
        reportes::reporte_actividad,
        reportes::tendencias_mensuales,
        // Usuarios
        usuarios::list_usuarios,
        usuarios::get_profile,
        usuarios::update_profile,
        usuarios::change_password,
        usuarios::toggle_active,
        usuarios::update_role,
    ),
    components(
        schemas(
            ApiResponse<String>,
            FieldError,
            Role,
            UserProfile,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::VerifiedUser,
            auth::VerifyResponse,
            auth::RegisterRequest,
            expedientes::CreateExpedienteRequest,
            expedientes::UpdateExpedienteRequest,
            expedientes::RejectExpedienteRequest,
            indicios::CreateIndicioRequest,
            indicios::UpdateIndicioRequest,
            usuarios::UpdateProfileRequest,
            usuarios::ChangePasswordRequest,
            usuarios::UpdateRoleRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Login, account creation by administrators, token introspection"),
        (name = "Expedientes", description = "Case files and their review workflow"),
        (name = "Indicios", description = "Evidence items attached to case files"),
        (name = "Reportes", description = "Statistics and reports"),
        (name = "Usuarios", description = "Own profile and account administration"),
    ),
    info(
        title = "DICRI Evidence Management System API",
        version = "1.0.0",
        description = "Case file and evidence registration with technician/coordinator review"
    )
)]
pub struct ApiDoc;

fn gated(state: &ApiState, gate: RoleGate, routes: Router<ApiState>) -> Router<ApiState> {
    let gate = GateState::new(gate, state.auth.jwt_config().clone());
    routes.route_layer(middleware::from_fn_with_state(gate, auth_gate))
}

/// Every `/api` route, grouped by who may call it.
fn api_routes(state: ApiState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        .route("/health", get(health::health_check));

    let authenticated = Router::new()
        .route("/expedientes", get(expedientes::list_expedientes))
        .route("/expedientes/{id}", get(expedientes::get_expediente))
        .route(
            "/indicios/expediente/{expediente_id}",
            get(indicios::list_by_expediente),
        )
        .route("/indicios/{id}", get(indicios::get_indicio))
        .route("/reportes/estadisticas", get(reportes::estadisticas))
        .route("/reportes/expedientes", get(reportes::reporte_expedientes))
        .route("/reportes/indicios", get(reportes::reporte_indicios))
        .route(
            "/reportes/tendencias-mensuales",
            get(reportes::tendencias_mensuales),
        )
        .route(
            "/usuarios/profile",
            get(usuarios::get_profile).put(usuarios::update_profile),
        )
        .route("/usuarios/change-password", put(usuarios::change_password));

    let technicians = Router::new()
        .route("/expedientes", post(expedientes::create_expediente))
        .route("/expedientes/{id}", put(expedientes::update_expediente))
        .route(
            "/expedientes/{id}/submit-review",
            post(expedientes::submit_for_review),
        )
        .route("/indicios", post(indicios::create_indicio))
        .route(
            "/indicios/{id}",
            put(indicios::update_indicio).delete(indicios::delete_indicio),
        );

    let reviewers = Router::new()
        .route("/expedientes/{id}/approve", post(expedientes::approve_expediente))
        .route("/expedientes/{id}/reject", post(expedientes::reject_expediente))
        .route(
            "/reportes/actividad-usuarios",
            get(reportes::reporte_actividad),
        );

    let administrators = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/usuarios", get(usuarios::list_usuarios))
        .route("/usuarios/{id}/toggle-active", put(usuarios::toggle_active))
        .route("/usuarios/{id}/role", put(usuarios::update_role));

    Router::new()
        .merge(public)
        .merge(gated(&state, RoleGate::authenticated(), authenticated))
        .merge(gated(&state, RoleGate::only(Role::Tecnico), technicians))
        .merge(gated(
            &state,
            RoleGate::any_of([Role::Coordinador, Role::Administrador]),
            reviewers,
        ))
        .merge(gated(&state, RoleGate::only(Role::Administrador), administrators))
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .with_state(state)
}

/// Build the complete application router.
pub fn create_router(state: ApiState, options: RouterOptions) -> Router {
    let mut api = api_routes(state);
    if let Some(limit) = options.rate_limit {
        api = with_rate_limit(api, limit);
    }

    let mut router = Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(handle) = options.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    let mut router = router
        .fallback(endpoint_not_found)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = options.cors_allowed_origin.as_deref() {
        match cors_layer(origin) {
            Some(cors) => router = router.layer(cors),
            None => tracing::warn!(origin, "Ignoring unparsable CORS origin"),
        }
    }

    let expose = options.expose_panic_details;
    router.layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
        panic_response(panic, expose)
    }))
}

async fn endpoint_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Endpoint not found")),
    )
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = HeaderValue::from_str(origin).ok()?;
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

/// Per-IP limiter keyed on the peer address; the server must be started
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
fn with_rate_limit(api: Router, limit: RateLimit) -> Router {
    let period = limit.window / limit.max_requests.max(1);
    let Some(config) = GovernorConfigBuilder::default()
        .period(period)
        .burst_size(limit.max_requests)
        .finish()
    else {
        tracing::warn!(?limit, "Rate limit disabled: window and budget must be non-zero");
        return api;
    };

    let limiter = config.limiter().clone();
    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                ticker.tick().await;
                limiter.retain_recent();
            }
        });
    }

    api.layer(GovernorLayer::new(config))
        .layer(middleware::map_response(rate_limited_as_json))
}

async fn rate_limited_as_json(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let retry_after = response.headers().get(header::RETRY_AFTER).cloned();
    let mut limited = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ApiResponse::<()>::error(
            "Demasiadas solicitudes, intente más tarde",
        )),
    )
        .into_response();
    if let Some(value) = retry_after {
        limited.headers_mut().insert(header::RETRY_AFTER, value);
    }
    limited
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Handler panicked");

    let message = if expose {
        detail.to_string()
    } else {
        "Something went wrong!".to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}
