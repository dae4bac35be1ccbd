//! Report handlers
//!
//! Every report is a read-only procedure call. A procedure that reports
//! failure yields the generic "Error al generar reporte"; transport errors
//! carry a message naming the report.

use axum::{extract::State, Json};
use chrono::{Datelike, Utc};

use super::dto::{ActividadReportQuery, ExpedientesReportQuery, IndiciosReportQuery, TendenciasQuery};
use crate::domain::procedures::{
    GET_ESTADISTICAS_GENERALES, REPORTE_ACTIVIDAD_USUARIOS, REPORTE_EXPEDIENTES,
    REPORTE_INDICIOS, REPORTE_TENDENCIAS_MENSUALES,
};
use crate::domain::{ProcedureParams, Record};
use crate::interfaces::http::common::{
    blank_as_none, invoke, ApiError, ApiResponse, OutcomeExt, ValidatedQuery,
};
use crate::interfaces::http::router::ApiState;

const REPORT_FAILED: &str = "Error al generar reporte";

async fn report(
    state: &ApiState,
    procedure: &str,
    params: ProcedureParams,
    internal_message: &str,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let rows = invoke(&*state.backend, procedure, params, internal_message)
        .await?
        .into_rows(REPORT_FAILED)?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Dashboard counters. `data` is an empty object when the procedure
/// returns no row.
#[utoipa::path(
    get,
    path = "/api/reportes/estadisticas",
    tag = "Reportes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "General statistics"),
        (status = 500, description = "Statistics unavailable")
    )
)]
pub async fn estadisticas(
    State(state): State<ApiState>,
) -> Result<Json<ApiResponse<Record>>, ApiError> {
    let stats = invoke(
        &*state.backend,
        GET_ESTADISTICAS_GENERALES,
        ProcedureParams::new(),
        "Error al obtener estadísticas",
    )
    .await?
    .into_rows("Error al obtener estadísticas")?
    .into_iter()
    .next()
    .unwrap_or_default();

    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/reportes/expedientes",
    tag = "Reportes",
    security(("bearer_auth" = [])),
    params(ExpedientesReportQuery),
    responses(
        (status = 200, description = "Case file report"),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn reporte_expedientes(
    State(state): State<ApiState>,
    ValidatedQuery(query): ValidatedQuery<ExpedientesReportQuery>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let params = ProcedureParams::new()
        .with("FechaInicio", blank_as_none(query.fecha_inicio))
        .with("FechaFin", blank_as_none(query.fecha_fin))
        .with("Estado", blank_as_none(query.estado));

    report(&state, REPORTE_EXPEDIENTES, params, "Error al generar reporte de expedientes").await
}

#[utoipa::path(
    get,
    path = "/api/reportes/indicios",
    tag = "Reportes",
    security(("bearer_auth" = [])),
    params(IndiciosReportQuery),
    responses(
        (status = 200, description = "Evidence item report"),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn reporte_indicios(
    State(state): State<ApiState>,
    ValidatedQuery(query): ValidatedQuery<IndiciosReportQuery>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let params = ProcedureParams::new()
        .with("FechaInicio", blank_as_none(query.fecha_inicio))
        .with("FechaFin", blank_as_none(query.fecha_fin))
        .with("TipoIndicio", blank_as_none(query.tipo_indicio));

    report(&state, REPORTE_INDICIOS, params, "Error al generar reporte de indicios").await
}

#[utoipa::path(
    get,
    path = "/api/reportes/actividad-usuarios",
    tag = "Reportes",
    security(("bearer_auth" = [])),
    params(ActividadReportQuery),
    responses(
        (status = 200, description = "User activity report"),
        (status = 400, description = "Invalid filter"),
        (status = 403, description = "Coordinators and administrators only")
    )
)]
pub async fn reporte_actividad(
    State(state): State<ApiState>,
    ValidatedQuery(query): ValidatedQuery<ActividadReportQuery>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let usuario_id = query
        .usuario_id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok());

    let params = ProcedureParams::new()
        .with("FechaInicio", blank_as_none(query.fecha_inicio))
        .with("FechaFin", blank_as_none(query.fecha_fin))
        .with("UsuarioID", usuario_id);

    report(&state, REPORTE_ACTIVIDAD_USUARIOS, params, "Error al generar reporte de actividad")
        .await
}

#[utoipa::path(
    get,
    path = "/api/reportes/tendencias-mensuales",
    tag = "Reportes",
    security(("bearer_auth" = [])),
    params(TendenciasQuery),
    responses(
        (status = 200, description = "Monthly trend report"),
        (status = 400, description = "Invalid year")
    )
)]
pub async fn tendencias_mensuales(
    State(state): State<ApiState>,
    ValidatedQuery(query): ValidatedQuery<TendenciasQuery>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let anio = query
        .anio
        .as_deref()
        .and_then(|y| y.trim().parse::<i64>().ok())
        .unwrap_or_else(|| i64::from(Utc::now().year()));

    report(
        &state,
        REPORTE_TENDENCIAS_MENSUALES,
        ProcedureParams::new().with("Año", anio),
        "Error al generar reporte de tendencias",
    )
    .await
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Datelike, Utc};
    use serde_json::{json, Value};

    use crate::domain::procedures::*;
    use crate::domain::{ProcedureOutcome, Role};
    use crate::infrastructure::storage::InMemoryProcedureBackend;
    use crate::interfaces::http::test_support::*;

    fn reports() -> InMemoryProcedureBackend {
        let month = |m: i64| record(json!({"Mes": m, "Total": m * 2}));
        InMemoryProcedureBackend::new()
            .returning(
                GET_ESTADISTICAS_GENERALES,
                ProcedureOutcome::rows(vec![record(json!({"TotalExpedientes": 12}))]),
            )
            .returning(REPORTE_EXPEDIENTES, ProcedureOutcome::rows(vec![]))
            .returning(REPORTE_INDICIOS, ProcedureOutcome::failure("timeout"))
            .returning(REPORTE_ACTIVIDAD_USUARIOS, ProcedureOutcome::rows(vec![]))
            .returning(
                REPORTE_TENDENCIAS_MENSUALES,
                ProcedureOutcome::rows(vec![month(1), month(2)]),
            )
    }

    #[tokio::test]
    async fn statistics_return_the_first_row() {
        let (app, _) = test_app(reports());
        let (status, body) = send(
            &app,
            "GET",
            "/api/reportes/estadisticas",
            Some(&token(10, Role::Tecnico)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["TotalExpedientes"], 12);

        let (app, _) = test_app(
            InMemoryProcedureBackend::new()
                .returning(GET_ESTADISTICAS_GENERALES, ProcedureOutcome::empty()),
        );
        let (_, body) = send(
            &app,
            "GET",
            "/api/reportes/estadisticas",
            Some(&token(10, Role::Tecnico)),
            None,
        )
        .await;
        assert_eq!(body["data"], json!({}));
    }

    #[tokio::test]
    async fn filters_become_procedure_parameters() {
        let (app, backend) = test_app(reports());
        let (status, body) = send(
            &app,
            "GET",
            "/api/reportes/expedientes?fechaInicio=2024-01-01&estado=Aprobado",
            Some(&token(10, Role::Tecnico)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));

        let params = &backend.calls_to(REPORTE_EXPEDIENTES)[0];
        assert_eq!(params.get("FechaInicio"), Some(&json!("2024-01-01")));
        assert_eq!(params.get("FechaFin"), Some(&Value::Null));
        assert_eq!(params.get("Estado"), Some(&json!("Aprobado")));
    }

    #[tokio::test]
    async fn refused_report_is_a_server_error() {
        let (app, _) = test_app(reports());
        let (status, body) = send(
            &app,
            "GET",
            "/api/reportes/indicios?tipoIndicio=Arma",
            Some(&token(10, Role::Tecnico)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error al generar reporte");
    }

    #[tokio::test]
    async fn activity_report_is_for_reviewers() {
        let (app, backend) = test_app(reports());
        let uri = "/api/reportes/actividad-usuarios?usuarioId=7";

        let (status, _) = send(&app, "GET", uri, Some(&token(10, Role::Tecnico)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        for rol in [Role::Coordinador, Role::Administrador] {
            let (status, _) = send(&app, "GET", uri, Some(&token(1, rol)), None).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(
            backend.calls_to(REPORTE_ACTIVIDAD_USUARIOS)[0].get("UsuarioID"),
            Some(&json!(7))
        );

        let (status, body) = send(
            &app,
            "GET",
            "/api/reportes/actividad-usuarios?usuarioId=siete",
            Some(&token(1, Role::Coordinador)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "usuarioId");
    }

    #[tokio::test]
    async fn trends_default_to_the_current_year() {
        let (app, backend) = test_app(reports());
        let reader = token(10, Role::Tecnico);

        let (status, body) =
            send(&app, "GET", "/api/reportes/tendencias-mensuales", Some(&reader), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, _) = send(
            &app,
            "GET",
            "/api/reportes/tendencias-mensuales?a%C3%B1o=2023",
            Some(&reader),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let calls = backend.calls_to(REPORTE_TENDENCIAS_MENSUALES);
        assert_eq!(calls[0].get("Año"), Some(&json!(Utc::now().year())));
        assert_eq!(calls[1].get("Año"), Some(&json!(2023)));

        let (status, body) = send(
            &app,
            "GET",
            "/api/reportes/tendencias-mensuales?a%C3%B1o=dos",
            Some(&reader),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "año");
        assert_eq!(body["errors"][0]["message"], "Año inválido");
    }
}
