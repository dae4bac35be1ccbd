//! Names of the stored procedures the API calls.
//!
//! The names and their parameter names are part of the database contract.

// Users / authentication
pub const GET_USUARIO_BY_USERNAME: &str = "sp_GetUsuarioByUsername";
pub const GET_USUARIO_BY_ID: &str = "sp_GetUsuarioById";
pub const CREATE_USUARIO: &str = "sp_CreateUsuario";
pub const GET_ALL_USUARIOS: &str = "sp_GetAllUsuarios";
pub const UPDATE_USUARIO_PROFILE: &str = "sp_UpdateUsuarioProfile";
pub const UPDATE_USUARIO_PASSWORD: &str = "sp_UpdateUsuarioPassword";
pub const TOGGLE_USUARIO_ACTIVE: &str = "sp_ToggleUsuarioActive";
pub const UPDATE_USUARIO_ROLE: &str = "sp_UpdateUsuarioRole";

// Case files
pub const GET_EXPEDIENTES: &str = "sp_GetExpedientes";
pub const GET_EXPEDIENTE_BY_ID: &str = "sp_GetExpedienteById";
pub const CREATE_EXPEDIENTE: &str = "sp_CreateExpediente";
pub const UPDATE_EXPEDIENTE: &str = "sp_UpdateExpediente";
pub const SUBMIT_EXPEDIENTE_FOR_REVIEW: &str = "sp_SubmitExpedienteForReview";
pub const APPROVE_EXPEDIENTE: &str = "sp_ApproveExpediente";
pub const REJECT_EXPEDIENTE: &str = "sp_RejectExpediente";

// Evidence items
pub const GET_INDICIOS_BY_EXPEDIENTE: &str = "sp_GetIndiciosByExpediente";
pub const GET_INDICIO_BY_ID: &str = "sp_GetIndicioById";
pub const CREATE_INDICIO: &str = "sp_CreateIndicio";
pub const UPDATE_INDICIO: &str = "sp_UpdateIndicio";
pub const DELETE_INDICIO: &str = "sp_DeleteIndicio";

// Reports
pub const GET_ESTADISTICAS_GENERALES: &str = "sp_GetEstadisticasGenerales";
pub const REPORTE_EXPEDIENTES: &str = "sp_ReporteExpedientes";
pub const REPORTE_INDICIOS: &str = "sp_ReporteIndicios";
pub const REPORTE_ACTIVIDAD_USUARIOS: &str = "sp_ReporteActividadUsuarios";
pub const REPORTE_TENDENCIAS_MENSUALES: &str = "sp_ReporteTendenciasMensuales";
