pub mod auth;
pub mod expedientes;
pub mod health;
pub mod indicios;
pub mod metrics;
pub mod reportes;
pub mod request_id;
pub mod usuarios;
