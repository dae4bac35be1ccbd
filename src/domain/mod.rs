//! Domain layer: roles, record vocabulary and the procedure port.

pub mod expediente;
pub mod indicio;
pub mod ports;
pub mod procedures;
pub mod role;
pub mod user;

pub use expediente::EstadoExpediente;
pub use ports::{BackendError, ProcedureBackend, ProcedureOutcome, ProcedureParams, Record};
pub use role::Role;
pub use user::{UserProfile, UserRecord};
