//! # DICRI evidence management API
//!
//! REST service for registering forensic case files (expedientes) and the
//! evidence items (indicios) collected for them, with a review workflow
//! between field technicians and coordinators.
//!
//! ## Architecture
//!
//! - **domain**: roles, record vocabulary and the stored-procedure port
//! - **application**: identity service (login, registration, passwords)
//! - **infrastructure**: PostgreSQL procedure backend, crypto, test backend
//! - **interfaces**: HTTP router, role gates and handlers
//! - **server**: process lifecycle shared by the binaries
//!
//! All business rules live in the database's stored procedures; the service
//! authenticates, authorizes, validates input and relays results.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::{create_router, ApiState, RouterOptions};
