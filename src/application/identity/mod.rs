//! Identity: credential checks and token issuance

pub mod service;

pub use service::{AuthError, AuthResult, AuthService, NewUser};
