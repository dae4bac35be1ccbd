//! Authentication module: login, account creation, token introspection

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
