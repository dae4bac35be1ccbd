pub mod identity;

pub use identity::{AuthError, AuthResult, AuthService, NewUser};
