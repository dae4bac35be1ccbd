//! Identity service: login, account creation and password changes
//!
//! Credentials are checked here; everything else about a user account
//! (uniqueness, activation, role changes) is decided by the stored
//! procedures. HTTP handlers stay thin wrappers around this service.

use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::domain::procedures::{
    CREATE_USUARIO, GET_USUARIO_BY_ID, GET_USUARIO_BY_USERNAME, UPDATE_USUARIO_PASSWORD,
};
use crate::domain::{
    BackendError, ProcedureBackend, ProcedureParams, Role, UserProfile, UserRecord,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig, TokenClaims};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

/// Plaintext compared against when the username is unknown, so that both
/// failure paths pay for one bcrypt verification.
const TIMING_DUMMY_PASSWORD: &str = "dicri-timing-dummy";

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Data for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub rol: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Usuario inactivo")]
    InactiveUser,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Contraseña actual incorrecta")]
    WrongCurrentPassword,

    /// The procedure refused the write; carries its message if it gave one.
    #[error("procedure refused the operation: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Malformed user record: {0}")]
    MalformedUser(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Token(String),
}

pub struct AuthService {
    backend: Arc<dyn ProcedureBackend>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
    dummy_hash: Arc<OnceLock<String>>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn ProcedureBackend>, jwt_config: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            backend,
            jwt_config,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check `username`/`password` and issue a signed token.
    ///
    /// An unknown username and a wrong password produce the same error.
    /// The active flag is only consulted once the password matched.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        let result = self.try_login(username, password).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(AuthError::InvalidCredentials) => "invalid_credentials",
            Err(AuthError::InactiveUser) => "inactive",
            Err(_) => "error",
        };
        metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(auth) => info!(user_id = auth.user.id, username = %auth.user.username, "User logged in"),
            Err(AuthError::InvalidCredentials | AuthError::InactiveUser) => {
                warn!(username = %username, reason = outcome, "Login refused")
            }
            Err(_) => {}
        }

        result
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        let outcome = self
            .backend
            .invoke(
                GET_USUARIO_BY_USERNAME,
                ProcedureParams::new().with("Username", username),
            )
            .await?;

        let record = match outcome.success.then(|| outcome.into_first()).flatten() {
            Some(record) => record,
            None => {
                self.burn_dummy_verification(password).await?;
                return Err(AuthError::InvalidCredentials);
            }
        };

        let user = UserRecord::from_record(record)
            .map_err(|e| AuthError::MalformedUser(e.to_string()))?;

        if !self.verify(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.activo {
            return Err(AuthError::InactiveUser);
        }

        let claims = TokenClaims::for_user(&user, &self.jwt_config)
            .ok_or_else(|| AuthError::Token("token lifetime overflows the expiry".into()))?;
        let token = create_token(&claims, &self.jwt_config)
            .map_err(|e| AuthError::Token(e.to_string()))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_secs,
            user: user.profile(),
        })
    }

    // ── Accounts ────────────────────────────────────────────────

    /// Hash the password and create the account.
    pub async fn register(&self, new_user: NewUser) -> Result<(), AuthError> {
        let password_hash = self.hash(new_user.password).await?;

        let outcome = self
            .backend
            .invoke(
                CREATE_USUARIO,
                ProcedureParams::new()
                    .with("Username", new_user.username.as_str())
                    .with("PasswordHash", password_hash)
                    .with("Nombre", new_user.nombre)
                    .with("Apellido", new_user.apellido)
                    .with("Email", new_user.email)
                    .with("Rol", new_user.rol.as_str()),
            )
            .await?;

        if !outcome.success {
            return Err(AuthError::Rejected(outcome.error));
        }

        info!(username = %new_user.username, rol = %new_user.rol, "User registered");
        Ok(())
    }

    /// Replace the password of `user_id` after checking the current one.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: String,
    ) -> Result<(), AuthError> {
        let outcome = self
            .backend
            .invoke(
                GET_USUARIO_BY_ID,
                ProcedureParams::new().with("UsuarioID", user_id),
            )
            .await?;

        let record = outcome
            .success
            .then(|| outcome.into_first())
            .flatten()
            .ok_or(AuthError::UserNotFound)?;
        let user = UserRecord::from_record(record)
            .map_err(|e| AuthError::MalformedUser(e.to_string()))?;

        if !self.verify(current_password, &user.password_hash).await? {
            return Err(AuthError::WrongCurrentPassword);
        }

        let password_hash = self.hash(new_password).await?;
        let outcome = self
            .backend
            .invoke(
                UPDATE_USUARIO_PASSWORD,
                ProcedureParams::new()
                    .with("UsuarioID", user_id)
                    .with("PasswordHash", password_hash),
            )
            .await?;

        if !outcome.success {
            return Err(AuthError::Rejected(outcome.error));
        }

        info!(user_id, "Password changed");
        Ok(())
    }

    // ── bcrypt on the blocking pool ─────────────────────────────

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// A stored hash bcrypt cannot parse counts as a mismatch.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    async fn burn_dummy_verification(&self, password: &str) -> Result<(), AuthError> {
        let password = password.to_string();
        let dummy = Arc::clone(&self.dummy_hash);
        let cost = self.bcrypt_cost;

        tokio::task::spawn_blocking(move || {
            let hash = dummy
                .get_or_init(|| hash_password(TIMING_DUMMY_PASSWORD, cost).unwrap_or_default());
            let _ = verify_password(&password, hash);
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}
