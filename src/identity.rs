use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// IdentityError
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider refused the credentials (email taken, weak password, wrong password).
    #[error("{0}")]
    Rejected(String),
    /// The provider could not be reached or answered with something unexpected.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

// 1. IdentityProvider Contract
/// IdentityProvider
///
/// Abstract contract for the external service that owns passwords. The application only ever learns
/// the resulting principal id; sessions are issued locally by `auth::SessionValidator`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a principal and returns its id.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, IdentityError>;

    /// Checks credentials of an existing principal and returns its id.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, IdentityError>;
}

// 2. The Real Implementation (Supabase Auth)
/// SupabaseIdentityClient
///
/// Talks to the Supabase Auth REST API (`/auth/v1`).
#[derive(Clone)]
pub struct SupabaseIdentityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// The provider answers either with a bare user object or with a session wrapping one.
#[derive(Deserialize)]
struct ProviderUserResponse {
    id: Option<Uuid>,
    user: Option<ProviderUser>,
}

#[derive(Deserialize)]
struct ProviderUser {
    id: Uuid,
}

#[derive(Deserialize)]
struct ProviderErrorResponse {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
}

impl SupabaseIdentityClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response
                .json::<ProviderErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.msg.or(body.error_description).or(body.message))
                .unwrap_or_else(|| "Sign in failed.".to_string());
            return Err(IdentityError::Rejected(reason));
        }
        if !status.is_success() {
            return Err(IdentityError::Unavailable(format!("unexpected status {status}")));
        }

        let body = response
            .json::<ProviderUserResponse>()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        body.user
            .map(|user| user.id)
            .or(body.id)
            .ok_or_else(|| IdentityError::Unavailable("response carried no user id".to_string()))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        self.post_credentials("/auth/v1/signup", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        self.post_credentials("/auth/v1/token?grant_type=password", email, password)
            .await
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentityProvider
///
/// In-memory provider keyed by email, used by the integration tests.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    accounts: Arc<Mutex<HashMap<String, (Uuid, String)>>>,
    /// When true, all operations return a simulated outage.
    pub should_fail: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Uuid, String)>> {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Unavailable("Mock Identity Error".to_string()));
        }
        let mut accounts = self.accounts();
        if accounts.contains_key(email) {
            return Err(IdentityError::Rejected("User already registered".to_string()));
        }
        let id = Uuid::new_v4();
        accounts.insert(email.to_string(), (id, password.to_string()));
        Ok(id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Unavailable("Mock Identity Error".to_string()));
        }
        match self.accounts().get(email) {
            Some((id, stored)) if stored == password => Ok(*id),
            _ => Err(IdentityError::Rejected("Invalid login credentials".to_string())),
        }
    }
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;
