use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    repository::Repository,
};

/// Name of the cookie carrying the session credential.
pub const SESSION_COOKIE: &str = "fjb_session";

/// Claims
///
/// Payload of the signed session credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): UUID of the principal, the primary key of the `users` table.
    pub sub: Uuid,
    /// Expiration Time (exp): seconds since the epoch after which the credential is rejected.
    pub exp: usize,
    /// Issued At (iat)
    pub iat: usize,
}

/// Principal
///
/// The authenticated caller, resolved once per request by the routing pipeline and stored in the
/// request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

/// SessionOutcome
///
/// Result of validating one request's credentials.
#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// `None` means anonymous.
    pub principal: Option<Principal>,
    /// Re-issued credential that must be set on the outgoing response.
    pub refreshed: Option<Cookie<'static>>,
}

impl SessionOutcome {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// SessionValidator
///
/// Issues and validates the cookie-borne session credential (HS256 JWT).
#[derive(Clone)]
pub struct SessionValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    refresh_window_secs: i64,
    secure_cookie: bool,
}

impl std::fmt::Debug for SessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionValidator")
            .field("ttl_secs", &self.ttl_secs)
            .field("refresh_window_secs", &self.refresh_window_secs)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

impl SessionValidator {
    /// from_config
    ///
    /// Production builds mark the cookie `Secure`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.session_secret,
            config.session_ttl_secs,
            config.session_refresh_window_secs,
            config.env == Env::Production,
        )
    }

    pub fn new(secret: &str, ttl_secs: i64, refresh_window_secs: i64, secure_cookie: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            refresh_window_secs,
            secure_cookie,
        }
    }

    /// issue
    ///
    /// Signs a new credential for `principal_id`, valid for the configured TTL.
    pub fn issue(&self, principal_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: principal_id,
            iat: to_claim(now),
            exp: to_claim(now + self.ttl_secs),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// session_cookie
    ///
    /// Wraps a credential in the session cookie with its hardening attributes.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .build()
    }

    /// removal_cookie
    ///
    /// A cookie that, once added to a jar, clears the session on the client.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, "")).path("/").build()
    }

    /// validate
    ///
    /// Resolves the caller from the request cookies with a single principal lookup.
    ///
    /// Anything inconclusive (no cookie, bad signature, expired credential, unknown principal,
    /// failed lookup) yields an anonymous outcome; validation never grants access on error.
    /// A credential close to expiry is re-issued and returned in `refreshed`.
    pub async fn validate(&self, jar: &CookieJar, repo: &dyn Repository) -> SessionOutcome {
        let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) else {
            return SessionOutcome::anonymous();
        };

        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let claims = match decode::<Claims>(cookie.value(), &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "session credential rejected");
                return SessionOutcome::anonymous();
            }
        };

        let user = match repo.get_user(claims.sub).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!(principal = %claims.sub, "session principal no longer exists");
                return SessionOutcome::anonymous();
            }
            Err(e) => {
                tracing::warn!(error = %e, "principal lookup failed, treating request as anonymous");
                return SessionOutcome::anonymous();
            }
        };

        let refreshed = if self.needs_refresh(claims.exp) {
            match self.issue(user.id) {
                Ok(token) => Some(self.session_cookie(token)),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to re-issue session credential");
                    None
                }
            }
        } else {
            None
        };

        SessionOutcome {
            principal: Some(Principal {
                id: user.id,
                email: user.email,
            }),
            refreshed,
        }
    }

    fn needs_refresh(&self, exp: usize) -> bool {
        let remaining = i64::try_from(exp).unwrap_or(i64::MAX) - Utc::now().timestamp();
        remaining < self.refresh_window_secs
    }
}

fn to_claim(timestamp: i64) -> usize {
    usize::try_from(timestamp).unwrap_or(0)
}

/// AuthUser
///
/// Extractor for handlers that require a signed-in owner. It reads the principal the routing
/// pipeline already resolved; it never touches the credential or the data store itself.
///
/// Rejection: `401 Unauthorized` with a JSON error body when the request is anonymous.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}
