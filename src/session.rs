use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::ParentData,
    repository::RepositoryState,
};

/// Name of the cookie carrying the session JWT on browser page loads.
pub const SESSION_COOKIE: &str = "token";

/// Header accepted in `Env::Local` to impersonate an existing user by id.
pub const BYPASS_HEADER: &str = "x-user-id";

/// Claims
///
/// Payload of a session JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the UUID of the user in `public.profiles`.
    pub sub: Uuid,
    /// Expiration time (seconds since epoch). Always validated.
    pub exp: usize,
    /// Issued at (seconds since epoch).
    pub iat: usize,
}

/// ParentLoader
///
/// The upstream loader that resolves layout-scoped data (the session user) for a request.
/// Page loaders await it before deciding what to render.
#[async_trait]
pub trait ParentLoader: Send + Sync {
    async fn parent(&self, parts: &Parts) -> Result<ParentData, AppError>;
}

/// SessionLoader
///
/// Resolves the session user from the request:
/// 1. `Env::Local` only: the `x-user-id` header naming an existing user.
/// 2. `Authorization: Bearer <jwt>`, falling back to the `token` cookie.
/// 3. The JWT subject is looked up in the repository.
///
/// A missing, expired or forged token is not an error: it yields `user: null`.
/// Repository failures are errors and propagate to the caller.
#[derive(Clone)]
pub struct SessionLoader {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl SessionLoader {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }

    fn decode_claims(&self, token: &str) -> Option<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    other => tracing::debug!("session token rejected: {:?}", other),
                }
                None
            }
        }
    }
}

#[async_trait]
impl ParentLoader for SessionLoader {
    async fn parent(&self, parts: &Parts) -> Result<ParentData, AppError> {
        if self.config.env == Env::Local {
            if let Some(user_id) = bypass_user_id(parts) {
                if let Some(user) = self.repo.get_user(user_id).await? {
                    return Ok(ParentData { user: Some(user) });
                }
            }
        }

        let Some(token) = session_token(parts) else {
            return Ok(ParentData::default());
        };
        let Some(claims) = self.decode_claims(&token) else {
            return Ok(ParentData::default());
        };

        let user = self.repo.get_user(claims.sub).await?;
        if user.is_none() {
            tracing::debug!(user_id = %claims.sub, "token subject has no profile");
        }

        Ok(ParentData { user })
    }
}

fn bypass_user_id(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(BYPASS_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Bearer token from the `Authorization` header, else the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Lets handlers take the resolved layout data directly as an argument.
impl<S> FromRequestParts<S> for ParentData
where
    S: Send + Sync,
    SessionLoader: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        SessionLoader::from_ref(state).parent(parts).await
    }
}
