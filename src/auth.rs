use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    error::AppError,
    guard,
    models::{ParentData, User},
    session::SessionLoader,
};

/// Roles allowed on user-level API routes. Accounts awaiting approval (`pending`) or
/// carrying any other role are refused.
pub const VERIFIED_ROLES: [&str; 2] = ["user", guard::ADMIN_ROLE];

/// AuthUser
///
/// Extractor for JSON API routes that need a verified user. Rejects with
/// `401 Unauthorized` when the session resolves to no user, and with `401`
/// `ACCESS_PROHIBITED` when the user's role is not one of [`VERIFIED_ROLES`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionLoader: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ParentData { user } = ParentData::from_request_parts(parts, state).await?;
        let user = user.ok_or(AppError::Unauthorized)?;

        let verified = user
            .role
            .as_deref()
            .is_some_and(|role| VERIFIED_ROLES.contains(&role));
        if !verified {
            tracing::warn!(user_id = %user.id, role = ?user.role, "API call by unverified user");
            return Err(AppError::AccessProhibited);
        }

        Ok(AuthUser(user))
    }
}

/// AdminUser
///
/// Extractor for admin-only API routes. Unlike the page guard, API callers get an error
/// body rather than a redirect: `401` with `ACCESS_PROHIBITED` for non-admins.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    SessionLoader: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !guard::is_admin(Some(&user)) {
            tracing::warn!(user_id = %user.id, "admin API call by non-admin");
            return Err(AppError::AccessProhibited);
        }

        Ok(AdminUser(user))
    }
}
