//! Page-level access guard for the admin section.
//!
//! Page loaders await the parent (layout) data and either render or redirect.
//! The guard never fails on its own: a non-admin session becomes a `302 Found` to the
//! home route, and anything the parent loader raises is passed through untouched.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::future::Future;

use crate::{
    error::AppError,
    models::{AdminPageData, ParentData, User},
};

/// The only role value that grants access. Compared case-sensitively.
pub const ADMIN_ROLE: &str = "admin";

/// Where unauthorized page loads are sent.
pub const HOME_PATH: &str = "/";

/// PageRedirect
///
/// A redirect signal. The router turns it into a response with the given status and
/// `Location` header instead of rendering the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRedirect {
    pub status: StatusCode,
    pub location: &'static str,
}

impl PageRedirect {
    /// `302 Found` to `/`.
    pub fn home() -> Self {
        Self {
            status: StatusCode::FOUND,
            location: HOME_PATH,
        }
    }
}

impl IntoResponse for PageRedirect {
    fn into_response(self) -> Response {
        (self.status, [(header::LOCATION, self.location)]).into_response()
    }
}

/// LoadError
///
/// Outcome of a page load that did not render: either the guard's redirect, or a
/// failure of the parent loader that the guard propagated.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("redirect to {}", .0.location)]
    Redirect(PageRedirect),

    #[error(transparent)]
    Parent(#[from] AppError),
}

impl IntoResponse for LoadError {
    fn into_response(self) -> Response {
        match self {
            LoadError::Redirect(redirect) => redirect.into_response(),
            LoadError::Parent(err) => err.into_response(),
        }
    }
}

/// True only for a present user whose role is exactly `"admin"`.
pub fn is_admin(user: Option<&User>) -> bool {
    user.and_then(|u| u.role.as_deref()) == Some(ADMIN_ROLE)
}

/// Branches on already-resolved parent data.
pub fn authorize(data: &ParentData) -> Result<(), PageRedirect> {
    if is_admin(data.user.as_ref()) {
        Ok(())
    } else {
        Err(PageRedirect::home())
    }
}

/// load_admin_page
///
/// Loader for admin pages. Awaits `parent`; redirects to `/` unless the session user is
/// an admin, otherwise returns the empty page payload.
pub async fn load_admin_page<F>(parent: F) -> Result<AdminPageData, LoadError>
where
    F: Future<Output = Result<ParentData, AppError>>,
{
    let data = parent.await?;

    if let Err(redirect) = authorize(&data) {
        tracing::info!(
            user_id = ?data.user.as_ref().map(|u| u.id),
            "non-admin session on admin page, redirecting"
        );
        return Err(LoadError::Redirect(redirect));
    }

    Ok(AdminPageData::default())
}
