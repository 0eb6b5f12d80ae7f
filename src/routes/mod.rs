//! Router Module Index
//!
//! Routes are grouped by who may reach them, so access control is applied per module
//! rather than per handler registration.

/// Routes open to anonymous clients.
pub mod public;

/// JSON API routes behind the `AuthUser` middleware layer.
pub mod authenticated;

/// Admin pages (redirect guard) and admin-only JSON API routes.
pub mod admin;
