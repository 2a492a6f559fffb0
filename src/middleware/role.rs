//! Role guard.
//!
//! [`roles_allow`] is the decision; [`require_roles`] runs it as an axum
//! middleware against the principal of the request. Routes attach it with
//! `middleware::from_fn_with_state(state, require_admin)` (or `require_user`).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use quill_core::AppError;
use quill_models::roles;

use crate::metrics::track_authorization_check;
use crate::middleware::auth::optional_principal;
use crate::state::AppState;

pub const FORBIDDEN_MESSAGE: &str = "Forbidden resource";

/// Whether a principal holding `principal_roles` may pass a route declaring
/// `declared`.
///
/// An empty declaration, or one whose first entry is `""` or `"all"`, admits
/// everyone, including anonymous requests. Otherwise the principal must hold
/// at least one declared role.
pub fn roles_allow<S: AsRef<str>>(declared: &[S], principal_roles: Option<&[String]>) -> bool {
    let first: Option<&str> = declared.first().map(|d| d.as_ref());
    match first {
        None | Some("") | Some("all") => return true,
        Some(_) => {}
    }

    principal_roles.is_some_and(|held| {
        held.iter()
            .any(|role| declared.iter().any(|d| d.as_ref() == role.as_str()))
    })
}

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    declared: &[&str],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let principal = optional_principal(&parts, &state);

    let allowed = roles_allow(declared, principal.as_ref().map(|p| p.roles()));
    track_authorization_check(allowed);

    if !allowed {
        tracing::debug!(
            ?declared,
            principal = principal.as_ref().map(|p| p.0.sub.as_str()),
            "role guard denied request"
        );
        return Err(AppError::forbidden(FORBIDDEN_MESSAGE.to_string()));
    }

    if let Some(principal) = principal {
        parts.extensions.insert(principal);
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Admits principals holding `admin`.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, &[roles::ADMIN])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// Admits principals holding `user` or `admin`.
pub async fn require_user(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, &[roles::USER, roles::ADMIN])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(roles: &[&str]) -> Vec<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_empty_declaration_allows_anyone() {
        let none: [&str; 0] = [];
        assert!(roles_allow(&none, None));
        assert!(roles_allow(&none, Some(held(&["user"]).as_slice())));
    }

    #[test]
    fn test_all_or_blank_first_entry_allows_anyone() {
        assert!(roles_allow(&["all"], None));
        assert!(roles_allow(&["", "admin"], None));
        assert!(roles_allow(&["all", "admin"], Some(held(&[]).as_slice())));
    }

    #[test]
    fn test_intersection_required() {
        assert!(roles_allow(&["admin"], Some(held(&["user", "admin"]).as_slice())));
        assert!(roles_allow(&["user", "admin"], Some(held(&["user"]).as_slice())));
        assert!(!roles_allow(&["admin"], Some(held(&["user"]).as_slice())));
    }

    #[test]
    fn test_missing_principal_or_roles_denied() {
        assert!(!roles_allow(&["user"], None));
        assert!(!roles_allow(&["user"], Some(held(&[]).as_slice())));
    }

    #[test]
    fn test_all_only_counts_in_first_position() {
        assert!(!roles_allow(&["admin", "all"], Some(held(&["user"]).as_slice())));
    }
}
