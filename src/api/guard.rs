//! Route guard: redirects based on session presence.
//!
//! Evaluated in order, first match wins:
//!
//! 1. `/api/auth/*` passes through.
//! 2. Public routes (`/`) pass through.
//! 3. Auth-only routes (`/login`, `/register`) redirect signed-in users to
//!    `/dashboard`.
//! 4. Everything else is protected and redirects anonymous users to `/login`.
//! 5. Otherwise the request passes.
//!
//! Static assets (any path containing `.`, or starting with `/_next`) are
//! never guarded, except that `/` and any path starting with `/api` or
//! `/trpc` always are.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::handlers::auth::{resolve_session, AuthState, CurrentSession};

pub const API_AUTH_PREFIX: &str = "/api/auth";
pub const PUBLIC_ROUTES: &[&str] = &["/"];
pub const AUTH_ROUTES: &[&str] = &["/login", "/register"];
pub const DEFAULT_LOGIN_REDIRECT: &str = "/dashboard";
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// Pure transition function of the guard.
#[must_use]
pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if path.starts_with(API_AUTH_PREFIX) {
        return GuardDecision::Pass;
    }

    let is_public = PUBLIC_ROUTES.contains(&path);
    if is_public {
        return GuardDecision::Pass;
    }

    let is_auth_route = AUTH_ROUTES.contains(&path);
    if authenticated && is_auth_route {
        return GuardDecision::Redirect(DEFAULT_LOGIN_REDIRECT);
    }

    if !authenticated && !is_auth_route {
        return GuardDecision::Redirect(LOGIN_ROUTE);
    }

    GuardDecision::Pass
}

/// Whether the guard applies to `path` at all.
///
/// `/api` and `/trpc` are plain prefixes, so `/apifoo.txt` is guarded too.
/// `_next` only exempts a path when it opens the first segment.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    if path == "/" || path.starts_with("/api") || path.starts_with("/trpc") {
        return true;
    }
    !(path.contains('.') || path.starts_with("/_next"))
}

/// Middleware form of [`decide`]. Passing requests carry a [`CurrentSession`]
/// extension, empty when there is no valid session.
pub async fn route_guard(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = resolve_session(request.headers(), &auth_state);
    let path = request.uri().path().to_string();

    if is_guarded(&path) {
        if let GuardDecision::Redirect(target) = decide(&path, claims.is_some()) {
            debug!(path = %path, location = target, "Route guard redirect");
            return Redirect::temporary(target).into_response();
        }
    }

    request.extensions_mut().insert(CurrentSession(claims));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_auth_always_passes() {
        for path in ["/api/auth/session", "/api/auth/register", "/api/auth/callback/credentials"] {
            assert_eq!(decide(path, false), GuardDecision::Pass);
            assert_eq!(decide(path, true), GuardDecision::Pass);
        }
    }

    #[test]
    fn public_root_passes() {
        assert_eq!(decide("/", false), GuardDecision::Pass);
        assert_eq!(decide("/", true), GuardDecision::Pass);
    }

    #[test]
    fn auth_routes_redirect_signed_in_users() {
        assert_eq!(decide("/login", true), GuardDecision::Redirect("/dashboard"));
        assert_eq!(decide("/register", true), GuardDecision::Redirect("/dashboard"));
        assert_eq!(decide("/login", false), GuardDecision::Pass);
        assert_eq!(decide("/register", false), GuardDecision::Pass);
    }

    #[test]
    fn protected_routes_redirect_anonymous_users() {
        assert_eq!(decide("/dashboard", false), GuardDecision::Redirect("/login"));
        assert_eq!(decide("/api/users", false), GuardDecision::Redirect("/login"));
        assert_eq!(decide("/dashboard", true), GuardDecision::Pass);
    }

    #[test]
    fn matching_is_exact_for_route_sets() {
        // Only the exact path is public or auth-only.
        assert_eq!(decide("/login/help", true), GuardDecision::Pass);
        assert_eq!(decide("/login/help", false), GuardDecision::Redirect("/login"));
    }

    #[test]
    fn static_assets_are_not_guarded() {
        assert!(!is_guarded("/favicon.ico"));
        assert!(!is_guarded("/_next/static/chunk"));
        assert!(!is_guarded("/images/logo.png"));
        assert!(is_guarded("/dashboard"));
    }

    #[test]
    fn next_only_exempts_a_leading_segment() {
        assert!(!is_guarded("/_next"));
        assert!(!is_guarded("/_nextdata"));
        assert!(is_guarded("/docs/foo_next"));
        assert!(is_guarded("/docs/_next/page"));
    }

    #[test]
    fn api_and_trpc_always_guarded() {
        assert!(is_guarded("/"));
        assert!(is_guarded("/api/file.json"));
        assert!(is_guarded("/trpc/user.get"));
        assert!(is_guarded("/api"));
        assert!(is_guarded("/apifoo.txt"));
        assert!(is_guarded("/trpcx.js"));
    }
}
