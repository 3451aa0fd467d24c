//! Path resolution.
//!
//! Resolves the current path against the static table and wraps the route
//! with its guard's decision. Unknown paths land on the fallback route.

use freightline_auth::AuthSnapshot;

use crate::guards::{evaluate, GuardOutcome};
use crate::routes::{fallback_route, find_by_path, Route};

/// A resolved navigation: the route that matched and what its guard said.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub outcome: GuardOutcome,
}

/// Resolve a path to its route definition; unknown paths fall back to 404.
pub fn resolve(path: &str) -> &'static Route {
    find_by_path(path).unwrap_or_else(|| {
        tracing::debug!(%path, "no route matched; using fallback");
        fallback_route()
    })
}

/// Resolve a path and evaluate its guard against the current auth state.
pub fn navigate(snapshot: &AuthSnapshot, path: &str) -> RouteMatch {
    let route = resolve(path);
    let outcome = evaluate(route.guard, snapshot, path);
    RouteMatch { route, outcome }
}
