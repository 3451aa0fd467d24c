//! # freightline-routes
//!
//! The navigation layer over `freightline-auth`: the static route table,
//! the access guards evaluated per navigation, path resolution, and the
//! post-action navigation rules.
//!
//! Everything here is data-in, data-out. Guards decide
//! render/loading/redirect; the orchestrator decides where a successful
//! action leads; the embedding shell performs the actual transitions.

pub mod actions;
pub mod guards;
pub mod nav;
pub mod router;
pub mod routes;

pub use actions::AuthActions;
pub use guards::{evaluate, GuardOutcome};
pub use nav::{NavState, Navigation};
pub use router::{navigate, resolve, RouteMatch};
pub use routes::{all_routes, find_by_path, paths, GuardKind, Route, RouteGroup, View};
