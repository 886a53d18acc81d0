//! HTTP middleware for the dashboard.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Route guard, applied per handler through the extractors in [`auth`]

pub mod auth;
pub mod guard;
pub mod session;

pub use auth::{
    CurrentSession, DashboardSession, GuardRejection, GuardedSession, RequireDashboard,
    RequireMerchant,
};
pub use guard::{GuardDecision, RouteGuard, View};
pub use session::{SESSION_COOKIE_NAME, SessionConfigError, create_session_layer, with_cookie_settings};
