//! Route guard deciding whether a view may render for a session.

use serde::{Deserialize, Serialize};

use crate::services::{Navigation, SessionStore};

/// A dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[serde(rename = "signin")]
    SignIn,
    StoreSetup,
    Dashboard,
    Menu,
    Profile,
    Orders,
    Settings,
    Payments,
    Users,
}

impl View {
    pub const ALL: [Self; 9] = [
        Self::SignIn,
        Self::StoreSetup,
        Self::Dashboard,
        Self::Menu,
        Self::Profile,
        Self::Orders,
        Self::Settings,
        Self::Payments,
        Self::Users,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "signin",
            Self::StoreSetup => "store-setup",
            Self::Dashboard => "dashboard",
            Self::Menu => "menu",
            Self::Profile => "profile",
            Self::Orders => "orders",
            Self::Settings => "settings",
            Self::Payments => "payments",
            Self::Users => "users",
        }
    }

    /// Whether the view needs a signed-in session.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        !matches!(self, Self::SignIn)
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| format!("unknown view: {s}"))
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "redirect", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    Redirect(Navigation),
}

pub struct RouteGuard;

impl RouteGuard {
    /// Decide whether `view` may render for `session`. Reads only.
    #[must_use]
    pub const fn check(session: &SessionStore, view: View) -> GuardDecision {
        if !view.is_protected() {
            return GuardDecision::Allow;
        }
        if !session.is_authenticated() {
            return GuardDecision::Redirect(Navigation::SignIn);
        }
        if !session.is_setup_complete() && !matches!(view, View::StoreSetup) {
            return GuardDecision::Redirect(Navigation::StoreSetup);
        }
        GuardDecision::Allow
    }

    /// Run `render` only when the guard allows `view`.
    ///
    /// # Errors
    ///
    /// Returns the redirect target without calling `render` otherwise.
    pub fn render<T>(
        session: &SessionStore,
        view: View,
        render: impl FnOnce(&SessionStore) -> T,
    ) -> Result<T, Navigation> {
        match Self::check(session, view) {
            GuardDecision::Allow => Ok(render(session)),
            GuardDecision::Redirect(target) => Err(target),
        }
    }
}
