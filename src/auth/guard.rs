//! Navigation guard
//!
//! Runs before every in-app navigation and decides whether it may proceed
//! or must be redirected, based on static route metadata and the session.

use super::gateway::AuthGateway;
use super::session::SessionStore;
use super::storage::TokenStorage;
use std::fmt;
use tracing::debug;

/// Static flags attached to a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub guest_only: bool,
}

impl RouteMeta {
    pub fn requires_auth() -> Self {
        Self {
            requires_auth: true,
            guest_only: false,
        }
    }

    pub fn guest_only() -> Self {
        Self {
            requires_auth: false,
            guest_only: true,
        }
    }
}

/// A named, addressable route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub path: String,
    pub meta: RouteMeta,
}

/// Target of a navigation, as seen by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub route: String,
    pub meta: RouteMeta,
}

impl NavigationIntent {
    pub fn new(route: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            route: route.into(),
            meta,
        }
    }
}

impl From<&Route> for NavigationIntent {
    fn from(route: &Route) -> Self {
        Self::new(route.name.clone(), route.meta)
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDecision {
    Proceed,
    /// Go to the named route instead
    Redirect(String),
}

impl fmt::Display for NavDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavDecision::Proceed => write!(f, "proceed"),
            NavDecision::Redirect(route) => write!(f, "redirect {}", route),
        }
    }
}

/// Names of the routes the guard redirects to or treats specially
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub login_route: String,
    pub register_route: String,
    pub home_route: String,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            login_route: "login".to_string(),
            register_route: "register".to_string(),
            home_route: "home".to_string(),
        }
    }
}

/// Decide a navigation from metadata and authentication state alone.
///
/// The login and register destinations count as guest-only even when their
/// metadata does not say so.
pub fn decide(intent: &NavigationIntent, authenticated: bool, policy: &GuardPolicy) -> NavDecision {
    if intent.meta.requires_auth && !authenticated {
        return NavDecision::Redirect(policy.login_route.clone());
    }

    let guest_only = intent.meta.guest_only
        || intent.route == policy.login_route
        || intent.route == policy.register_route;
    if guest_only && authenticated {
        return NavDecision::Redirect(policy.home_route.clone());
    }

    NavDecision::Proceed
}

/// Guard bound to a policy; consults a [`SessionStore`] on each navigation
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    policy: GuardPolicy,
}

impl NavigationGuard {
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Check a navigation, hydrating the session first if a token is held
    /// without a profile. The decision waits for that hydration to settle.
    pub async fn before_each<G, S>(
        &self,
        store: &SessionStore<G, S>,
        intent: &NavigationIntent,
    ) -> NavDecision
    where
        G: AuthGateway,
        S: TokenStorage,
    {
        if store.needs_hydration() {
            if let Err(e) = store.ensure_hydrated().await {
                debug!("Hydration before navigation failed: {}", e);
            }
        }

        let decision = decide(intent, store.is_authenticated(), &self.policy);
        debug!("Navigation to '{}': {}", intent.route, decision);
        decision
    }
}

/// Known routes and their metadata
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `home` at `/` requires auth; `login` and `register` are guest-only
    pub fn with_defaults() -> Self {
        Self::new()
            .route("home", "/", RouteMeta::requires_auth())
            .route("login", "/login", RouteMeta::guest_only())
            .route("register", "/register", RouteMeta::guest_only())
    }

    /// Add a route, replacing any route with the same name
    pub fn route(mut self, name: &str, path: &str, meta: RouteMeta) -> Self {
        self.routes.retain(|r| r.name != name);
        self.routes.push(Route {
            name: name.to_string(),
            path: normalize_path(path),
            meta,
        });
        self
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Find the route for a path; trailing slashes are ignored
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = normalize_path(path);
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
