use std::collections::HashMap;

use crate::models::Session;

pub mod guard;

pub use guard::{require_auth, GuardDecision};

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Pages of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Login,
    Movie,
    Library,
    Groups,
    GroupDetail,
    Recommendations,
    NotFound,
}

/// One entry of the route table
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: &'static str,
    pub page: Page,
    /// Protected routes go through [`require_auth`]
    pub protected: bool,
}

/// Outcome of navigating to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render {
        page: Page,
        params: HashMap<String, String>,
    },
    /// Session not resolved yet; render nothing decisive
    Defer,
    Redirect {
        to: &'static str,
        replace: bool,
    },
}

/// Path-to-page table with the auth guard applied to protected routes
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

/// Creates the client router with all pages
pub fn create_router() -> Router {
    Router::new()
        .route("/", Page::Home, false)
        .route("/login", Page::Login, false)
        .route("/movie/:tmdbId", Page::Movie, false)
        // Signed-in pages
        .route("/library", Page::Library, true)
        .route("/groups", Page::Groups, true)
        .route("/groups/:groupId", Page::GroupDetail, true)
        .route("/recommendations", Page::Recommendations, true)
        .route("*", Page::NotFound, false)
}

impl Router {
    /// An empty table; every path resolves to [`Page::NotFound`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route; earlier routes win
    pub fn route(mut self, pattern: &'static str, page: Page, protected: bool) -> Self {
        self.routes.push(Route {
            pattern,
            page,
            protected,
        });
        self
    }

    /// Resolves `path` against the table and, for protected pages, the session.
    ///
    /// Nothing is remembered between calls, so a session change is reflected
    /// on the very next resolve.
    pub fn resolve(&self, path: &str, session: &Session) -> Navigation {
        let Some((route, params)) = self.match_path(path) else {
            return Navigation::Render {
                page: Page::NotFound,
                params: HashMap::new(),
            };
        };

        if route.protected {
            match require_auth(session) {
                GuardDecision::Defer => return Navigation::Defer,
                GuardDecision::Redirect { to } => {
                    tracing::debug!(path = %path, to = %to, "Redirecting anonymous visitor");
                    return Navigation::Redirect { to, replace: true };
                }
                GuardDecision::Allow => {}
            }
        }

        Navigation::Render {
            page: route.page,
            params,
        }
    }

    fn match_path(&self, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.routes.iter().find_map(|route| {
            match_pattern(route.pattern, &segments).map(|params| (route, params))
        })
    }
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<HashMap<String, String>> {
    if pattern == "*" {
        return Some(HashMap::new());
    }

    let expected: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if expected.len() != segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (expected, actual) in expected.iter().zip(segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }

    Some(params)
}
