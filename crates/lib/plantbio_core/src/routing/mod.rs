//! Route table and role-based filtering.
//!
//! The table is static: built once at startup, never mutated. Filtering
//! and matching hand back copies.

pub mod guard;

use serde::{Deserialize, Serialize};

use crate::models::auth::Role;

pub use guard::{GatePolicy, GuardConfig, GuardDecision, RouteGuard};

/// One entry of the route tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    /// Path relative to the parent. `None` for index routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Index routes render at the parent's own path.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub index: bool,
    /// Name of the view rendered here.
    pub view: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            index: false,
            view: view.into(),
            required_role: None,
            children: Vec::new(),
        }
    }

    pub fn index(view: impl Into<String>) -> Self {
        Self {
            path: None,
            index: true,
            view: view.into(),
            required_role: None,
            children: Vec::new(),
        }
    }

    pub fn requires(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    pub fn with_children(mut self, children: Vec<RouteDescriptor>) -> Self {
        self.children = children;
        self
    }

    /// Unrestricted entries are visible to everyone, restricted ones only to
    /// the exact role.
    pub fn is_visible_to(&self, role: Option<&Role>) -> bool {
        match &self.required_role {
            None => true,
            Some(required) => role == Some(required),
        }
    }
}

/// Keep the top-level entries `role` may use, in table order.
///
/// A dropped entry takes its children with it; a kept entry keeps all of
/// its children.
pub fn filter_routes(routes: &[RouteDescriptor], role: Option<&Role>) -> Vec<RouteDescriptor> {
    routes
        .iter()
        .filter(|route| route.is_visible_to(role))
        .cloned()
        .collect()
}

/// A resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    /// The innermost view that renders.
    pub view: String,
    /// Full pattern of the matched route, e.g. `/teacher/book`.
    pub pattern: String,
}

/// Resolve `path` against a route tree.
///
/// Static segments are matched in table order; an index child answers for
/// its parent's own path; `*` at a level catches whatever that level did
/// not match.
pub fn match_path(routes: &[RouteDescriptor], path: &str) -> Option<RouteMatch> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match_level(routes, &segments, "")
}

fn match_level(routes: &[RouteDescriptor], segments: &[&str], prefix: &str) -> Option<RouteMatch> {
    let mut splat = None;

    for route in routes {
        if route.index {
            if segments.is_empty() {
                return Some(RouteMatch {
                    view: route.view.clone(),
                    pattern: pattern_of(prefix),
                });
            }
            continue;
        }
        let Some(path) = route.path.as_deref() else {
            continue;
        };
        if path == "*" {
            splat.get_or_insert(route);
            continue;
        }

        let own: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if own.len() > segments.len() || segments[..own.len()] != own[..] {
            continue;
        }
        let rest = &segments[own.len()..];
        let pattern = own.iter().fold(prefix.to_string(), |acc, s| format!("{acc}/{s}"));

        if let Some(found) = match_level(&route.children, rest, &pattern) {
            return Some(found);
        }
        if rest.is_empty() {
            return Some(RouteMatch {
                view: route.view.clone(),
                pattern: pattern_of(&pattern),
            });
        }
    }

    splat.map(|route| RouteMatch {
        view: route.view.clone(),
        pattern: format!("{prefix}/*"),
    })
}

fn pattern_of(prefix: &str) -> String {
    if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix.to_string()
    }
}

/// The portal's route tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// Landing, auth pages, one area per role, and the not-found fallback.
    pub fn application() -> Self {
        Self::new(vec![
            RouteDescriptor::new("/", "landing"),
            RouteDescriptor::new("sign-in", "sign-in"),
            RouteDescriptor::new("sign-up", "sign-up"),
            RouteDescriptor::new("student", "student").requires(Role::Student),
            RouteDescriptor::new("teacher", "teacher")
                .requires(Role::Teacher)
                .with_children(vec![
                    RouteDescriptor::index("report"),
                    RouteDescriptor::new("report", "report"),
                    RouteDescriptor::new("book", "teacher-book"),
                    RouteDescriptor::new("chapter", "teacher-chapter"),
                    RouteDescriptor::new("lesson", "teacher-lesson"),
                    RouteDescriptor::new("biology", "teacher-biology"),
                ]),
            RouteDescriptor::new("admin", "admin")
                .requires(Role::Admin)
                .with_children(vec![
                    RouteDescriptor::index("dashboard"),
                    RouteDescriptor::new("dashboard", "dashboard"),
                    RouteDescriptor::new("account", "account"),
                    RouteDescriptor::new("book", "book"),
                    RouteDescriptor::new("chapter", "chapter"),
                    RouteDescriptor::new("lesson", "lesson"),
                    RouteDescriptor::new("biology", "biology"),
                ]),
            RouteDescriptor::new("*", "not-found"),
        ])
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// The entries `role` may navigate to.
    pub fn for_role(&self, role: Option<&Role>) -> Vec<RouteDescriptor> {
        filter_routes(&self.routes, role)
    }

    /// Resolve `path` within what `role` may navigate to.
    pub fn resolve(&self, path: &str, role: Option<&Role>) -> Option<RouteMatch> {
        match_path(&self.for_role(role), path)
    }
}
