//! Route guard: decides, for a session and a requested path, whether the
//! view renders or the user is sent elsewhere.
//!
//! Evaluated on every path change. Pure and synchronous: it reads the
//! session and never touches it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::auth::Role;
use crate::session::Session;

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GuardDecision {
    Render,
    /// Navigate to `to`. With `replace` the guarded path is dropped from
    /// history, so Back does not return to it.
    Redirect { to: String, replace: bool },
}

/// How signed-out requests are gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatePolicy {
    /// Only the landing, sign-up and sign-in paths are public; the sign-in
    /// path is recognised by equality.
    #[default]
    PublicAllowList,
    /// The legacy check: anything other than the landing and
    /// sign-up paths is gated unless it contains the sign-in segment, and the
    /// sign-in path is recognised by substring.
    LegacySubstring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub landing_path: String,
    pub sign_in_path: String,
    pub sign_up_path: String,
    pub policy: GatePolicy,
    /// Where each role goes when it lands on the sign-in page while signed in.
    pub role_landings: Vec<(Role, String)>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            landing_path: "/".into(),
            sign_in_path: "/sign-in".into(),
            sign_up_path: "/sign-up".into(),
            policy: GatePolicy::default(),
            role_landings: vec![
                (Role::Admin, "/dashboard".into()),
                (Role::Student, "/student".into()),
                (Role::Teacher, "/report".into()),
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    config: GuardConfig,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn with_policy(policy: GatePolicy) -> Self {
        Self::new(GuardConfig {
            policy,
            ..GuardConfig::default()
        })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn evaluate(&self, session: &Session, path: &str) -> GuardDecision {
        let Some(user) = session.current_user() else {
            if self.is_gated(path) {
                return GuardDecision::Redirect {
                    to: self.config.sign_in_path.clone(),
                    replace: true,
                };
            }
            return GuardDecision::Render;
        };

        if !self.is_sign_in(path) {
            return GuardDecision::Render;
        }
        match self.landing_for(&user.role) {
            Some(to) => GuardDecision::Redirect {
                to: to.to_string(),
                replace: false,
            },
            None => {
                debug!(role = %user.role, "no landing path for role, staying on sign-in");
                GuardDecision::Render
            }
        }
    }

    /// Landing path for a signed-in role.
    pub fn landing_for(&self, role: &Role) -> Option<&str> {
        self.config
            .role_landings
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, path)| path.as_str())
    }

    fn is_gated(&self, path: &str) -> bool {
        match self.config.policy {
            GatePolicy::PublicAllowList => {
                let path = normalize(path);
                ![
                    &self.config.landing_path,
                    &self.config.sign_up_path,
                    &self.config.sign_in_path,
                ]
                .iter()
                .any(|public| normalize(public) == path)
            }
            GatePolicy::LegacySubstring => {
                path != self.config.landing_path
                    && path != self.config.sign_up_path
                    && !path.contains(self.sign_in_segment())
            }
        }
    }

    fn is_sign_in(&self, path: &str) -> bool {
        match self.config.policy {
            GatePolicy::PublicAllowList => normalize(path) == normalize(&self.config.sign_in_path),
            GatePolicy::LegacySubstring => path.contains(self.sign_in_segment()),
        }
    }

    fn sign_in_segment(&self) -> &str {
        self.config.sign_in_path.trim_start_matches('/')
    }
}

/// Drop trailing slashes; the root stays `/`.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
