//! Route access decisions, independent of any rendering framework

use storefront_core::{ApprovalStatus, Role};
use tracing::warn;

use crate::routes::AppRoute;
use crate::session::{SessionSnapshot, SessionStatus};

/// Access rules for one route
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteGuardConfig {
    pub requires_auth: bool,
    /// Exact role the visitor must hold
    pub required_role: Option<Role>,
    /// Where unauthenticated visitors are sent
    pub redirect_path: AppRoute,
}

impl Default for RouteGuardConfig {
    fn default() -> Self {
        Self {
            requires_auth: true,
            required_role: None,
            redirect_path: AppRoute::Login,
        }
    }
}

impl RouteGuardConfig {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            ..Self::default()
        }
    }

    pub fn public() -> Self {
        Self {
            requires_auth: false,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restoration is still running
    Loading,
    Render,
    Redirect {
        to: AppRoute,
        /// Path the visitor originally asked for
        from: Option<String>,
    },
}

pub fn evaluate(
    config: &RouteGuardConfig,
    snapshot: &SessionSnapshot,
    requested_path: &str,
) -> GuardDecision {
    if snapshot.loading || snapshot.status == SessionStatus::Unknown {
        return GuardDecision::Loading;
    }

    let user = match (&snapshot.user, snapshot.is_logged_in()) {
        (Some(user), true) => Some(user),
        (None, true) => {
            warn!(path = requested_path, "Session is authenticated but has no user");
            None
        }
        _ => None,
    };

    let Some(user) = user else {
        if config.requires_auth || config.required_role.is_some() {
            return GuardDecision::Redirect {
                to: config.redirect_path.clone(),
                from: Some(requested_path.to_string()),
            };
        }
        return GuardDecision::Render;
    };

    match config.required_role {
        Some(required) if user.role != required => GuardDecision::Redirect {
            to: AppRoute::NotAuthorized,
            from: None,
        },
        Some(Role::Supplier) => match user.approval_status {
            Some(ApprovalStatus::Approved) => GuardDecision::Render,
            Some(ApprovalStatus::Rejected) => GuardDecision::Redirect {
                to: AppRoute::NotAuthorized,
                from: None,
            },
            Some(ApprovalStatus::Pending) | None => GuardDecision::Redirect {
                to: AppRoute::PendingApproval,
                from: None,
            },
        },
        _ => GuardDecision::Render,
    }
}
