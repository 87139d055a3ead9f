//! Route table shared by the guard and the session store

use std::fmt;
use storefront_core::{ApprovalStatus, Role, SessionUser};
use yew_router::Routable;

#[derive(Routable, Clone, Debug, PartialEq, Eq)]
pub enum AppRoute {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/admin-dashboard")]
    AdminDashboard,
    #[at("/supplier-dashboard")]
    SupplierDashboard,
    #[at("/pending-approval")]
    PendingApproval,
    #[at("/profile")]
    Profile,
    #[at("/not-authorized")]
    NotAuthorized,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

/// Where a freshly logged-in user should be sent
pub fn landing_route(user: &SessionUser) -> AppRoute {
    match user.role {
        Role::Admin => AppRoute::AdminDashboard,
        Role::Supplier if user.approval_status == Some(ApprovalStatus::Approved) => {
            AppRoute::SupplierDashboard
        }
        Role::Supplier => AppRoute::PendingApproval,
        Role::User | Role::Guest => AppRoute::Profile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, approval_status: Option<ApprovalStatus>) -> SessionUser {
        SessionUser {
            user_id: "u".into(),
            display_name: String::new(),
            email: "u@example.com".into(),
            role,
            approval_status,
        }
    }

    #[test]
    fn landing_depends_on_role_and_approval() {
        assert_eq!(landing_route(&user(Role::Admin, None)), AppRoute::AdminDashboard);
        assert_eq!(
            landing_route(&user(Role::Supplier, Some(ApprovalStatus::Approved))),
            AppRoute::SupplierDashboard
        );
        assert_eq!(
            landing_route(&user(Role::Supplier, Some(ApprovalStatus::Pending))),
            AppRoute::PendingApproval
        );
        assert_eq!(landing_route(&user(Role::User, None)), AppRoute::Profile);
    }

    #[test]
    fn paths_match_the_router() {
        assert_eq!(AppRoute::AdminDashboard.to_path(), "/admin-dashboard");
        assert_eq!(AppRoute::recognize("/pending-approval"), Some(AppRoute::PendingApproval));
        assert_eq!(AppRoute::recognize("/nope"), Some(AppRoute::NotFound));
    }
}
