//! Route guard component

use storefront_core::Role;
use yew::prelude::*;
use yew_router::hooks::{use_location, use_navigator};

use super::session_provider::use_session;
use super::spinner::LoadingSpinner;
use crate::guard::{GuardDecision, RouteGuardConfig, evaluate};
use crate::navigation::RouteNavigator;
use crate::routes::AppRoute;

#[derive(Properties, PartialEq)]
pub struct ProtectedRouteProps {
    #[prop_or_default]
    pub children: Children,
    #[prop_or(true)]
    pub requires_auth: bool,
    #[prop_or_default]
    pub required_role: Option<Role>,
    #[prop_or(AppRoute::Login)]
    pub redirect_to: AppRoute,
    /// Shown while the session is being restored
    #[prop_or_default]
    pub loading: Option<Html>,
}

#[function_component(ProtectedRoute)]
pub fn protected_route(props: &ProtectedRouteProps) -> Html {
    let session = use_session();
    let location = use_location();
    let navigator = use_navigator();

    let requested = location
        .map(|location| location.path().to_string())
        .unwrap_or_default();
    let config = RouteGuardConfig {
        requires_auth: props.requires_auth,
        required_role: props.required_role,
        redirect_path: props.redirect_to.clone(),
    };
    let decision = evaluate(&config, &session.snapshot, &requested);

    use_effect_with(decision.clone(), move |decision| {
        if let GuardDecision::Redirect { to, from } = decision
            && let Some(navigator) = navigator
        {
            navigator.redirect(to, from.as_deref());
        }
    });

    match decision {
        GuardDecision::Loading => props.loading.clone().unwrap_or_else(|| {
            html! { <LoadingSpinner text="Checking authentication..." /> }
        }),
        GuardDecision::Render => html! { <>{ props.children.clone() }</> },
        GuardDecision::Redirect { .. } => Html::default(),
    }
}
