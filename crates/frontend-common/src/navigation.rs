//! Navigation seam between the session store and whatever owns the history

use serde::{Deserialize, Serialize};
use tracing::debug;
use yew_router::navigator::Navigator;

use crate::routes::AppRoute;

/// History state carried by a guard redirect so the login view can send the
/// user back afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnTo {
    pub from: String,
}

pub trait RouteNavigator {
    /// Add a history entry, e.g. after logout
    fn navigate(&self, route: &AppRoute);

    /// Swap the current history entry for `route`
    fn replace(&self, route: &AppRoute) {
        self.navigate(route);
    }

    /// Guard redirect: replaces the guarded entry so Back does not bounce
    /// into it again, remembering the path the user originally asked for
    fn redirect(&self, route: &AppRoute, from: Option<&str>) {
        let _ = from;
        self.replace(route);
    }
}

impl RouteNavigator for Navigator {
    fn navigate(&self, route: &AppRoute) {
        debug!(to = %route, "Navigating");
        self.push(route);
    }

    fn replace(&self, route: &AppRoute) {
        debug!(to = %route, "Replacing history entry");
        Navigator::replace(self, route);
    }

    fn redirect(&self, route: &AppRoute, from: Option<&str>) {
        match from {
            Some(from) => {
                debug!(to = %route, from, "Redirecting");
                self.replace_with_state(
                    route,
                    ReturnTo {
                        from: from.to_string(),
                    },
                );
            }
            None => RouteNavigator::replace(self, route),
        }
    }
}
