//! Session context provider

use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::hooks::use_navigator;

use crate::session::{SessionSnapshot, SessionStore};

/// What views read from the context: the store handle plus the latest snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    pub store: SessionStore,
    pub snapshot: SessionSnapshot,
}

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub store: SessionStore,
    pub children: Children,
}

/// Must sit inside a router so redirects after logout can reach the history
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let snapshot = use_state(|| props.store.snapshot());
    let navigator = use_navigator();

    // The router's navigator is stable for the provider's lifetime
    use_effect_with((), {
        let store = props.store.clone();
        move |_| {
            if let Some(navigator) = navigator {
                store.attach_navigator(Rc::new(navigator));
            }
        }
    });

    // Re-render on every store transition
    {
        let snapshot = snapshot.clone();
        use_effect_with(props.store.clone(), move |store| {
            let id = {
                let snapshot = snapshot.clone();
                store.subscribe(move |next| snapshot.set(next.clone()))
            };
            snapshot.set(store.snapshot());

            let store = store.clone();
            move || store.unsubscribe(id)
        });
    }

    // Restore the persisted session once on mount
    use_effect_with(props.store.clone(), |store| {
        let store = store.clone();
        spawn_local(async move {
            store.restore_session().await;
        });
    });

    let context = SessionContext {
        store: props.store.clone(),
        snapshot: (*snapshot).clone(),
    };

    html! {
        <ContextProvider<SessionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

/// Hook to use the session context
#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
        .expect("SessionContext not found. Make sure to wrap your component with SessionProvider")
}
