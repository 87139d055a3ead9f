//! Loading spinner component

use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct SpinnerProps {
    #[prop_or_default]
    pub text: Option<AttrValue>,
}

#[function_component(LoadingSpinner)]
pub fn loading_spinner(props: &SpinnerProps) -> Html {
    html! {
        <div class="session-spinner" role="status" aria-live="polite">
            <div class="session-spinner__ring"></div>
            if let Some(text) = &props.text {
                <p class="session-spinner__text">{text.clone()}</p>
            }
        </div>
    }
}
