//! Shared fixtures for the session integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use storefront_core::StorefrontConfig;
use storefront_frontend_common::{AppRoute, MemoryStorage, RouteNavigator, SessionStore};
use storefront_http::StorefrontClient;
use wiremock::MockServer;

#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: RefCell<Vec<AppRoute>>,
}

impl RouteNavigator for RecordingNavigator {
    fn navigate(&self, route: &AppRoute) {
        self.visited.borrow_mut().push(route.clone());
    }
}

pub struct Harness {
    pub store: SessionStore,
    pub storage: Rc<MemoryStorage>,
    pub navigator: Rc<RecordingNavigator>,
}

pub fn harness(base_url: &str) -> Harness {
    harness_with_storage(base_url, Rc::new(MemoryStorage::default()))
}

pub fn harness_with_storage(base_url: &str, storage: Rc<MemoryStorage>) -> Harness {
    let config = StorefrontConfig::with_base_url(base_url);
    let client = StorefrontClient::from_config(&config).unwrap();
    let navigator = Rc::new(RecordingNavigator::default());
    let store = SessionStore::new(client, storage.clone(), &config)
        .with_navigator(navigator.clone());

    Harness {
        store,
        storage,
        navigator,
    }
}

pub async fn server() -> MockServer {
    MockServer::start().await
}

pub fn auth_body(token: &str, role: &str) -> Value {
    json!({
        "token": token,
        "user": {
            "_id": "u-1",
            "name": "Ann",
            "email": "ann@example.com",
            "role": role,
            "isApproved": true
        }
    })
}
