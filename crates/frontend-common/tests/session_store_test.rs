//! Session store behaviour against a mocked backend

mod common;

use async_trait::async_trait;
use common::{auth_body, harness, harness_with_storage, server};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use storefront_core::{
    ApprovalStatus, AuthError, Credentials, Registration, Role, now_millis,
};
use storefront_frontend_common::{
    AppRoute, IdentityProvider, MemoryStorage, ProviderError, SessionStatus, SessionStorage,
    TokenProvider, landing_route,
};
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn stored_session(storage: &MemoryStorage, token: &str, expires_at_ms: i64, user_id: &str) {
    storage.set("token", token).unwrap();
    storage
        .set("tokenExpiration", &expires_at_ms.to_string())
        .unwrap();
    storage
        .set(
            "userData",
            &json!({"userId": user_id, "email": "old@example.com", "role": "user"}).to_string(),
        )
        .unwrap();
}

#[tokio::test]
async fn test_login_then_restore_round_trip() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({"email": "ann@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1", "admin")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/verify-token"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .expect(1)
        .mount(&server)
        .await;

    let first = harness(&server.uri());
    let session = first
        .store
        .login(&Credentials::new(" ann@example.com ", "hunter22"))
        .await
        .unwrap();

    assert_eq!(session.token, "tok-1");
    assert!(session.expires_at_ms > now_millis());
    assert!(first.store.is_logged_in());
    assert!(first.store.is_admin());
    assert!(first.store.is_authenticated());
    assert_eq!(first.storage.get("role").as_deref(), Some("admin"));

    // Simulated reload: a fresh store over the same storage
    let second = harness_with_storage(&server.uri(), first.storage.clone());
    assert_eq!(second.store.snapshot().status, SessionStatus::Unknown);
    assert!(second.store.snapshot().loading);

    let status = second.store.restore_session().await;

    assert_eq!(status, SessionStatus::Authenticated);
    assert!(!second.store.snapshot().loading);
    assert_eq!(second.store.token().as_deref(), Some("tok-1"));
    assert_eq!(second.store.current_user(), Some(session.user));
}

#[tokio::test]
async fn test_invalid_credentials_leave_session_untouched() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"code": "INVALID_CREDENTIALS"})),
        )
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let err = h
        .store
        .login(&Credentials::new("ann@example.com", "wrong-password"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(err.to_string(), "Invalid email or password");

    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Unknown);
    assert_eq!(snapshot.error, Some(AuthError::InvalidCredentials));
    assert!(h.store.token().is_none());
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_empty_credentials_never_reach_the_server() {
    let server = server().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let err = h
        .store
        .login(&Credentials::new("", "secret"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Email and password are required");
}

#[tokio::test]
async fn test_logout_clears_state_when_server_fails() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1", "user")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/logout"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    h.store
        .login(&Credentials::new("ann@example.com", "hunter22"))
        .await
        .unwrap();

    h.store.logout().await;

    assert!(!h.store.is_logged_in());
    assert!(!h.store.is_authenticated());
    assert!(h.store.token().is_none());
    assert!(h.storage.is_empty());
    assert_eq!(h.navigator.visited.borrow().as_slice(), &[AppRoute::Login]);
}

#[tokio::test]
async fn test_logout_clears_state_when_server_unreachable() {
    let storage = Rc::new(MemoryStorage::default());
    stored_session(&storage, "tok-1", now_millis() + 60_000, "u-1");
    storage.set("user", "{}").unwrap();
    storage.set("role", "user").unwrap();

    let h = harness_with_storage("http://127.0.0.1:9", storage);
    h.store.logout().await;

    assert!(h.storage.is_empty());
    assert_eq!(h.store.snapshot().status, SessionStatus::Unauthenticated);
    assert_eq!(h.navigator.visited.borrow().as_slice(), &[AppRoute::Login]);
}

#[tokio::test]
async fn test_is_authenticated_follows_stored_expiry() {
    let storage = Rc::new(MemoryStorage::default());
    let h = harness_with_storage("http://127.0.0.1:9", storage.clone());

    assert!(!h.store.is_authenticated());

    stored_session(&storage, "tok-1", now_millis() - 1_000, "u-1");
    assert!(!h.store.is_authenticated());

    stored_session(&storage, "tok-1", now_millis() + 60_000, "u-1");
    assert!(h.store.is_authenticated());

    storage.remove("tokenExpiration");
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn test_restore_with_expired_token_skips_network() {
    let server = server().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let storage = Rc::new(MemoryStorage::default());
    stored_session(&storage, "tok-1", now_millis() - 1, "u-1");

    let h = harness_with_storage(&server.uri(), storage);
    let status = h.store.restore_session().await;

    assert_eq!(status, SessionStatus::Unauthenticated);
    assert!(h.storage.is_empty());
    assert!(!h.store.snapshot().loading);
}

#[tokio::test]
async fn test_restore_fails_closed() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/users/verify-token"))
        .and(header("authorization", "Bearer rejected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/verify-token"))
        .and(header("authorization", "Bearer broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    for token in ["rejected", "broken"] {
        let storage = Rc::new(MemoryStorage::default());
        stored_session(&storage, token, now_millis() + 60_000, "u-1");

        let h = harness_with_storage(&server.uri(), storage);
        assert_eq!(h.store.restore_session().await, SessionStatus::Unauthenticated);
        assert!(h.storage.is_empty(), "storage kept for {token}");
        assert!(h.store.current_user().is_none());
    }

    let h = harness_with_storage("http://127.0.0.1:9", Rc::new(MemoryStorage::default()));
    stored_session(&h.storage, "offline", now_millis() + 60_000, "u-1");
    assert_eq!(h.store.restore_session().await, SessionStatus::Unauthenticated);
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_restore_adopts_rotated_token() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/users/verify-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"valid": true, "newToken": "tok-2"})),
        )
        .mount(&server)
        .await;

    let storage = Rc::new(MemoryStorage::default());
    stored_session(&storage, "tok-1", now_millis() + 1_000, "u-1");

    let h = harness_with_storage(&server.uri(), storage);
    assert_eq!(h.store.restore_session().await, SessionStatus::Authenticated);

    assert_eq!(h.store.token().as_deref(), Some("tok-2"));
    assert_eq!(h.storage.get("token").as_deref(), Some("tok-2"));
    // Fresh one-hour expiry replaces the old one
    assert!(h.store.token_expires_at().unwrap() > now_millis() + 3_000_000);
}

#[tokio::test]
async fn test_login_during_restore_wins() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/users/verify-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"valid": true}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-new", "user")))
        .mount(&server)
        .await;

    let storage = Rc::new(MemoryStorage::default());
    stored_session(&storage, "tok-old", now_millis() + 60_000, "u-old");
    let h = harness_with_storage(&server.uri(), storage);

    let credentials = Credentials::new("ann@example.com", "hunter22");
    let (_, login) = tokio::join!(h.store.restore_session(), h.store.login(&credentials));
    login.unwrap();

    assert_eq!(h.store.token().as_deref(), Some("tok-new"));
    assert_eq!(h.store.current_user().unwrap().user_id, "u-1");
}

#[tokio::test]
async fn test_register_validates_before_sending() {
    let server = server().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let registration = Registration {
        name: "Jane".into(),
        email: "jane@example".into(),
        password: "hunter2222".into(),
        phone_number: "12345".into(),
        role: Role::User,
        terms_accepted: true,
    };

    let Err(AuthError::Validation(errors)) = h.store.register(&registration).await else {
        panic!("expected a validation error");
    };
    assert!(errors.field("email").is_some());
    assert!(errors.field("phoneNumber").is_some());
    assert!(errors.field("password").is_none());
}

#[tokio::test]
async fn test_register_supplier_lands_on_pending_approval() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/signup"))
        .and(body_json(json!({
            "name": "Acme",
            "email": "acme@example.com",
            "password": "hunter2222",
            "phone_number": "+1 (555) 123-4567",
            "role": "supplier"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "tok-s",
            "expiresIn": 600,
            "user": {"id": "s-1", "name": "Acme", "email": "acme@example.com", "role": "supplier"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let session = h
        .store
        .register(&Registration {
            name: "Acme".into(),
            email: "acme@example.com".into(),
            password: "hunter2222".into(),
            phone_number: "+1 (555) 123-4567".into(),
            role: Role::Supplier,
            terms_accepted: true,
        })
        .await
        .unwrap();

    assert_eq!(session.user.approval_status, Some(ApprovalStatus::Pending));
    assert!(h.store.is_supplier(false));
    assert!(!h.store.is_supplier(true));
    assert_eq!(landing_route(&session.user), AppRoute::PendingApproval);
    assert!(session.expires_at_ms <= now_millis() + 600_000);
}

struct ClosedPopup;

#[async_trait(?Send)]
impl IdentityProvider for ClosedPopup {
    async fn sign_in(&self) -> Result<String, ProviderError> {
        Err(ProviderError::Cancelled)
    }
}

#[tokio::test]
async fn test_provider_popup_closed() {
    let h = harness("http://127.0.0.1:9");
    let err = h.store.login_with_provider(&ClosedPopup).await.unwrap_err();

    assert_eq!(err, AuthError::ProviderAuthCancelled);
    assert_eq!(err.to_string(), "Login popup was closed - please try again");
    assert!(!h.store.is_logged_in());
}

#[tokio::test]
async fn test_provider_token_is_exchanged() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/google-auth"))
        .and(body_json(json!({"token": "google-id-token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-g", "user")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let session = h
        .store
        .login_with_provider(&TokenProvider("google-id-token".into()))
        .await
        .unwrap();

    assert_eq!(session.token, "tok-g");
    assert_eq!(landing_route(&session.user), AppRoute::Profile);
}

#[tokio::test]
async fn test_listeners_see_transitions_until_unsubscribed() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1", "user")))
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let id = {
        let seen = seen.clone();
        h.store.subscribe(move |snapshot| seen.borrow_mut().push(snapshot.status))
    };

    h.store
        .login(&Credentials::new("ann@example.com", "hunter22"))
        .await
        .unwrap();
    h.store.unsubscribe(id);
    h.store.force_logout();

    assert_eq!(seen.borrow().as_slice(), &[SessionStatus::Authenticated]);
    assert!(!h.store.is_logged_in());

    h.store.teardown();
}

#[tokio::test]
async fn test_refreshed_token_requires_unchanged_session() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1", "user")))
        .mount(&server)
        .await;

    let h = harness(&server.uri());
    assert!(!h.store.apply_refreshed_token("stray".into(), None, h.store.generation()));
    assert_eq!(h.storage.get("token"), None);

    h.store
        .login(&Credentials::new("ann@example.com", "hunter22"))
        .await
        .unwrap();
    let before_refresh = h.store.generation();
    assert!(h.store.apply_refreshed_token("tok-2".into(), Some(60), before_refresh));
    assert_eq!(h.storage.get("token").as_deref(), Some("tok-2"));

    assert!(!h.store.apply_refreshed_token("tok-3".into(), None, before_refresh));
    assert_eq!(h.store.token().as_deref(), Some("tok-2"));

    let before_logout = h.store.generation();
    h.store.force_logout();
    assert!(!h.store.apply_refreshed_token("tok-4".into(), None, before_logout));
    assert!(h.store.token().is_none());
    assert!(h.storage.is_empty());
}
