//! Behaviour tests for the session token lifecycle.
//!
//! These scenarios drive the client against scripted responses and check
//! what ends up in the token store and the unauthorized handler.

use std::cell::RefCell;
use std::sync::Arc;

use client::domain::ports::TransportError;
use client::domain::{
    AccessToken, ApiError, ErrorContext, ErrorKind, ErrorPresenter, LoginCredentials,
};
use client::test_support::{ClientHarness, RecordingNotifier};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use tokio::runtime::{Builder, Runtime};

struct SessionWorld {
    runtime: Runtime,
    harness: ClientHarness,
    outcome: RefCell<Option<Result<(), ApiError>>>,
}

impl SessionWorld {
    fn new() -> Self {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime should initialise");
        Self {
            runtime,
            harness: ClientHarness::new(),
            outcome: RefCell::new(None),
        }
    }

    fn record(&self, outcome: Result<(), ApiError>) {
        *self.outcome.borrow_mut() = Some(outcome);
    }

    fn error(&self) -> ApiError {
        match self.outcome.borrow().as_ref().expect("a call should have run") {
            Ok(()) => panic!("expected the call to fail"),
            Err(error) => error.clone(),
        }
    }

    fn stored_token(&self) -> Option<String> {
        self.harness
            .client
            .get_token()
            .as_ref()
            .map(AccessToken::as_str)
            .map(str::to_owned)
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld::new()
}

#[given("a client with no stored session")]
fn a_client_with_no_stored_session(world: &SessionWorld) {
    assert!(!world.harness.client.is_authenticated());
}

#[given("a client signed in with token {token}")]
fn a_client_signed_in_with_token(world: &SessionWorld, token: String) {
    world.harness.sign_in(&token);
}

#[given("the server accepts the login and issues token {token}")]
fn the_server_accepts_the_login(world: &SessionWorld, token: String) {
    world.harness.transport.push_json(
        200,
        json!({
            "access_token": token,
            "token_type": "bearer",
            "user": {"id": 1, "username": "admin"}
        }),
    );
}

#[given("the network is unreachable")]
fn the_network_is_unreachable(world: &SessionWorld) {
    world
        .harness
        .transport
        .push_failure(TransportError::connect("connection refused"));
}

#[given("the server rejects the session as expired")]
fn the_server_rejects_the_session_as_expired(world: &SessionWorld) {
    world
        .harness
        .transport
        .push_json(401, json!({"detail": "Token has expired"}));
}

#[when("the user logs in as {username} with password {password}")]
fn the_user_logs_in(world: &SessionWorld, username: String, password: String) {
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).expect("valid credentials");
    let outcome = world
        .runtime
        .block_on(world.harness.client.login(&credentials))
        .map(drop);
    world.record(outcome);
}

#[when("the user logs out")]
fn the_user_logs_out(world: &SessionWorld) {
    let outcome = world.runtime.block_on(world.harness.client.logout());
    world.record(outcome);
}

#[when("the user lists their todos")]
fn the_user_lists_their_todos(world: &SessionWorld) {
    let outcome = world
        .runtime
        .block_on(world.harness.client.list_todos())
        .map(drop);
    world.record(outcome);
}

#[then("the stored token is {token}")]
fn the_stored_token_is(world: &SessionWorld, token: String) {
    assert_eq!(world.stored_token(), Some(token));
}

#[then("the login request carried no bearer header")]
fn the_login_request_carried_no_bearer_header(world: &SessionWorld) {
    let sent = world
        .harness
        .transport
        .last_request()
        .expect("login request should be sent");
    assert_eq!(sent.header("authorization"), None);
}

#[then("the call fails with a network error")]
fn the_call_fails_with_a_network_error(world: &SessionWorld) {
    assert_eq!(world.error().kind(), ErrorKind::NetworkError);
}

#[then("the call fails as unauthorized")]
fn the_call_fails_as_unauthorized(world: &SessionWorld) {
    let error = world.error();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
    assert_eq!(error.message(), "Token has expired");
}

#[then("no session token is stored")]
fn no_session_token_is_stored(world: &SessionWorld) {
    assert_eq!(world.stored_token(), None);
}

#[then("the login redirect was triggered once")]
fn the_login_redirect_was_triggered_once(world: &SessionWorld) {
    assert_eq!(world.harness.unauthorized.calls(), 1);
}

#[then("no notification is shown for the failure")]
fn no_notification_is_shown_for_the_failure(world: &SessionWorld) {
    let notifier = Arc::new(RecordingNotifier::default());
    let presenter = ErrorPresenter::new(notifier.clone());

    assert!(!presenter.present(&world.error(), ErrorContext::General));
    assert!(notifier.notifications().is_empty());
}

#[scenario(
    path = "tests/features/session.feature",
    name = "Signing in stores the session token"
)]
fn signing_in_stores_the_session_token(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session.feature",
    name = "Signing out works while the network is down"
)]
fn signing_out_works_while_the_network_is_down(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session.feature",
    name = "An expired session is cleared and redirected"
)]
fn an_expired_session_is_cleared_and_redirected(world: SessionWorld) {
    drop(world);
}
