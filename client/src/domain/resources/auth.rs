//! Session endpoints: login, registration, logout, and the current user.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::api_client::{ApiClient, ApiRequest};
use crate::domain::auth::{AccessToken, LoginCredentials, Registration};
use crate::domain::error::{ApiError, ErrorKind};

/// Body returned by login and registration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token scheme, usually `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Profile of the signed-in user, when the server includes it.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Account profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    /// Server-assigned identifier.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Name shown in the UI.
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

impl ApiClient {
    /// `POST /auth/login`; stores the issued token.
    ///
    /// # Errors
    ///
    /// A 401 is reported as [`ErrorKind::InvalidCredentials`]. A success
    /// body without a usable `access_token`, or a token the store cannot
    /// save, is [`ErrorKind::Unknown`]. Other failures follow the request
    /// wrapper.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, ApiError> {
        let request = ApiRequest::post("/auth/login").with_body(&LoginRequestDto {
            username: credentials.username(),
            password: credentials.password(),
        })?;
        let session = self
            .request::<AuthSession>(request)
            .await
            .map_err(rejected_login)?;
        self.store_session_token(&session)?;
        info!(username = credentials.username(), "signed in");
        Ok(session)
    }

    /// `POST /auth/register`; stores the issued token.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper; an existing account usually
    /// surfaces as [`ErrorKind::DuplicateResource`].
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let request = ApiRequest::post("/auth/register").with_body(&RegisterRequestDto {
            username: registration.username(),
            email: registration.email(),
            password: registration.password(),
            display_name: registration.display_name(),
        })?;
        let session = self.request::<AuthSession>(request).await?;
        self.store_session_token(&session)?;
        info!(username = registration.username(), "registered and signed in");
        Ok(session)
    }

    /// `POST /auth/logout`.
    ///
    /// The token is cleared locally before the call is sent, so the client
    /// is signed out even if the server cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns the server call's failure after local cleanup.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self.build_request(ApiRequest::post("/auth/logout"))?;
        self.tokens().clear();
        info!("signed out locally");
        self.execute::<Value>(request).await.map(drop)
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.request(ApiRequest::get("/auth/me")).await
    }

    fn store_session_token(&self, session: &AuthSession) -> Result<(), ApiError> {
        let token = AccessToken::new(session.access_token.as_str()).ok_or_else(|| {
            ApiError::unknown("The server did not return an access token.")
        })?;
        self.tokens().persist_token(&token).map_err(|error| {
            warn!(error = %error, "issued token could not be saved");
            ApiError::unknown(format!("The session could not be saved: {error}"))
        })
    }
}

fn rejected_login(error: ApiError) -> ApiError {
    if error.kind() != ErrorKind::Unauthorized {
        return error;
    }
    let message = if error.message() == ErrorKind::Unauthorized.default_message() {
        ErrorKind::InvalidCredentials.default_message()
    } else {
        error.message()
    };
    ApiError::new(ErrorKind::InvalidCredentials, message)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for session endpoints.

    use super::*;
    use std::sync::Arc;

    use crate::domain::ports::{
        HttpMethod, MockKeyValueStore, NoopUnauthorizedHandler, StoreError, TransportError,
    };
    use crate::test_support::{ClientHarness, ScriptedTransport, TEST_BASE_URL};
    use url::Url;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn harness() -> ClientHarness {
        ClientHarness::new()
    }

    fn admin() -> LoginCredentials {
        LoginCredentials::try_from_parts("admin", "password").expect("valid credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn login_stores_issued_token(harness: ClientHarness) {
        harness.transport.push_json(
            200,
            json!({"access_token": "tok-123", "token_type": "bearer"}),
        );

        let session = harness.client.login(&admin()).await.expect("login succeeds");

        assert_eq!(session.access_token, "tok-123");
        assert_eq!(
            harness.client.get_token().as_ref().map(AccessToken::as_str),
            Some("tok-123")
        );
        let sent = harness.transport.last_request().expect("request sent");
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url.path(), "/api/auth/login");
        let body: Value =
            serde_json::from_slice(sent.body.as_deref().expect("login body")).expect("json body");
        assert_eq!(body, json!({"username": "admin", "password": "password"}));
    }

    #[tokio::test]
    async fn unsaved_token_fails_the_login() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .returning(|_, _| Err(StoreError::write("read-only session file")));
        store.expect_get().returning(|_| Ok(None));
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_json(200, json!({"access_token": "tok-lost"}));
        let client = ApiClient::new(
            Url::parse(TEST_BASE_URL).expect("base url"),
            transport,
            Arc::new(store),
            Arc::new(NoopUnauthorizedHandler),
        );

        let err = client.login(&admin()).await.expect_err("token not saved");

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.message().contains("read-only session file"));
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_login_reports_invalid_credentials(harness: ClientHarness) {
        harness.transport.push_json(401, json!({}));

        let err = harness.client.login(&admin()).await.expect_err("login fails");

        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(err.message(), ErrorKind::InvalidCredentials.default_message());
        assert!(harness.client.get_token().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_login_keeps_server_message(harness: ClientHarness) {
        harness
            .transport
            .push_json(401, json!({"detail": "Account locked"}));

        let err = harness.client.login(&admin()).await.expect_err("login fails");

        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(err.message(), "Account locked");
    }

    #[rstest]
    #[tokio::test]
    async fn login_without_token_in_body_is_unknown(harness: ClientHarness) {
        harness.transport.push_json(200, json!({"access_token": ""}));

        let err = harness.client.login(&admin()).await.expect_err("no token");

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(harness.client.get_token().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn register_stores_token_and_omits_blank_display_name(harness: ClientHarness) {
        harness
            .transport
            .push_json(201, json!({"access_token": "fresh", "user": {"id": 9, "username": "vet"}}));
        let registration = Registration::try_from_parts("vet", "vet@clinic.example", "pw", None)
            .expect("valid registration");

        let session = harness.client.register(&registration).await.expect("registered");

        assert_eq!(session.user.map(|user| user.id), Some(9));
        assert!(harness.client.is_authenticated());
        let sent = harness.transport.last_request().expect("request sent");
        let body: Value =
            serde_json::from_slice(sent.body.as_deref().expect("body")).expect("json body");
        assert!(body.get("display_name").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn logout_clears_token_even_when_network_fails(harness: ClientHarness) {
        harness.sign_in("tok-123");
        harness
            .transport
            .push_failure(TransportError::connect("connection refused"));

        let err = harness.client.logout().await.expect_err("network is down");

        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(harness.client.get_token().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn logout_sends_the_token_it_is_discarding(harness: ClientHarness) {
        harness.sign_in("tok-123");
        harness.transport.push_status(204);

        harness.client.logout().await.expect("logout succeeds");

        let sent = harness.transport.last_request().expect("request sent");
        assert_eq!(sent.header("Authorization"), Some("Bearer tok-123"));
        assert!(harness.client.get_token().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn current_user_decodes_profile(harness: ClientHarness) {
        harness.sign_in("tok");
        harness.transport.push_json(
            200,
            json!({"id": 1, "username": "admin", "email": "admin@example.com"}),
        );

        let profile = harness.client.current_user().await.expect("profile");

        assert_eq!(profile.username, "admin");
        assert_eq!(profile.email.as_deref(), Some("admin@example.com"));
        assert!(profile.display_name.is_none());
    }
}
