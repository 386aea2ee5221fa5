//! Domain model and request pipeline for the API client.
//!
//! Purpose: turn typed resource calls into HTTP exchanges and normalise
//! every outcome into either a decoded body or an [`ApiError`]. Adapters
//! for HTTP, storage, and notification live in `crate::outbound` and are
//! reached only through the traits in [`ports`].
//!
//! Public surface:
//! - ApiClient / ApiRequest: session-scoped request wrapper.
//! - ApiError / ErrorKind: the fixed error taxonomy.
//! - ErrorBody: parsed shape of an error response body.
//! - map_error_response: pure status-to-error table.
//! - TokenStore: bearer token persistence over a key-value port.
//! - ErrorPresenter / notification_for: user-facing error toasts.
//! - Resource DTOs for auth, todos, tasks, and search.

pub mod api_client;
pub mod auth;
pub mod error;
pub mod error_body;
pub mod ports;
pub mod presentation;
pub mod resources;
pub mod status_mapping;
pub mod token_store;

pub use self::api_client::{ApiClient, ApiRequest};
pub use self::auth::{AccessToken, CredentialsValidationError, LoginCredentials, Registration};
pub use self::error::{ApiError, ErrorKind};
pub use self::error_body::{ErrorBody, StructuredErrorBody};
pub use self::presentation::{ErrorContext, ErrorPresenter, Notification, notification_for};
pub use self::resources::{
    AuthSession, NewTask, NewTodo, SearchHit, SearchResults, Task, TaskStatus,
    TaskStatusParseError, Todo, TodoUpdate, UserProfile,
};
pub use self::status_mapping::{DEFAULT_RETRY_AFTER, RETRY_AFTER_HEADER, map_error_response};
pub use self::token_store::{TOKEN_KEY, TokenStore};

/// Result alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
