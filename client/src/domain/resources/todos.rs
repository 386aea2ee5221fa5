//! Todo list endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::api_client::{ApiClient, ApiRequest};
use crate::domain::error::ApiError;

/// A todo item as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Todo {
    /// Server-assigned identifier.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Longer notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the item is done.
    #[serde(default)]
    pub completed: bool,
    /// Due date as sent by the server (ISO 8601).
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Payload for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTodo {
    /// Short title; must not be blank.
    pub title: String,
    /// Longer notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl NewTodo {
    /// Todo with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
        }
    }
}

/// Partial update for a todo; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// New due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TodoUpdate {
    /// Update that only flips completion.
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

impl ApiClient {
    /// `GET /todos`.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.request(ApiRequest::get("/todos")).await
    }

    /// `GET /todos/{id}`.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn get_todo(&self, id: i64) -> Result<Todo, ApiError> {
        self.request(ApiRequest::get(format!("/todos/{id}"))).await
    }

    /// `POST /todos`.
    ///
    /// # Errors
    ///
    /// A blank title is a validation error raised before any network call.
    pub async fn create_todo(&self, todo: &NewTodo) -> Result<Todo, ApiError> {
        if todo.title.trim().is_empty() {
            return Err(ApiError::validation("Todo title must not be empty."));
        }
        self.request(ApiRequest::post("/todos").with_body(todo)?)
            .await
    }

    /// `PATCH /todos/{id}`.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn update_todo(&self, id: i64, update: &TodoUpdate) -> Result<Todo, ApiError> {
        self.request(ApiRequest::patch(format!("/todos/{id}")).with_body(update)?)
            .await
    }

    /// `DELETE /todos/{id}`.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn delete_todo(&self, id: i64) -> Result<(), ApiError> {
        self.request::<Option<serde_json::Value>>(ApiRequest::delete(format!("/todos/{id}")))
            .await
            .map(drop)
    }
}
