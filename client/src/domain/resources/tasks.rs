//! Project task endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::api_client::{ApiClient, ApiRequest};
use crate::domain::error::ApiError;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Wire name used in bodies and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a task status name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status {0:?}; expected todo, in_progress, or done")]
pub struct TaskStatusParseError(String);

impl FromStr for TaskStatus {
    type Err = TaskStatusParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(TaskStatusParseError(raw.to_owned())),
        }
    }
}

/// A task as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow state.
    pub status: TaskStatus,
    /// Assigned user, if any.
    #[serde(default)]
    pub assignee_id: Option<i64>,
    /// Owning project, if any.
    #[serde(default)]
    pub project_id: Option<i64>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    /// Short title; must not be blank.
    pub title: String,
    /// Longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial state; the server default applies when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Assigned user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    /// Owning project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

impl NewTask {
    /// Task with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            assignee_id: None,
            project_id: None,
        }
    }
}

#[derive(Serialize)]
struct StatusUpdateDto {
    status: TaskStatus,
}

impl ApiClient {
    /// `GET /tasks`, optionally filtered with `?status=`.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ApiError> {
        let mut request = ApiRequest::get("/tasks");
        if let Some(status) = status {
            request = request.with_query("status", status.as_str());
        }
        self.request(request).await
    }

    /// `POST /tasks`.
    ///
    /// # Errors
    ///
    /// A blank title is a validation error raised before any network call.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        if task.title.trim().is_empty() {
            return Err(ApiError::validation("Task title must not be empty."));
        }
        self.request(ApiRequest::post("/tasks").with_body(task)?)
            .await
    }

    /// `PATCH /tasks/{id}` with a new status.
    ///
    /// # Errors
    ///
    /// Failures follow the request wrapper.
    pub async fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        let request =
            ApiRequest::patch(format!("/tasks/{id}")).with_body(&StatusUpdateDto { status })?;
        self.request(request).await
    }
}
