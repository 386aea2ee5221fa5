//! Typed resource methods layered on [`super::ApiClient`].

mod auth;
mod search;
mod tasks;
mod todos;

pub use auth::{AuthSession, UserProfile};
pub use search::{SearchHit, SearchResults};
pub use tasks::{NewTask, Task, TaskStatus, TaskStatusParseError};
pub use todos::{NewTodo, Todo, TodoUpdate};
