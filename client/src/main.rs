//! Command-line front end for the API client.
//!
//! The session token is kept in a JSON file under the configured storage
//! directory, so `login` in one invocation authenticates the next.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::convert::Infallible;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::config::ClientSettings;
use client::domain::ports::UnauthorizedHandler;
use client::domain::{
    ApiClient, ApiResult, ErrorContext, ErrorPresenter, LoginCredentials, NewTask, NewTodo,
    Registration, TaskStatus, TodoUpdate,
};
use client::outbound::TracingNotifier;
use client::outbound::http::ReqwestTransport;
use client::outbound::storage::FileKeyValueStore;
use color_eyre::eyre::{Context, Result, eyre};
use fetch_retry::{RetryPolicy, fetch_with_retry};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// `client` command arguments.
#[derive(Debug, Parser)]
#[command(name = "client", about = "Talk to the todo and task API", version)]
struct Cli {
    /// Override the configured API base URL.
    #[arg(long = "base-url", value_name = "url")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session token.
    Login {
        username: String,
        #[arg(long)]
        password: Password,
    },
    /// Create an account and sign in.
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: Password,
        #[arg(long = "display-name")]
        display_name: Option<String>,
    },
    /// Forget the session token and tell the server.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Manage todos.
    Todos {
        #[command(subcommand)]
        action: TodoCommand,
    },
    /// Manage tasks.
    Tasks {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Full-text search.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Password argument; never shown by `Debug`.
#[derive(Clone)]
struct Password(String);

impl FromStr for Password {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self(raw.to_owned()))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    /// List todos.
    List,
    /// Create a todo.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "due", value_name = "date")]
        due_date: Option<String>,
    },
    /// Mark a todo as completed.
    Done { id: i64 },
    /// Delete a todo.
    Remove { id: i64 },
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// List tasks, optionally by status.
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move a task to another status.
    Status { id: i64, status: TaskStatus },
}

impl Command {
    fn error_context(&self) -> ErrorContext {
        match self {
            Self::Login { .. } => ErrorContext::Login,
            _ => ErrorContext::General,
        }
    }
}

/// Tells the operator to sign in again after the server rejects the token.
struct ReloginHint;

impl UnauthorizedHandler for ReloginHint {
    fn on_unauthorized(&self) {
        warn!("session expired; run `client login` to sign in again");
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {error}");
    }

    let cli = Cli::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("client")])
        .map_err(|error| eyre!("load client settings: {error}"))?;
    let client = build_client(&settings, cli.base_url.as_deref())?;
    let context = cli.command.error_context();

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    if let Err(error) = runtime.block_on(run(&client, cli.command, settings.retry_policy())) {
        ErrorPresenter::new(Arc::new(TracingNotifier)).present(&error, context);
        return Err(eyre!(error));
    }
    Ok(())
}

fn build_client(settings: &ClientSettings, base_url_override: Option<&str>) -> Result<ApiClient> {
    let settings = match base_url_override {
        Some(base_url) => ClientSettings {
            base_url: Some(base_url.to_owned()),
            ..settings.clone()
        },
        None => settings.clone(),
    };
    let base_url = settings.base_url().wrap_err("resolve API base URL")?;
    let storage_dir = settings.storage_dir();
    let store = FileKeyValueStore::open(&storage_dir)
        .wrap_err_with(|| format!("open session store at {}", storage_dir.display()))?;
    let transport = ReqwestTransport::new().wrap_err("build HTTP transport")?;
    Ok(ApiClient::new(
        base_url,
        Arc::new(transport),
        Arc::new(store),
        Arc::new(ReloginHint),
    ))
}

async fn run(client: &ApiClient, command: Command, policy: RetryPolicy) -> ApiResult<()> {
    match command {
        Command::Login { username, password } => {
            let credentials = LoginCredentials::try_from_parts(&username, &password.0)?;
            let session = client.login(&credentials).await?;
            let name = session.user.map_or(username, |user| user.username);
            println!("signed in as {name}");
        }
        Command::Register {
            username,
            email,
            password,
            display_name,
        } => {
            let registration = Registration::try_from_parts(
                &username,
                &email,
                &password.0,
                display_name.as_deref(),
            )?;
            client.register(&registration).await?;
            println!("registered {}", registration.username());
        }
        Command::Logout => {
            client.logout().await?;
            println!("signed out");
        }
        Command::Whoami => {
            let profile = fetch_with_retry(|| client.current_user(), policy).await?;
            let shown = profile.display_name.as_deref().unwrap_or(&profile.username);
            println!("{shown} (id {})", profile.id);
        }
        Command::Todos { action } => run_todos(client, action, policy).await?,
        Command::Tasks { action } => run_tasks(client, action, policy).await?,
        Command::Search { query, limit } => {
            let found = fetch_with_retry(|| client.search(&query, limit), policy).await?;
            for hit in &found.results {
                println!("{}\t{}\t{}", hit.kind, hit.id, hit.title);
            }
            println!("{} of {} matches", found.results.len(), found.total);
        }
    }
    Ok(())
}

async fn run_todos(client: &ApiClient, action: TodoCommand, policy: RetryPolicy) -> ApiResult<()> {
    match action {
        TodoCommand::List => {
            let todos = fetch_with_retry(|| client.list_todos(), policy).await?;
            for todo in todos {
                let mark = if todo.completed { "x" } else { " " };
                let due = todo.due_date.map(|due| format!(" (due {due})")).unwrap_or_default();
                println!("[{mark}] {}\t{}{due}", todo.id, todo.title);
            }
        }
        TodoCommand::Add {
            title,
            description,
            due_date,
        } => {
            let todo = client
                .create_todo(&NewTodo {
                    title,
                    description,
                    due_date,
                })
                .await?;
            println!("created todo {}", todo.id);
        }
        TodoCommand::Done { id } => {
            client.update_todo(id, &TodoUpdate::completed(true)).await?;
            println!("completed todo {id}");
        }
        TodoCommand::Remove { id } => {
            client.delete_todo(id).await?;
            println!("removed todo {id}");
        }
    }
    Ok(())
}

async fn run_tasks(client: &ApiClient, action: TaskCommand, policy: RetryPolicy) -> ApiResult<()> {
    match action {
        TaskCommand::List { status } => {
            let tasks = fetch_with_retry(|| client.list_tasks(status), policy).await?;
            for task in tasks {
                println!("{}\t{}\t{}", task.id, task.status, task.title);
            }
        }
        TaskCommand::Add { title, description } => {
            let task = client
                .create_task(&NewTask {
                    description,
                    ..NewTask::titled(title)
                })
                .await?;
            println!("created task {} ({})", task.id, task.status);
        }
        TaskCommand::Status { id, status } => {
            let task = client.update_task_status(id, status).await?;
            println!("task {} is now {}", task.id, task.status);
        }
    }
    Ok(())
}
