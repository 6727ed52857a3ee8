//! Command-line front end for the task-list core.
//!
//! # Responsibility
//! - Load configuration once, start logging, open the database.
//! - Map subcommands onto auth and task services and print JSON results.
//!
//! Errors are printed to stderr as `{"error", "status", "message"}` and the
//! process exits non-zero.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use rusqlite::Connection;
use serde_json::{json, Value};
use tasklist_core::db::open_db;
use tasklist_core::{
    init_logging, AppConfig, AuthService, AuthenticatedUser, PasswordHasher, ServiceError,
    SqliteTaskRepository, SqliteUserRepository, TaskId, TaskService, TokenService,
};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Per-user task list backed by SQLite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup {
        #[arg(long)]
        email: String,
        /// Account password; prefer the environment over argv
        #[arg(long, env = "TASKLIST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and print a session token
    Login {
        #[arg(long)]
        email: String,
        /// Account password; prefer the environment over argv
        #[arg(long, env = "TASKLIST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Manage the caller's tasks
    Tasks {
        /// Session token from `login`
        #[arg(long, env = "TASKLIST_TOKEN", hide_env_values = true)]
        token: String,

        #[command(subcommand)]
        action: TaskAction,
    },

    /// Print the core version
    Version,
}

#[derive(Subcommand)]
enum TaskAction {
    /// List tasks, oldest first
    List,
    /// Show one task
    Get { id: TaskId },
    /// Create a task
    Create {
        #[arg(short, long)]
        title: String,
    },
    /// Change a task title
    Update {
        id: TaskId,
        #[arg(short, long)]
        title: String,
    },
    /// Delete a task
    Delete { id: TaskId },
}

enum CliError {
    Startup(String),
    Service(ServiceError),
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(CliError::Startup(message)) => {
            eprintln!("{}", json!({ "error": "startup_failed", "message": message }));
            ExitCode::from(2)
        }
        Err(CliError::Service(err)) => {
            let kind = err.kind();
            error!(
                "event=cli_command module=cli status=error error_code={} error={err}",
                kind.as_str()
            );
            eprintln!(
                "{}",
                json!({
                    "error": kind.as_str(),
                    "status": kind.status_code(),
                    "message": err.public_message(),
                })
            );
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<Value, CliError> {
    match command {
        Commands::Version => Ok(json!({ "version": tasklist_core::core_version() })),
        Commands::Signup { email, password } => {
            let runtime = Runtime::load()?;
            Ok(json!(runtime.auth()?.sign_up(&email, &password)?))
        }
        Commands::Login { email, password } => {
            let runtime = Runtime::load()?;
            Ok(json!({ "token": runtime.auth()?.log_in(&email, &password)? }))
        }
        Commands::Tasks { token, action } => {
            let runtime = Runtime::load()?;
            let caller = runtime.auth()?.authenticate(&token)?;
            let tasks = TaskService::new(
                SqliteTaskRepository::try_new(&runtime.conn).map_err(startup_error)?,
            );
            run_task_action(&tasks, &caller, action)
        }
    }
}

/// Configuration and storage shared by the commands that touch accounts.
struct Runtime {
    config: AppConfig,
    conn: Connection,
}

impl Runtime {
    fn load() -> Result<Self, CliError> {
        let config = AppConfig::from_env().map_err(startup_error)?;
        if let Some(log_dir) = config.log_dir.as_deref() {
            init_logging(&config.log_level, log_dir).map_err(CliError::Startup)?;
        }
        let conn = open_db(&config.database_path).map_err(startup_error)?;
        Ok(Self { config, conn })
    }

    fn auth(&self) -> Result<AuthService<SqliteUserRepository<'_>>, CliError> {
        let users = SqliteUserRepository::try_new(&self.conn).map_err(startup_error)?;
        Ok(AuthService::new(
            users,
            PasswordHasher::new(),
            TokenService::new(&self.config.token_secret),
        ))
    }
}

fn startup_error(err: impl std::fmt::Display) -> CliError {
    CliError::Startup(err.to_string())
}

fn run_task_action(
    tasks: &TaskService<SqliteTaskRepository<'_>>,
    caller: &AuthenticatedUser,
    action: TaskAction,
) -> Result<Value, CliError> {
    let output = match action {
        TaskAction::List => json!(tasks.list_tasks(caller)?),
        TaskAction::Get { id } => json!(tasks.get_task(caller, id)?),
        TaskAction::Create { title } => json!(tasks.create_task(caller, &title)?),
        TaskAction::Update { id, title } => json!(tasks.update_task(caller, id, &title)?),
        TaskAction::Delete { id } => {
            tasks.delete_task(caller, id)?;
            json!({ "deleted": id })
        }
    };
    Ok(output)
}
