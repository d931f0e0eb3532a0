//! CLI entry point for taskflow.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use taskflow_app::{Fixtures, LatencyProfile, MemoryTaskFlow, ProjectConfig};
use taskflow_core::{CategoryId, Priority, SystemClock, TaskId};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// In-memory task manager with filtering and edit history.
#[derive(Parser, Debug)]
#[command(
    name = "taskflow",
    version,
    about = "taskflow: tasks and categories seeded from fixtures, kept in memory"
)]
struct Cli {
    /// Directory holding `.taskflow/config.toml` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Run every store operation without simulated latency.
    #[arg(long, global = true)]
    no_latency: bool,

    #[command(subcommand)]
    cmd: Command,
}

/// Output format shared by listing commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human readable table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks through the filter and sort engine.
    Ls(LsArgs),

    /// Show a task with its edit history.
    Show {
        /// Task id.
        task: TaskId,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },

    /// Create a task with explicit fields.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        category: Option<CategoryId>,
        /// Due date (RFC 3339 or YYYY-MM-DD).
        #[arg(long)]
        due: Option<String>,
    },

    /// Quick-add a task; "today", "tomorrow", "urgent", "asap",
    /// "high priority" and "low priority" are picked up from the text.
    Add {
        /// Task text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        category: Option<CategoryId>,
        #[arg(long)]
        due: Option<String>,
    },

    /// Apply a partial update to a task.
    Update(UpdateArgs),

    /// Mark a task completed.
    Done {
        task: TaskId,
    },

    /// Mark a task open again.
    Undone {
        task: TaskId,
    },

    /// Flip a task between open and completed.
    Toggle {
        task: TaskId,
    },

    /// Delete a task.
    Rm {
        task: TaskId,
    },

    /// Assign manual order following the given ids.
    Reorder {
        #[arg(required = true, num_args = 1..)]
        tasks: Vec<TaskId>,
    },

    /// Print a task's edit history.
    History {
        task: TaskId,
    },

    /// Completion progress overall, today and this week.
    Stats {
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },

    /// Report tasks pointing at missing categories and stale counts.
    Check {
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },

    /// Manage categories.
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Read commands from stdin against one shared in-memory state.
    Shell,
}

#[derive(Args, Debug, Default)]
pub struct LsArgs {
    /// Start from a preset: home, all, today, week.
    #[arg(long)]
    preset: Option<String>,
    /// all, active or completed.
    #[arg(long)]
    view: Option<String>,
    #[arg(short, long = "category")]
    categories: Vec<String>,
    #[arg(short, long = "priority")]
    priorities: Vec<String>,
    /// overdue, today, tomorrow, this-week, no-date.
    #[arg(short, long = "date")]
    dates: Vec<String>,
    #[arg(long, value_enum, default_value_t)]
    format: Format,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    task: TaskId,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(short, long)]
    priority: Option<Priority>,
    #[arg(short, long, conflicts_with = "clear_category")]
    category: Option<CategoryId>,
    #[arg(long)]
    clear_category: bool,
    #[arg(long, conflicts_with = "clear_due")]
    due: Option<String>,
    #[arg(long)]
    clear_due: bool,
    #[arg(long)]
    order: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// List categories.
    Ls {
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Create a category.
    New {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "#6b7280")]
        color: String,
        #[arg(long, default_value = "Tag")]
        icon: String,
    },
    /// Update a category.
    Update {
        id: CategoryId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category; tasks keep their reference.
    Rm {
        id: CategoryId,
    },
    /// Recompute task counts from open tasks.
    Recount,
}

fn main() -> Result<()> {
    let Cli {
        dir,
        no_latency,
        cmd,
    } = Cli::parse();

    install_tracing();

    let workdir = dir.unwrap_or_else(|| PathBuf::from("."));
    let flow = build_flow(&workdir, no_latency)?;
    tokio::runtime::Runtime::new()?.block_on(async move {
        let mut stdout = io::stdout();
        match cmd {
            Command::Shell => {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                commands::run_shell(&flow, stdin, &mut stdout).await
            }
            other => commands::run(other, &flow, &mut stdout).await,
        }
    })
}

fn build_flow(workdir: &Path, no_latency: bool) -> Result<MemoryTaskFlow> {
    let config = ProjectConfig::load(workdir, dirs::config_dir().as_deref())?;
    let latency = if no_latency {
        LatencyProfile::none()
    } else {
        config.latency.to_profile()
    };
    let fixtures = match &config.fixtures.dir {
        Some(dir) => Fixtures::load_dir(dir)?,
        None => Fixtures::builtin().context("failed to load builtin fixtures")?,
    };
    tracing::debug!(
        tasks = fixtures.tasks.len(),
        categories = fixtures.categories.len(),
        latency = !latency.is_zero(),
        "seeding stores"
    );
    Ok(MemoryTaskFlow::seeded(fixtures, Arc::new(SystemClock::detect()), &latency))
}

fn install_tracing() {
    // RUST_LOG overrides the default WARN level; output goes to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
