use std::io::Write;

use anyhow::{Context, Result, bail};
use taskflow_app::{MemoryTaskFlow, QuickAddOverrides, TaskFilterBuilder, TaskPatch, parse_date_input};
use taskflow_core::{CategoryId, CategoryPatch, FilterSpec, NewCategory, NewTask, Priority, TaskId};
use time::OffsetDateTime;

use super::render::{self, CategoryNames};
use crate::{CategoryCommand, Command, Format, LsArgs, UpdateArgs};

/// Execute a single command against `flow`, writing results to `out`.
///
/// # Errors
/// Returns an error when arguments are invalid or the store rejects the operation.
pub async fn run<W: Write + Send>(command: Command, flow: &MemoryTaskFlow, out: &mut W) -> Result<()> {
    match command {
        Command::Ls(args) => handle_ls(flow, &args, out).await,
        Command::Show { task, format } => handle_show(flow, task, format, out).await,
        Command::New {
            title,
            description,
            priority,
            category,
            due,
        } => {
            handle_new(
                flow,
                NewTaskArgs {
                    title,
                    description,
                    priority,
                    category,
                    due,
                },
                out,
            )
            .await
        }
        Command::Add {
            text,
            description,
            priority,
            category,
            due,
        } => {
            let overrides = QuickAddOverrides {
                description,
                priority,
                category_id: category,
                due_date: due.as_deref().map(|raw| parse_due(flow, raw)).transpose()?,
            };
            handle_add(flow, &text.join(" "), overrides, out).await
        }
        Command::Update(args) => handle_update(flow, args, out).await,
        Command::Done { task } => handle_completion(flow, task, true, out).await,
        Command::Undone { task } => handle_completion(flow, task, false, out).await,
        Command::Toggle { task } => handle_toggle(flow, task, out).await,
        Command::Rm { task } => handle_rm(flow, task, out).await,
        Command::Reorder { tasks } => handle_reorder(flow, &tasks, out).await,
        Command::History { task } => handle_history(flow, task, out).await,
        Command::Stats { format } => handle_stats(flow, format, out).await,
        Command::Check { format } => handle_check(flow, format, out).await,
        Command::Category(command) => handle_category(flow, command, out).await,
        Command::Shell => bail!("the shell is already running"),
    }
}

async fn handle_ls<W: Write + Send>(flow: &MemoryTaskFlow, args: &LsArgs, out: &mut W) -> Result<()> {
    let spec = build_filter(args)?;
    let tasks = flow.list(&spec).await?;

    match args.format {
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?,
        Format::Table if tasks.is_empty() => {
            if spec.is_unconstrained() {
                writeln!(out, "No tasks found")?;
            } else {
                writeln!(out, "No tasks matched the provided filters")?;
            }
        }
        Format::Table => {
            let names = CategoryNames::new(&flow.categories_or_empty().await);
            render::task_table(out, &tasks, &names, flow.now())?;
        }
    }
    Ok(())
}

fn build_filter(args: &LsArgs) -> Result<FilterSpec> {
    let spec = TaskFilterBuilder::new()
        .with_preset(args.preset.as_deref())?
        .with_view(args.view.as_deref())?
        .with_categories(&args.categories)?
        .with_priorities(&args.priorities)?
        .with_date_filters(&args.dates)?
        .build();
    Ok(spec)
}

async fn handle_show<W: Write + Send>(
    flow: &MemoryTaskFlow,
    id: TaskId,
    format: Format,
    out: &mut W,
) -> Result<()> {
    let task = flow.tasks().get_by_id(id).await?;
    match format {
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?,
        Format::Table => {
            let names = CategoryNames::new(&flow.categories_or_empty().await);
            render::task_detail(out, &task, &names, flow.now())?;
        }
    }
    Ok(())
}

struct NewTaskArgs {
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
    category: Option<CategoryId>,
    due: Option<String>,
}

async fn handle_new<W: Write + Send>(flow: &MemoryTaskFlow, args: NewTaskArgs, out: &mut W) -> Result<()> {
    let due = args.due.as_deref().map(|raw| parse_due(flow, raw)).transpose()?;
    let mut input = NewTask::new(args.title)
        .priority(args.priority.unwrap_or_default())
        .category(args.category)
        .due(due);
    if let Some(description) = args.description {
        input = input.description(description);
    }
    let task = flow.tasks().create(input).await?;
    writeln!(out, "created task #{}: {}", task.id, task.title)?;
    Ok(())
}

async fn handle_add<W: Write + Send>(
    flow: &MemoryTaskFlow,
    text: &str,
    overrides: QuickAddOverrides,
    out: &mut W,
) -> Result<()> {
    let task = flow.quick_add(text, overrides).await?;
    writeln!(
        out,
        "created task #{}: {} [{}]",
        task.id, task.title, task.priority
    )?;
    Ok(())
}

async fn handle_update<W: Write + Send>(flow: &MemoryTaskFlow, args: UpdateArgs, out: &mut W) -> Result<()> {
    let category_id = if args.clear_category {
        Some(None)
    } else {
        args.category.map(Some)
    };
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due
            .as_deref()
            .map(|raw| parse_due(flow, raw).map(Some))
            .transpose()?
    };
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        priority: args.priority,
        category_id,
        due_date,
        order: args.order,
        ..TaskPatch::default()
    };
    if patch.is_empty() {
        bail!("Nothing to update for task #{}", args.task);
    }

    let task = flow.tasks().update(args.task, patch).await?;
    writeln!(out, "updated task #{}: {}", task.id, task.title)?;
    Ok(())
}

async fn handle_completion<W: Write + Send>(
    flow: &MemoryTaskFlow,
    id: TaskId,
    completed: bool,
    out: &mut W,
) -> Result<()> {
    let task = flow
        .tasks()
        .update(id, TaskPatch::completion(completed))
        .await?;
    let verb = if task.completed { "completed" } else { "reopened" };
    writeln!(out, "{verb} task #{}", task.id)?;
    Ok(())
}

async fn handle_toggle<W: Write + Send>(flow: &MemoryTaskFlow, id: TaskId, out: &mut W) -> Result<()> {
    let task = flow.toggle_completed(id).await?;
    let verb = if task.completed { "completed" } else { "reopened" };
    writeln!(out, "{verb} task #{}", task.id)?;
    Ok(())
}

async fn handle_rm<W: Write + Send>(flow: &MemoryTaskFlow, id: TaskId, out: &mut W) -> Result<()> {
    flow.tasks().delete(id).await?;
    writeln!(out, "deleted task #{id}")?;
    Ok(())
}

async fn handle_reorder<W: Write + Send>(flow: &MemoryTaskFlow, ids: &[TaskId], out: &mut W) -> Result<()> {
    let mut tasks = flow.tasks().reorder(ids).await?;
    tasks.sort_by_key(|task| (task.order, task.id));
    render::order_table(out, &tasks)?;
    Ok(())
}

async fn handle_history<W: Write + Send>(flow: &MemoryTaskFlow, id: TaskId, out: &mut W) -> Result<()> {
    let entries = flow.tasks().edit_history(id).await?;
    render::history(out, &entries)?;
    Ok(())
}

async fn handle_stats<W: Write + Send>(flow: &MemoryTaskFlow, format: Format, out: &mut W) -> Result<()> {
    let summary = flow.progress().await?;
    match format {
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?,
        Format::Table => render::progress(out, &summary)?,
    }
    Ok(())
}

async fn handle_check<W: Write + Send>(flow: &MemoryTaskFlow, format: Format, out: &mut W) -> Result<()> {
    let report = flow.integrity_report().await?;
    match format {
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
        Format::Table => render::integrity(out, &report)?,
    }
    Ok(())
}

async fn handle_category<W: Write + Send>(
    flow: &MemoryTaskFlow,
    command: CategoryCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        CategoryCommand::Ls { format } => {
            let categories = flow.categories().get_all().await?;
            match format {
                Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&categories)?)?,
                Format::Table => render::category_table(out, &categories)?,
            }
        }
        CategoryCommand::New { name, color, icon } => {
            let category = flow
                .categories()
                .create(NewCategory { name, color, icon })
                .await?;
            writeln!(out, "created category #{}: {}", category.id, category.name)?;
        }
        CategoryCommand::Update {
            id,
            name,
            color,
            icon,
        } => {
            let patch = CategoryPatch { name, color, icon };
            if patch.is_empty() {
                bail!("Nothing to update for category #{id}");
            }
            let category = flow.categories().update(id, patch).await?;
            writeln!(out, "updated category #{}: {}", category.id, category.name)?;
        }
        CategoryCommand::Rm { id } => {
            flow.delete_category(id).await?;
            let orphaned = flow.tasks().get_by_category(id).await?.len();
            writeln!(out, "deleted category #{id}")?;
            if orphaned > 0 {
                tracing::warn!(category = %id, tasks = orphaned, "tasks still reference deleted category");
                writeln!(out, "{orphaned} task(s) still reference category #{id}")?;
            }
        }
        CategoryCommand::Recount => {
            let categories = flow.refresh_task_counts().await?;
            render::category_table(out, &categories)?;
        }
    }
    Ok(())
}

fn parse_due(flow: &MemoryTaskFlow, raw: &str) -> Result<OffsetDateTime> {
    parse_date_input(raw, flow.now().offset()).with_context(|| format!("Invalid due date: {raw}"))
}
