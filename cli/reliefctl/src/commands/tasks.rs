//! Task commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use relief_events::{TaskPriority, TaskStatus};
use relief_id::{CampId, TaskId, VolunteerId};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::output::{print_single, print_success, status_colored, OutputFormat};

use super::{print_list, CommandContext, ListResponse};

#[derive(Debug, Args)]
pub struct TasksCommand {
    #[command(subcommand)]
    command: TasksSubcommand,
}

#[derive(Debug, Subcommand)]
enum TasksSubcommand {
    /// List tasks, or one volunteer's tasks newest first.
    List(ListTasksArgs),

    /// Create a Pending task for a volunteer.
    Create(CreateTaskArgs),

    /// Move a task to a new status.
    Advance(AdvanceTaskArgs),
}

#[derive(Debug, Args)]
struct ListTasksArgs {
    #[arg(long)]
    volunteer: Option<VolunteerId>,
}

#[derive(Debug, Args)]
struct CreateTaskArgs {
    description: String,

    #[arg(long)]
    volunteer: VolunteerId,

    #[arg(long)]
    camp: Option<CampId>,

    /// high, medium or low.
    #[arg(long)]
    priority: Option<TaskPriority>,
}

#[derive(Debug, Args)]
struct AdvanceTaskArgs {
    task: TaskId,

    /// pending, in_progress or completed.
    status: TaskStatus,
}

impl TasksCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TasksSubcommand::List(args) => list_tasks(ctx, args).await,
            TasksSubcommand::Create(args) => create_task(ctx, args).await,
            TasksSubcommand::Advance(args) => advance_task(ctx, args).await,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskResponse {
    id: TaskId,
    description: String,
    #[serde(default)]
    camp_id: Option<CampId>,
    volunteer_id: VolunteerId,
    status: TaskStatus,
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    camp_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volunteer_name: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Camp")]
    camp: String,
    #[tabled(rename = "Volunteer")]
    volunteer: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&TaskResponse> for TaskRow {
    fn from(t: &TaskResponse) -> Self {
        Self {
            id: t.id.to_string(),
            description: t.description.clone(),
            camp: t.camp_name.clone().unwrap_or_else(|| "-".to_string()),
            volunteer: t
                .volunteer_name
                .clone()
                .unwrap_or_else(|| t.volunteer_id.to_string()),
            priority: t.priority.as_str().to_string(),
            status: status_colored(t.status.as_str()),
        }
    }
}

async fn list_tasks(ctx: CommandContext, args: ListTasksArgs) -> Result<()> {
    let path = match args.volunteer {
        Some(volunteer) => format!("/v1/volunteers/{volunteer}/tasks"),
        None => "/v1/tasks".to_string(),
    };
    let response: ListResponse<TaskResponse> = ctx.client()?.get(&path).await?;
    print_list(&ctx, &response, |t| TaskRow::from(t));
    Ok(())
}

async fn create_task(ctx: CommandContext, args: CreateTaskArgs) -> Result<()> {
    let body = serde_json::json!({
        "description": args.description,
        "volunteer_id": args.volunteer,
        "camp_id": args.camp,
        "priority": args.priority,
    });
    let task: TaskResponse = ctx.client()?.post("/v1/tasks", &body).await?;
    match ctx.format {
        OutputFormat::Table => print_success(&format!("Created task {}", task.id)),
        OutputFormat::Json => print_single(&task),
    }
    Ok(())
}

async fn advance_task(ctx: CommandContext, args: AdvanceTaskArgs) -> Result<()> {
    let body = serde_json::json!({ "status": args.status });
    let task: TaskResponse = ctx
        .client()?
        .patch(&format!("/v1/tasks/{}/status", args.task), &body)
        .await
        .map_err(|e| e.not_found_as(|| format!("Task '{}' not found", args.task)))?;
    match ctx.format {
        OutputFormat::Table => print_success(&format!(
            "Task {} is now {}",
            task.id,
            status_colored(task.status.as_str())
        )),
        OutputFormat::Json => print_single(&task),
    }
    Ok(())
}
