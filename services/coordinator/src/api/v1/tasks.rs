//! Task API endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use relief_events::TaskStatus;
use relief_id::{CampId, TaskId, VolunteerId};
use serde::{Deserialize, Serialize};

use super::ListResponse;
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::state::AppState;
use crate::store::{NewTask, Task, VolunteerFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/{task_id}", get(get_task))
        .route("/{task_id}/status", patch(advance_task))
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AdvanceTaskRequest {
    pub status: String,
}

/// A task with the names of what it references, when they resolve.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camp_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_name: Option<String>,
}

/// Name lookup for rendering many tasks at once.
pub struct TaskView {
    camps: HashMap<CampId, String>,
    volunteers: HashMap<VolunteerId, String>,
}

impl TaskView {
    pub async fn new(state: &AppState) -> Self {
        let camps = state
            .camps()
            .list()
            .await
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let volunteers = state
            .volunteers()
            .list(&VolunteerFilter::default())
            .await
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();
        Self { camps, volunteers }
    }

    pub fn render(&self, task: Task) -> TaskResponse {
        TaskResponse {
            camp_name: task.camp_id.and_then(|id| self.camps.get(&id).cloned()),
            volunteer_name: self.volunteers.get(&task.volunteer_id).cloned(),
            task,
        }
    }

    pub fn render_all(&self, tasks: Vec<Task>) -> Vec<TaskResponse> {
        tasks.into_iter().map(|t| self.render(t)).collect()
    }
}

async fn describe(state: &AppState, task: Task) -> TaskResponse {
    let camp_name = match task.camp_id {
        Some(id) => state.camps().get(id).await.ok().map(|c| c.name),
        None => None,
    };
    let volunteer_name = state
        .volunteers()
        .get(task.volunteer_id)
        .await
        .ok()
        .map(|v| v.name);
    TaskResponse {
        task,
        camp_name,
        volunteer_name,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /v1/tasks
async fn list_tasks(State(state): State<AppState>) -> Json<ListResponse<TaskResponse>> {
    let tasks = state.tasks().list().await;
    let view = TaskView::new(&state).await;
    Json(view.render_all(tasks).into())
}

/// POST /v1/tasks
///
/// The task starts Pending; the volunteer's status is unchanged until the
/// task is advanced.
async fn create_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<NewTask>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state
        .tasks()
        .create(req)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok((StatusCode::CREATED, Json(describe(&state, task).await)))
}

/// GET /v1/tasks/{task_id}
async fn get_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id: TaskId = ctx.parse_id(&task_id, TaskId::KIND)?;
    let task = state
        .tasks()
        .get(task_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(describe(&state, task).await))
}

/// PATCH /v1/tasks/{task_id}/status
async fn advance_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(task_id): Path<String>,
    Json(req): Json<AdvanceTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id: TaskId = ctx.parse_id(&task_id, TaskId::KIND)?;
    let status: TaskStatus = req.status.parse().map_err(|e: relief_events::EventError| {
        ApiError::bad_request("invalid_status", e.to_string())
            .with_request_id(ctx.request_id.clone())
    })?;
    let task = state
        .tasks()
        .advance(task_id, status)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(describe(&state, task).await))
}
