/// Task endpoints
///
/// # Endpoints
///
/// - `GET /tasks` - List the caller's tasks with filters and sort
/// - `POST /tasks` - Create a task
/// - `PUT/PATCH /tasks/:id` - Partial update
/// - `DELETE /tasks/:id` - Delete
/// - `GET /tasks/stats` - Dashboard statistics
///
/// All handlers run behind the JWT layer and scope every store operation to
/// the authenticated user. A task that exists but belongs to someone else is
/// indistinguishable from one that does not exist: both are 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studydeck_shared::{
    auth::middleware::AuthContext,
    models::task::{
        CreateTask, Subtask, Task, TaskFilter, TaskSort, UpdateTask, STATUS_COMPLETED,
        STATUS_PENDING,
    },
};
use uuid::Uuid;

/// Rejection message for a missing or empty title.
const MSG_TITLE_REQUIRED: &str = "Title is required";

/// Query parameters for `GET /tasks`
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Case-insensitive substring match on subject
    pub subject: Option<String>,

    /// Exact priority match
    pub priority: Option<String>,

    /// Exact status match
    pub status: Option<String>,

    /// Sort specification, `field` or `field:direction`
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

/// Query parameters for `GET /tasks/stats`
///
/// Extends the listing filters with free text and an inclusive creation-date
/// window (RFC 3339 timestamps).
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub subject: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,

    /// Free-text search over title, description, and subject
    pub q: Option<String>,

    /// Inclusive lower bound on createdAt
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on createdAt
    pub to: Option<DateTime<Utc>>,
}

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Title; required and non-empty
    pub title: Option<String>,

    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub subtasks: Option<Vec<Subtask>>,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub subtasks: Option<Vec<Subtask>>,
}

/// List response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Single-task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

/// Delete acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub message: String,
}

/// Dashboard statistics response
#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    /// Tasks matching the base filter
    pub total: i64,

    /// Of those, tasks with status "completed"
    pub completed: i64,

    /// Of those, tasks with status "pending"
    pub pending: i64,

    /// Up to 5 tasks with deadline at or after now, soonest first
    pub upcoming: Vec<Task>,
}

/// List the caller's tasks
///
/// Default order is newest first (`createdAt` descending). An empty result
/// is a normal 200, not an error.
///
/// # Endpoint
///
/// ```text
/// GET /tasks?subject=math&priority=high&status=pending&sortBy=deadline:asc
/// Authorization: Bearer <token>
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let mut filter = TaskFilter::scoped(auth.user_id);
    filter.subject = params.subject;
    filter.priority = params.priority;
    filter.status = params.status;

    let sort = TaskSort::parse(params.sort_by.as_deref());

    let tasks = Task::list(&state.db, &filter, &sort).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Create a task owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "title": "Essay", "subject": "English", "deadline": "2026-09-01T00:00:00Z" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or empty title
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let title = match req.title {
        Some(title) if !title.is_empty() => title,
        _ => return Err(ApiError::BadRequest(MSG_TITLE_REQUIRED.to_string())),
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title,
            subject: req.subject,
            description: req.description,
            priority: req.priority,
            status: req.status,
            deadline: req.deadline,
            subtasks: req.subtasks,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

/// Apply a partial update to one of the caller's tasks
///
/// The lookup matches id AND owner, so guessing another user's task id yields
/// the same 404 as a nonexistent id. Patched values follow the creation
/// rules: a present-but-empty title is rejected. An empty patch returns the
/// task as-is.
///
/// # Errors
///
/// - `400 Bad Request`: patched title is empty
/// - `404 Not Found`: no task with this id owned by the caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    if let Some(ref title) = req.title {
        if title.is_empty() {
            return Err(ApiError::BadRequest(MSG_TITLE_REQUIRED.to_string()));
        }
    }

    let patch = UpdateTask {
        title: req.title,
        subject: req.subject,
        description: req.description,
        priority: req.priority,
        status: req.status,
        deadline: req.deadline,
        subtasks: req.subtasks,
    };

    let task = Task::update(&state.db, id, auth.user_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse { task }))
}

/// Delete one of the caller's tasks
///
/// # Errors
///
/// - `404 Not Found`: no task with this id owned by the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let deleted = Task::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted".to_string(),
    }))
}

/// Dashboard statistics for the caller's tasks
///
/// Four independent read-only sub-queries (total, completed, pending,
/// upcoming) run concurrently; the completed/pending counts override any
/// caller-supplied status filter.
///
/// # Endpoint
///
/// ```text
/// GET /tasks/stats?q=essay&from=2026-01-01T00:00:00Z
/// Authorization: Bearer <token>
/// ```
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<StatsQuery>,
) -> ApiResult<Json<DashboardStatsResponse>> {
    let mut filter = TaskFilter::scoped(auth.user_id);
    filter.subject = params.subject;
    filter.priority = params.priority;
    filter.status = params.status;
    filter.q = params.q;
    filter.from = params.from;
    filter.to = params.to;

    let completed_filter = filter.with_status(STATUS_COMPLETED);
    let pending_filter = filter.with_status(STATUS_PENDING);
    let now = Utc::now();

    let (total, completed, pending, upcoming) = tokio::try_join!(
        Task::count(&state.db, &filter),
        Task::count(&state.db, &completed_filter),
        Task::count(&state.db, &pending_filter),
        Task::upcoming(&state.db, &filter, now),
    )?;

    Ok(Json(DashboardStatsResponse {
        total,
        completed,
        pending,
        upcoming,
    }))
}
