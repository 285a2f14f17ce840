use crate::task::{NewTask, Task, TaskChanges, TaskStore, TaskStoreError};
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::{OpenApi, ToSchema};

/// Shared state of the task endpoints.
///
/// Every store operation runs under the single lock.
#[derive(Debug)]
pub struct TaskState {
    pub store: Mutex<TaskStore>,
}

impl TaskState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    pub id: u64,
    /// Short title of the task
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Whether the task has been completed
    pub done: bool,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            done: task.done(),
        }
    }
}

/// Request body for creating or replacing a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewTaskRequest {
    /// Task title, must not be empty
    pub title: String,
    /// Task description
    #[serde(default)]
    pub description: Option<String>,
    /// Completion flag, defaults to false
    #[serde(default)]
    pub done: bool,
}

impl NewTaskRequest {
    fn validate(self) -> Result<NewTask, TaskApiError> {
        ensure_title(&self.title)?;
        Ok(NewTask {
            title: self.title,
            description: self.description,
            done: self.done,
        })
    }
}

/// Request body for a partial update. Omitted or null fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// New title, must not be empty when given
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New completion flag
    #[serde(default)]
    pub done: Option<bool>,
}

impl UpdateTaskRequest {
    fn validate(self) -> Result<TaskChanges, TaskApiError> {
        if let Some(title) = &self.title {
            ensure_title(title)?;
        }
        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            done: self.done,
        })
    }
}

/// Marker carried by every successful response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
}

/// Response for GET /tasks/{id}.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub status: ResponseStatus,
    pub task: TaskJson,
}

/// Response for POST /tasks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskAddedResponse {
    pub status: ResponseStatus,
    pub task_added: TaskJson,
}

/// Response for PATCH /tasks/{id}.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskUpdatedResponse {
    pub status: ResponseStatus,
    pub task_updated: TaskJson,
}

/// Response for PUT /tasks/{id}.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskReplacedResponse {
    pub status: ResponseStatus,
    pub task_replaced: TaskJson,
}

/// Response for DELETE /tasks/{id}.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskDeletedResponse {
    pub status: ResponseStatus,
    pub message: String,
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error code
    pub error: String,
    /// Human readable explanation
    pub detail: String,
}

/// Error type for the task endpoints.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskApiError {
    /// The ID in the path is zero or negative.
    #[error("Task ID must be a positive integer")]
    InvalidId,
    /// No task has the requested ID.
    #[error("Task with ID {0} not found")]
    NotFound(u64),
    /// The request does not match the expected shape.
    #[error("{0}")]
    Validation(String),
}

impl TaskApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            TaskApiError::InvalidId => StatusCode::BAD_REQUEST,
            TaskApiError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TaskApiError::InvalidId => "INVALID_ID",
            TaskApiError::NotFound(_) => "NOT_FOUND",
            TaskApiError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<TaskStoreError> for TaskApiError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => TaskApiError::NotFound(id),
            TaskStoreError::EmptyTitle => TaskApiError::Validation(err.to_string()),
        }
    }
}

impl From<JsonRejection> for TaskApiError {
    fn from(rejection: JsonRejection) -> Self {
        TaskApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for TaskApiError {
    fn from(rejection: PathRejection) -> Self {
        TaskApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        tracing::debug!("Rejecting task request: {}", self);
        let body = ErrorResponse {
            error: self.code().to_string(),
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

fn ensure_title(title: &str) -> Result<(), TaskApiError> {
    if title.is_empty() {
        return Err(TaskApiError::Validation(
            "Task title must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn positive_id(id: i64) -> Result<u64, TaskApiError> {
    u64::try_from(id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or(TaskApiError::InvalidId)
}

/// Turns the raw path segment into a store ID, rejecting non-positive values.
fn task_id(path: Result<Path<i64>, PathRejection>) -> Result<u64, TaskApiError> {
    let Path(id) = path?;
    positive_id(id)
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "ID of the task")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 400, description = "ID is not a positive integer", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "ID is not an integer", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskResponse>, TaskApiError> {
    let id = task_id(path)?;
    let store = state.store.lock().await;
    let task = store.find_by_id(id)?.clone();

    Ok(Json(TaskResponse {
        status: ResponseStatus::Success,
        task: task.into(),
    }))
}

/// Handler for POST /tasks - Creates a new task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = NewTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskAddedResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<NewTaskRequest>, JsonRejection>,
) -> Result<Json<TaskAddedResponse>, TaskApiError> {
    let Json(request) = payload?;
    let new_task = request.validate()?;

    let task = state.store.lock().await.insert(new_task)?;
    tracing::info!("Created task {}", task.id());

    Ok(Json(TaskAddedResponse {
        status: ResponseStatus::Success,
        task_added: task.into(),
    }))
}

/// Handler for PATCH /tasks/{id} - Updates the given fields of a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "ID of the task")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskUpdatedResponse),
        (status = 400, description = "ID is not a positive integer", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskUpdatedResponse>, TaskApiError> {
    // Body shape is checked before the ID, so a malformed request is always a 422.
    let Path(raw_id) = path?;
    let Json(request) = payload?;
    let changes = request.validate()?;
    let id = positive_id(raw_id)?;

    let task = state
        .store
        .lock()
        .await
        .apply_partial_update(id, changes)?;

    Ok(Json(TaskUpdatedResponse {
        status: ResponseStatus::Success,
        task_updated: task.into(),
    }))
}

/// Handler for PUT /tasks/{id} - Replaces every field of a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "ID of the task")),
    request_body = NewTaskRequest,
    responses(
        (status = 200, description = "Task replaced", body = TaskReplacedResponse),
        (status = 400, description = "ID is not a positive integer", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn replace_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NewTaskRequest>, JsonRejection>,
) -> Result<Json<TaskReplacedResponse>, TaskApiError> {
    let Path(raw_id) = path?;
    let Json(request) = payload?;
    let new_task = request.validate()?;
    let id = positive_id(raw_id)?;

    let task = state.store.lock().await.replace(id, new_task)?;

    Ok(Json(TaskReplacedResponse {
        status: ResponseStatus::Success,
        task_replaced: task.into(),
    }))
}

/// Handler for DELETE /tasks/{id} - Removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "ID of the task")),
    responses(
        (status = 200, description = "Task deleted", body = TaskDeletedResponse),
        (status = 400, description = "ID is not a positive integer", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "ID is not an integer", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskDeletedResponse>, TaskApiError> {
    let id = task_id(path)?;

    let task = state.store.lock().await.delete(id)?;
    tracing::info!("Deleted task {}", task.id());

    Ok(Json(TaskDeletedResponse {
        status: ResponseStatus::Success,
        message: format!("Task with ID {} deleted", task.id()),
    }))
}

/// OpenAPI description of the task endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        get_task_handler,
        create_task_handler,
        update_task_handler,
        replace_task_handler,
        delete_task_handler
    ),
    components(schemas(
        TaskJson,
        NewTaskRequest,
        UpdateTaskRequest,
        ResponseStatus,
        TaskResponse,
        TaskAddedResponse,
        TaskUpdatedResponse,
        TaskReplacedResponse,
        TaskDeletedResponse,
        ErrorResponse
    )),
    tags((name = "Tasks", description = "CRUD operations on tasks"))
)]
pub struct ApiDoc;

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .patch(update_task_handler)
                .put(replace_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
