//! Todo CRUD endpoints, scoped to the authenticated user.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::AppState;
use crate::auth::{Auth, CurrentUser};
use crate::db::Todo;

#[derive(Serialize)]
struct TodoResponse {
    id: i64,
    title: String,
    completed: bool,
    /// Owner's username, read-only
    user: String,
}

impl TodoResponse {
    fn new(todo: Todo, username: &str) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            completed: todo.completed,
            user: username.to_string(),
        }
    }
}

/// Resolve the guard identity to a database user ID.
async fn resolve_user_id(state: &AppState, user: &CurrentUser) -> Result<i64, ApiError> {
    state
        .db
        .users()
        .get_by_uuid(&user.claims.sub)
        .await
        .db_err("Failed to look up user")?
        .map(|u| u.id)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
}

pub async fn list_todos(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = resolve_user_id(&state, &user).await?;

    let todos = state
        .db
        .todos()
        .list_for_user(user_id)
        .await
        .db_err("Failed to list todos")?;

    let todos: Vec<TodoResponse> = todos
        .into_iter()
        .map(|t| TodoResponse::new(t, &user.claims.username))
        .collect();

    Ok((StatusCode::OK, Json(todos)))
}

#[derive(Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    completed: bool,
}

pub async fn create_todo(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title may not be blank"));
    }

    let user_id = resolve_user_id(&state, &user).await?;

    let id = state
        .db
        .todos()
        .create(user_id, title, payload.completed)
        .await
        .db_err("Failed to create todo")?;

    let todo = state
        .db
        .todos()
        .get(id, user_id)
        .await
        .db_err("Failed to load todo")?
        .ok_or_else(|| ApiError::internal("Todo vanished after insert"))?;

    Ok((
        StatusCode::CREATED,
        Json(TodoResponse::new(todo, &user.claims.username)),
    ))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = resolve_user_id(&state, &user).await?;

    let todo = state
        .db
        .todos()
        .get(id, user_id)
        .await
        .db_err("Failed to get todo")?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    Ok((
        StatusCode::OK,
        Json(TodoResponse::new(todo, &user.claims.username)),
    ))
}

#[derive(Deserialize)]
pub struct UpdateTodoRequest {
    title: Option<String>,
    completed: Option<bool>,
}

pub async fn update_todo(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = resolve_user_id(&state, &user).await?;

    let todo = state
        .db
        .todos()
        .get(id, user_id)
        .await
        .db_err("Failed to get todo")?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    let title = match &payload.title {
        Some(title) => {
            let title = title.trim();
            if title.is_empty() {
                return Err(ApiError::bad_request("Title may not be blank"));
            }
            title.to_string()
        }
        None => todo.title,
    };
    let completed = payload.completed.unwrap_or(todo.completed);

    state
        .db
        .todos()
        .update(id, user_id, &title, completed)
        .await
        .db_err("Failed to update todo")?;

    let todo = state
        .db
        .todos()
        .get(id, user_id)
        .await
        .db_err("Failed to load todo")?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    Ok((
        StatusCode::OK,
        Json(TodoResponse::new(todo, &user.claims.username)),
    ))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = resolve_user_id(&state, &user).await?;

    let deleted = state
        .db
        .todos()
        .delete(id, user_id)
        .await
        .db_err("Failed to delete todo")?;

    if !deleted {
        return Err(ApiError::not_found("Todo not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
