mod error;
mod session;
mod todos;
mod users;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::AppState;
use crate::auth::refresh_session;

/// Create the API router.
///
/// Public routes (login, register, check-auth) bypass the refresh middleware
/// entirely; everything else sits behind it and the auth guard.
pub fn create_api_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/login", post(session::login))
        .route("/register", post(users::register))
        .route("/check-auth", get(session::check_auth))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/logout", post(session::logout))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, refresh_session));

    public.merge(protected)
}
