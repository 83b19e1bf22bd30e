use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(handlers::signup))
        .route("/api/login", post(handlers::login))
        .route("/api/add_expense", post(handlers::add_expense))
        .route("/api/get_expenses/{username}", get(handlers::get_expenses))
        .route("/api/weekly_summary/{username}", get(handlers::weekly_summary))
        .route(
            "/api/expenses/{id}",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
}
