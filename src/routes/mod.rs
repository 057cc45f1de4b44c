use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod doc;
pub mod employees;
pub mod health;
pub mod items;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/items", items::router())
        .nest("/orders", orders::router())
        .nest("/employees", employees::router())
}
