use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};

use crate::{
    dto::items::{CreateItemRequest, ItemList, ItemView},
    error::AppResult,
    middleware::auth::Actor,
    response::ApiResponse,
    routes::params::Pagination,
    services::item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{name}", delete(delete_item))
}

#[utoipa::path(
    get,
    path = "/api/items",
    params(Pagination),
    responses(
        (status = 200, description = "Catalog items", body = ApiResponse<ItemList>)
    ),
    tag = "Items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ItemList>>> {
    let resp = item_service::list_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/items",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Item created", body = ApiResponse<ItemView>),
        (status = 403, description = "Only administrators may change the catalog"),
        (status = 409, description = "Item name already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<Json<ApiResponse<ItemView>>> {
    let resp = item_service::create_item(&state, &actor, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/items/{name}",
    params(("name" = String, Path, description = "Item name")),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<ItemView>),
        (status = 403, description = "Only administrators may change the catalog"),
        (status = 404, description = "Unknown item")
    ),
    security(("bearer_auth" = [])),
    tag = "Items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    actor: Actor,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<ItemView>>> {
    let resp = item_service::delete_item(&state, &actor, &name).await?;
    Ok(Json(resp))
}
