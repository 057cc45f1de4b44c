use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};

use crate::{
    dto::orders::{CheckoutRequest, OrderList, OrderView, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::Actor,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(checkout))
        .route("/{number}/status", patch(update_order_status))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Open orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_open_orders(&state, &actor).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<OrderView>),
        (status = 403, description = "Caller is not the signed-in customer"),
        (status = 422, description = "Incomplete order or payment")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::checkout(&state, &actor, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{number}/status",
    params(("number" = i64, Path, description = "Order number")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order advanced", body = ApiResponse<OrderView>),
        (status = 403, description = "Step belongs to another role"),
        (status = 404, description = "Unknown order"),
        (status = 422, description = "Order is not ready for this step")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(number): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp =
        order_service::update_order_status(&state, &actor, number, payload.transition).await?;
    Ok(Json(resp))
}
