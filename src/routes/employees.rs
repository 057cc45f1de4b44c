use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::employees::{CreateEmployeeRequest, EmployeeList, EmployeeView},
    error::AppResult,
    middleware::auth::Actor,
    response::ApiResponse,
    services::employee_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_employees).post(create_employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employees", body = ApiResponse<EmployeeList>),
        (status = 403, description = "Administrators only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<EmployeeList>>> {
    let resp = employee_service::list_employees(&state, &actor).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 200, description = "Employee created", body = ApiResponse<EmployeeView>),
        (status = 403, description = "Administrators only"),
        (status = 409, description = "Employee or username already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateEmployeeRequest>,
) -> AppResult<Json<ApiResponse<EmployeeView>>> {
    let resp = employee_service::create_employee(&state, &actor, payload).await?;
    Ok(Json(resp))
}
