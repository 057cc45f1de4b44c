use crate::{
    dto::employees::{CreateEmployeeRequest, EmployeeList, EmployeeView},
    error::{AppError, AppResult},
    mappers::{AddOutcome, EmployeeMapper, LoginMapper},
    middleware::auth::Actor,
    models::{Employee, UserLogin, UserType},
    proxy::AccessProxy,
    response::ApiResponse,
    services::auth_service::hash_password,
    state::AppState,
};

pub async fn list_employees(state: &AppState, actor: &Actor) -> AppResult<ApiResponse<EmployeeList>> {
    let employees = AccessProxy::new(EmployeeMapper::new(state), actor.clone())
        .get_current()
        .await?;
    let total = employees.len();
    let items = employees.iter().map(EmployeeView::from).collect();
    Ok(ApiResponse::listing("Employees", EmployeeList { items }, total))
}

/// Hires an employee and, when credentials are supplied, gives them a login.
pub async fn create_employee(
    state: &AppState,
    actor: &Actor,
    payload: CreateEmployeeRequest,
) -> AppResult<ApiResponse<EmployeeView>> {
    let CreateEmployeeRequest {
        first_name,
        last_name,
        phone_number,
        email_address,
        pay,
        role,
        username,
        password,
    } = payload;

    let employee = Employee::new(first_name, last_name, role)
        .with_contact(phone_number, email_address)
        .with_pay(pay);

    let employees = AccessProxy::new(EmployeeMapper::new(state), actor.clone());
    let employee_id = match employees.add(&employee).await? {
        AddOutcome::Added(id) => id,
        AddOutcome::Conflict => {
            return Err(AppError::Conflict(format!(
                "employee '{}' already exists",
                employee.full_name()
            )));
        }
    };

    if let (Some(username), Some(password)) = (username, password) {
        let login = UserLogin::new(
            username.clone(),
            hash_password(&password)?,
            UserType::Employee,
            Some(employee_id),
        );
        let logins = AccessProxy::new(LoginMapper::new(state), actor.clone());
        if let AddOutcome::Conflict = logins.add(&login).await? {
            return Err(AppError::Conflict(format!("username '{username}' is taken")));
        }
    }

    tracing::info!(employee_id, name = %employee.full_name(), actor = %actor.name, "employee created");
    Ok(ApiResponse::ok(
        "Employee created",
        EmployeeView::from(&employee),
    ))
}
