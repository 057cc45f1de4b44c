use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Employee, EmployeeRole};

/// New employee. When `username` and `password` are both given a login is
/// created for them as well.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    #[serde(default)]
    pub pay: i64,
    /// `administrator`, `driver`, `baker` or `desk_worker`.
    #[schema(value_type = String)]
    pub role: EmployeeRole,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeView {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub pay: i64,
    pub role: String,
}

impl From<&Employee> for EmployeeView {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            phone_number: employee.phone_number.clone(),
            email_address: employee.email_address.clone(),
            pay: employee.pay,
            role: crate::models::Role::from(employee.role).to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeList {
    pub items: Vec<EmployeeView>,
}
