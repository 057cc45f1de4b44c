use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::payment::Payment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Customer,
    Employee,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Customer => "Customer",
            UserType::Employee => "Employee",
        }
    }
}

impl FromStr for UserType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(UserType::Customer),
            "Employee" => Ok(UserType::Employee),
            other => Err(AppError::Validation(format!("unknown user type '{other}'"))),
        }
    }
}

/// Job of an employee, stored as `employees.employee_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Administrator,
    Driver,
    Baker,
    DeskWorker,
}

impl EmployeeRole {
    pub fn code(&self) -> i32 {
        match self {
            EmployeeRole::Administrator => 1,
            EmployeeRole::Driver => 2,
            EmployeeRole::Baker => 3,
            EmployeeRole::DeskWorker => 4,
        }
    }
}

impl TryFrom<i32> for EmployeeRole {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(EmployeeRole::Administrator),
            2 => Ok(EmployeeRole::Driver),
            3 => Ok(EmployeeRole::Baker),
            4 => Ok(EmployeeRole::DeskWorker),
            other => Err(AppError::Validation(format!("unknown employee type {other}"))),
        }
    }
}

/// Role of whoever is calling into the store, resolved once at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Driver,
    Baker,
    DeskWorker,
    Customer,
    #[default]
    Unauthenticated,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Driver => "driver",
            Role::Baker => "baker",
            Role::DeskWorker => "desk_worker",
            Role::Customer => "customer",
            Role::Unauthenticated => "unauthenticated",
        }
    }

    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageCatalog | Capability::ViewPrivileged => {
                matches!(self, Role::Administrator)
            }
            Capability::AcknowledgeOrder => matches!(self, Role::DeskWorker),
            Capability::PrepareOrder => matches!(self, Role::Baker),
            Capability::DeliverOrder => matches!(self, Role::Driver),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "driver" => Ok(Role::Driver),
            "baker" => Ok(Role::Baker),
            "desk_worker" => Ok(Role::DeskWorker),
            "customer" => Ok(Role::Customer),
            "unauthenticated" => Ok(Role::Unauthenticated),
            other => Err(AppError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

impl From<EmployeeRole> for Role {
    fn from(role: EmployeeRole) -> Self {
        match role {
            EmployeeRole::Administrator => Role::Administrator,
            EmployeeRole::Driver => Role::Driver,
            EmployeeRole::Baker => Role::Baker,
            EmployeeRole::DeskWorker => Role::DeskWorker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Add, edit or remove shared catalog records.
    ManageCatalog,
    /// List employees, customers, payments and logins.
    ViewPrivileged,
    AcknowledgeOrder,
    PrepareOrder,
    DeliverOrder,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageCatalog => "manage_catalog",
            Capability::ViewPrivileged => "view_privileged",
            Capability::AcknowledgeOrder => "acknowledge_order",
            Capability::PrepareOrder => "prepare_order",
            Capability::DeliverOrder => "deliver_order",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub pay: i64,
    pub role: EmployeeRole,
    #[serde(skip)]
    clocked_in: bool,
}

impl Employee {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: EmployeeRole,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: None,
            email_address: None,
            pay: 0,
            role,
            clocked_in: false,
        }
    }

    pub fn with_contact(mut self, phone_number: Option<String>, email_address: Option<String>) -> Self {
        self.phone_number = phone_number;
        self.email_address = email_address;
        self
    }

    pub fn with_pay(mut self, pay: i64) -> Self {
        self.pay = pay;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == EmployeeRole::Administrator
    }

    pub fn clock_in(&mut self) {
        self.clocked_in = true;
    }

    pub fn clock_out(&mut self) {
        self.clocked_in = false;
    }

    pub fn is_clocked_in(&self) -> bool {
        self.clocked_in
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email_address: String,
    pub payment: Option<Payment>,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: None,
            email_address: email_address.into(),
            payment: None,
        }
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLogin {
    pub username: String,
    /// Argon2 PHC string, never the plain password.
    #[serde(skip_serializing)]
    pub password: String,
    pub user_type: UserType,
    pub active: bool,
    /// Row id of the employee or customer this login belongs to.
    pub owner_id: Option<i32>,
}

impl UserLogin {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        user_type: UserType,
        owner_id: Option<i32>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            user_type,
            active: false,
            owner_id,
        }
    }
}
