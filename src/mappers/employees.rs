use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    db::OrmConn,
    entity::employees::{self, Entity as Employees},
    error::{AppResult, is_unique_violation},
    mappers::{AccessPolicy, AddOutcome, Mapper},
    models::{Employee, EmployeeRole},
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct EmployeePatch {
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub pay: Option<i64>,
    pub role: Option<EmployeeRole>,
}

#[derive(Clone)]
pub struct EmployeeMapper {
    db: OrmConn,
}

impl EmployeeMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
        }
    }

    pub async fn find_by_id(&self, employee_id: i32) -> AppResult<Option<Employee>> {
        Employees::find_by_id(employee_id)
            .one(&self.db)
            .await?
            .map(employee_from_model)
            .transpose()
    }

    /// Row id of the stored employee with the same name.
    pub async fn find_id(&self, employee: &Employee) -> AppResult<Option<i32>> {
        Ok(self.find_row(employee).await?.map(|row| row.employee_id))
    }

    async fn find_row(&self, employee: &Employee) -> AppResult<Option<employees::Model>> {
        Ok(Employees::find()
            .filter(employees::Column::FirstName.eq(employee.first_name.as_str()))
            .filter(employees::Column::LastName.eq(employee.last_name.as_str()))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl Mapper for EmployeeMapper {
    type Entity = Employee;
    type Patch = EmployeePatch;

    const POLICY: AccessPolicy = AccessPolicy::PRIVILEGED;

    async fn add(&self, employee: &Employee) -> AppResult<AddOutcome> {
        let res = Employees::insert(employees::ActiveModel {
            employee_id: NotSet,
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            phone_number: Set(employee.phone_number.clone()),
            email_address: Set(employee.email_address.clone()),
            pay: Set(employee.pay),
            employee_type: Set(employee.role.code()),
        })
        .exec(&self.db)
        .await;

        match res {
            Ok(res) => {
                tracing::debug!(employee_id = res.last_insert_id, name = %employee.full_name(), "employee stored");
                Ok(AddOutcome::Added(res.last_insert_id))
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(name = %employee.full_name(), "employee already stored");
                Ok(AddOutcome::Conflict)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn edit(&self, employee: &Employee, patch: EmployeePatch) -> AppResult<bool> {
        let Some(row) = self.find_row(employee).await? else {
            return Ok(false);
        };

        let mut active: employees::ActiveModel = row.into();
        if let Some(phone) = patch.phone_number {
            active.phone_number = Set(Some(phone));
        }
        if let Some(email) = patch.email_address {
            active.email_address = Set(Some(email));
        }
        if let Some(pay) = patch.pay {
            active.pay = Set(pay);
        }
        if let Some(role) = patch.role {
            active.employee_type = Set(role.code());
        }
        if active.is_changed() {
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn remove(&self, employee: &Employee) -> AppResult<bool> {
        let res = Employees::delete_many()
            .filter(employees::Column::FirstName.eq(employee.first_name.as_str()))
            .filter(employees::Column::LastName.eq(employee.last_name.as_str()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, employee: &Employee) -> AppResult<Option<Employee>> {
        self.find_row(employee)
            .await?
            .map(employee_from_model)
            .transpose()
    }

    async fn get_current(&self) -> AppResult<Vec<Employee>> {
        Employees::find()
            .order_by_asc(employees::Column::EmployeeId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(employee_from_model)
            .collect()
    }
}

fn employee_from_model(model: employees::Model) -> AppResult<Employee> {
    let role = EmployeeRole::try_from(model.employee_type)?;
    Ok(Employee::new(model.first_name, model.last_name, role)
        .with_contact(model.phone_number, model.email_address)
        .with_pay(model.pay))
}
