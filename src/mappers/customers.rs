use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    db::OrmConn,
    entity::{
        customers::{self, Entity as Customers},
        payments::Entity as Payments,
    },
    error::{AppResult, is_unique_violation},
    mappers::{
        AccessPolicy, AddOutcome, Mapper,
        payments::{payment_from_model, resolve_payment_id},
    },
    models::{Customer, Payment},
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// New default payment, stored first when it is not on file yet.
    pub payment: Option<Payment>,
}

#[derive(Clone)]
pub struct CustomerMapper {
    db: OrmConn,
}

impl CustomerMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
        }
    }

    pub async fn find_by_id(&self, customer_id: i32) -> AppResult<Option<Customer>> {
        match Customers::find_by_id(customer_id).one(&self.db).await? {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        match self.find_row(email).await? {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_row(&self, email: &str) -> AppResult<Option<customers::Model>> {
        Ok(Customers::find()
            .filter(customers::Column::EmailAddress.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn hydrate(&self, row: customers::Model) -> AppResult<Customer> {
        let payment = match row.payment_id {
            Some(payment_id) => Payments::find_by_id(payment_id)
                .one(&self.db)
                .await?
                .map(payment_from_model)
                .transpose()?,
            None => None,
        };

        let mut customer = Customer::new(row.first_name, row.last_name, row.email_address);
        customer.phone_number = row.phone_number;
        customer.payment = payment;
        Ok(customer)
    }
}

#[async_trait]
impl Mapper for CustomerMapper {
    type Entity = Customer;
    type Patch = CustomerPatch;

    const POLICY: AccessPolicy = AccessPolicy::PRIVILEGED;

    async fn add(&self, customer: &Customer) -> AppResult<AddOutcome> {
        let txn = self.db.begin().await?;
        let outcome = insert_customer(&txn, customer).await?;
        if outcome.is_added() {
            txn.commit().await?;
        } else {
            txn.rollback().await?;
        }
        Ok(outcome)
    }

    async fn edit(&self, customer: &Customer, patch: CustomerPatch) -> AppResult<bool> {
        let Some(row) = self.find_row(&customer.email_address).await? else {
            return Ok(false);
        };

        let txn = self.db.begin().await?;
        let mut active: customers::ActiveModel = row.into();
        if let Some(first_name) = patch.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = patch.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone) = patch.phone_number {
            active.phone_number = Set(Some(phone));
        }
        if let Some(payment) = &patch.payment {
            active.payment_id = Set(Some(resolve_payment_id(&txn, payment).await?));
        }
        if active.is_changed() {
            active.update(&txn).await?;
        }
        txn.commit().await?;
        Ok(true)
    }

    async fn remove(&self, customer: &Customer) -> AppResult<bool> {
        let res = Customers::delete_many()
            .filter(customers::Column::EmailAddress.eq(customer.email_address.as_str()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, customer: &Customer) -> AppResult<Option<Customer>> {
        self.find_by_email(&customer.email_address).await
    }

    async fn get_current(&self) -> AppResult<Vec<Customer>> {
        let rows = Customers::find()
            .order_by_asc(customers::Column::CustomerId)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.hydrate(row).await?);
        }
        Ok(out)
    }
}

/// Stores the customer's default payment first so the customer row can
/// reference it. The caller owns the transaction and rolls back on conflict.
pub(crate) async fn insert_customer<C: ConnectionTrait>(
    conn: &C,
    customer: &Customer,
) -> AppResult<AddOutcome> {
    let payment_id = match &customer.payment {
        Some(payment) => Some(resolve_payment_id(conn, payment).await?),
        None => None,
    };

    let res = Customers::insert(customers::ActiveModel {
        customer_id: NotSet,
        first_name: Set(customer.first_name.clone()),
        last_name: Set(customer.last_name.clone()),
        phone_number: Set(customer.phone_number.clone()),
        email_address: Set(customer.email_address.clone()),
        payment_id: Set(payment_id),
    })
    .exec(conn)
    .await;

    match res {
        Ok(res) => {
            tracing::debug!(customer_id = res.last_insert_id, email = %customer.email_address, "customer stored");
            Ok(AddOutcome::Added(res.last_insert_id))
        }
        Err(err) if is_unique_violation(&err) => {
            tracing::warn!(email = %customer.email_address, "customer already stored");
            Ok(AddOutcome::Conflict)
        }
        Err(err) => Err(err.into()),
    }
}
