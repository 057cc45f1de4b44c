use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait, sea_query::Expr,
};

use crate::{
    db::{DbPool, OrmConn},
    entity::{
        items::{self, Entity as Items},
        order_items::{self, Entity as OrderItems},
        orders::{self, Entity as Orders},
        payments::Entity as Payments,
    },
    error::{AppError, AppResult, is_unique_violation},
    mappers::{
        AccessPolicy, AddOutcome, Mapper,
        items::{ITEM_SELECT, ItemRow, hydrate_items},
        payments::{payment_from_model, resolve_payment_id},
    },
    models::{Order, OrderStatus},
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Clone)]
pub struct OrderMapper {
    db: OrmConn,
    pool: DbPool,
}

impl OrderMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
            pool: state.pool.clone(),
        }
    }

    pub async fn find_by_number(&self, number: i64) -> AppResult<Option<Order>> {
        let row = Orders::find()
            .filter(orders::Column::OrderNumber.eq(number))
            .one(&self.db)
            .await?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Stores a new lifecycle status. Returns false when the order is unknown.
    pub async fn set_status(&self, number: i64, status: OrderStatus) -> AppResult<bool> {
        let res = Orders::update_many()
            .col_expr(orders::Column::Status, Expr::value(status.as_str()))
            .filter(orders::Column::OrderNumber.eq(number))
            .exec(&self.db)
            .await?;
        tracing::debug!(order_number = number, %status, "order status stored");
        Ok(res.rows_affected > 0)
    }

    async fn hydrate(&self, row: orders::Model) -> AppResult<Order> {
        let payment = Payments::find_by_id(row.payment_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "order {} references missing payment {}",
                    row.order_number,
                    row.payment_id
                ))
            })
            .and_then(payment_from_model)?;

        let item_rows = sqlx::query_as::<_, ItemRow>(&format!(
            "{ITEM_SELECT} JOIN order_items oi ON oi.item_id = i.item_id \
             WHERE oi.order_id = ? ORDER BY oi.order_item_id"
        ))
        .bind(row.order_id)
        .fetch_all(&self.pool)
        .await?;
        let items = hydrate_items(&self.pool, item_rows).await?;

        Ok(Order::restore(
            row.order_number,
            row.customer_name,
            row.customer_email,
            payment,
            items,
            row.status.parse()?,
        ))
    }
}

#[async_trait]
impl Mapper for OrderMapper {
    type Entity = Order;
    type Patch = OrderPatch;

    const POLICY: AccessPolicy = AccessPolicy::CATALOG;

    /// Stores the payment, then the order, then one link per ordered item.
    /// Links are written only when the order row itself was new.
    async fn add(&self, order: &Order) -> AppResult<AddOutcome> {
        let number = order
            .number()
            .ok_or_else(|| AppError::Validation("order must be submitted before it is stored".into()))?;

        let txn = self.db.begin().await?;
        let payment_id = resolve_payment_id(&txn, order.payment()).await?;

        let inserted = Orders::insert(orders::ActiveModel {
            order_id: NotSet,
            order_number: Set(number),
            status: Set(order.status().as_str().to_string()),
            customer_name: Set(order.customer_name().to_string()),
            customer_email: Set(order.customer_email().to_string()),
            payment_id: Set(payment_id),
        })
        .exec(&txn)
        .await;
        let order_id = match inserted {
            Ok(res) => res.last_insert_id,
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(order_number = number, "order already stored, items not linked");
                txn.commit().await?;
                return Ok(AddOutcome::Conflict);
            }
            Err(err) => return Err(err.into()),
        };

        let names: Vec<&str> = order.items().iter().map(|i| i.name.as_str()).collect();
        let ids: HashMap<String, i32> = Items::find()
            .filter(items::Column::Name.is_in(names))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| (row.name, row.item_id))
            .collect();

        let mut links = Vec::with_capacity(order.items().len());
        for item in order.items() {
            match ids.get(&item.name) {
                Some(item_id) => links.push(order_items::ActiveModel {
                    order_item_id: NotSet,
                    order_id: Set(order_id),
                    item_id: Set(*item_id),
                }),
                None => {
                    tracing::warn!(order_number = number, item = %item.name, "ordered item not in catalog, skipping link");
                }
            }
        }
        if !links.is_empty() {
            OrderItems::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        tracing::debug!(order_id, order_number = number, subtotal = order.subtotal(), "order stored");
        Ok(AddOutcome::Added(order_id))
    }

    async fn edit(&self, order: &Order, patch: OrderPatch) -> AppResult<bool> {
        let Some(number) = order.number() else {
            return Ok(false);
        };
        let Some(row) = Orders::find()
            .filter(orders::Column::OrderNumber.eq(number))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut active: orders::ActiveModel = row.into();
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(name) = patch.customer_name {
            active.customer_name = Set(name);
        }
        if let Some(email) = patch.customer_email {
            active.customer_email = Set(email);
        }
        if active.is_changed() {
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn remove(&self, order: &Order) -> AppResult<bool> {
        let Some(number) = order.number() else {
            return Ok(false);
        };
        let res = Orders::delete_many()
            .filter(orders::Column::OrderNumber.eq(number))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, order: &Order) -> AppResult<Option<Order>> {
        match order.number() {
            Some(number) => self.find_by_number(number).await,
            None => Ok(None),
        }
    }

    /// Orders the store is still working on.
    async fn get_current(&self) -> AppResult<Vec<Order>> {
        let open = OrderStatus::OPEN.iter().map(OrderStatus::as_str);
        let rows = Orders::find()
            .filter(orders::Column::Status.is_in(open))
            .order_by_asc(orders::Column::OrderNumber)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.hydrate(row).await?);
        }
        Ok(out)
    }
}
