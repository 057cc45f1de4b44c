use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    db::OrmConn,
    entity::toppings::{self, Entity as Toppings},
    error::{AppResult, is_unique_violation},
    mappers::{AccessPolicy, AddOutcome, Mapper},
    models::Topping,
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct ToppingPatch {
    pub name: Option<String>,
    pub price: Option<i64>,
}

/// The topping catalog. Pizzas reference these rows through `pizza_toppings`.
#[derive(Clone)]
pub struct ToppingMapper {
    db: OrmConn,
}

impl ToppingMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
        }
    }

    async fn find_row(&self, name: &str) -> AppResult<Option<toppings::Model>> {
        Ok(Toppings::find()
            .filter(toppings::Column::ToppingName.eq(name))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl Mapper for ToppingMapper {
    type Entity = Topping;
    type Patch = ToppingPatch;

    const POLICY: AccessPolicy = AccessPolicy::CATALOG;

    async fn add(&self, topping: &Topping) -> AppResult<AddOutcome> {
        let res = Toppings::insert(toppings::ActiveModel {
            topping_id: NotSet,
            topping_name: Set(topping.name.clone()),
            topping_price: Set(topping.price),
        })
        .exec(&self.db)
        .await;

        match res {
            Ok(res) => Ok(AddOutcome::Added(res.last_insert_id)),
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(topping = %topping.name, "topping already stored");
                Ok(AddOutcome::Conflict)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn edit(&self, topping: &Topping, patch: ToppingPatch) -> AppResult<bool> {
        let Some(row) = self.find_row(&topping.name).await? else {
            return Ok(false);
        };

        let mut active: toppings::ActiveModel = row.into();
        if let Some(name) = patch.name {
            active.topping_name = Set(name);
        }
        if let Some(price) = patch.price {
            active.topping_price = Set(price);
        }
        if active.is_changed() {
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn remove(&self, topping: &Topping) -> AppResult<bool> {
        let res = Toppings::delete_many()
            .filter(toppings::Column::ToppingName.eq(topping.name.as_str()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, topping: &Topping) -> AppResult<Option<Topping>> {
        Ok(self
            .find_row(&topping.name)
            .await?
            .map(|row| Topping::new(row.topping_name, row.topping_price)))
    }

    async fn get_current(&self) -> AppResult<Vec<Topping>> {
        Ok(Toppings::find()
            .order_by_asc(toppings::Column::ToppingName)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| Topping::new(row.topping_name, row.topping_price))
            .collect())
    }
}
