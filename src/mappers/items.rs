use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};

use crate::{
    db::{DbPool, OrmConn},
    entity::{
        breadsticks, drinks, items,
        pizza_toppings::{self, Entity as PizzaToppings},
        pizzas::{self, Entity as Pizzas},
        toppings::{self, Entity as Toppings},
        Breadsticks, Drinks, Items,
    },
    error::{AppError, AppResult, is_unique_violation},
    mappers::{AccessPolicy, AddOutcome, Mapper},
    models::{
        Breadstick, Drink, Item, ItemCategory, ItemKind, Pizza, PizzaCrust, PizzaShape, PizzaState,
        Topping,
    },
    state::AppState,
};

/// Columns of the base row and every subtype row, joined so one query is
/// enough to rebuild any item.
pub(crate) const ITEM_SELECT: &str = r#"
    SELECT i.item_id, i.name, i.item_type, i.description, i.price,
           p.pizza_id, p.crust, p.shape, p.state,
           d.ounces,
           b.count, b.sauce
    FROM items i
    LEFT JOIN pizzas p ON p.item_id = i.item_id
    LEFT JOIN drinks d ON d.item_id = i.item_id
    LEFT JOIN breadsticks b ON b.item_id = i.item_id
"#;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub item_id: i32,
    pub name: String,
    pub item_type: String,
    pub description: String,
    pub price: i64,
    pub pizza_id: Option<i32>,
    pub crust: Option<i32>,
    pub shape: Option<i32>,
    pub state: Option<i32>,
    pub ounces: Option<i32>,
    pub count: Option<i32>,
    pub sauce: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Listed price. For pizzas this is base plus toppings.
    pub price: Option<i64>,
    pub pizza_state: Option<PizzaState>,
}

#[derive(Clone)]
pub struct ItemMapper {
    db: OrmConn,
    pool: DbPool,
}

impl ItemMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
            pool: state.pool.clone(),
        }
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!("{ITEM_SELECT} WHERE i.name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(hydrate_item(&self.pool, row).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Mapper for ItemMapper {
    type Entity = Item;
    type Patch = ItemPatch;

    const POLICY: AccessPolicy = AccessPolicy::CATALOG;

    async fn add(&self, item: &Item) -> AppResult<AddOutcome> {
        let subtype = SubtypeRow::from_kind(&item.kind)?;
        let txn = self.db.begin().await?;

        let topping_ids = match &subtype {
            SubtypeRow::Pizza(pizza) => match resolve_toppings(&txn, pizza).await? {
                Some(ids) => ids,
                None => {
                    tracing::warn!(name = %item.name, "topping already listed at another price, skipping item");
                    txn.rollback().await?;
                    return Ok(AddOutcome::Conflict);
                }
            },
            _ => Vec::new(),
        };

        let base = items::ActiveModel {
            item_id: NotSet,
            name: Set(item.name.clone()),
            item_type: Set(item.category().as_str().to_string()),
            description: Set(item.description.clone()),
            price: Set(item.price()),
        };
        let item_id = match Items::insert(base).exec(&txn).await {
            Ok(res) => res.last_insert_id,
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(name = %item.name, "item already stored, skipping subtype rows");
                txn.rollback().await?;
                return Ok(AddOutcome::Conflict);
            }
            Err(err) => return Err(err.into()),
        };

        match subtype {
            SubtypeRow::Pizza(pizza) => insert_pizza(&txn, item_id, pizza, topping_ids).await?,
            SubtypeRow::Drink { ounces } => {
                Drinks::insert(drinks::ActiveModel {
                    item_id: Set(item_id),
                    ounces: Set(ounces),
                })
                .exec_without_returning(&txn)
                .await?;
            }
            SubtypeRow::Breadstick { count, sauce } => {
                Breadsticks::insert(breadsticks::ActiveModel {
                    item_id: Set(item_id),
                    count: Set(count),
                    sauce: Set(sauce),
                })
                .exec_without_returning(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        tracing::debug!(item_id, name = %item.name, category = %item.category(), "item stored");
        Ok(AddOutcome::Added(item_id))
    }

    async fn edit(&self, item: &Item, patch: ItemPatch) -> AppResult<bool> {
        let Some(row) = Items::find()
            .filter(items::Column::Name.eq(item.name.as_str()))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };
        let item_id = row.item_id;

        let mut active: items::ActiveModel = row.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if active.is_changed() {
            active.update(&self.db).await?;
        }

        if let Some(state) = patch.pizza_state {
            Pizzas::update_many()
                .col_expr(pizzas::Column::State, Expr::value(state.code()))
                .filter(pizzas::Column::ItemId.eq(item_id))
                .exec(&self.db)
                .await?;
        }

        Ok(true)
    }

    async fn remove(&self, item: &Item) -> AppResult<bool> {
        let res = Items::delete_many()
            .filter(items::Column::Name.eq(item.name.as_str()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, item: &Item) -> AppResult<Option<Item>> {
        self.find_by_name(&item.name).await
    }

    async fn get_current(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!("{ITEM_SELECT} ORDER BY i.item_id"))
            .fetch_all(&self.pool)
            .await?;
        hydrate_items(&self.pool, rows).await
    }
}

/// Subtype columns, checked before anything is written.
enum SubtypeRow<'a> {
    Pizza(&'a Pizza),
    Drink { ounces: i32 },
    Breadstick { count: i32, sauce: Option<String> },
}

impl<'a> SubtypeRow<'a> {
    fn from_kind(kind: &'a ItemKind) -> AppResult<Self> {
        match kind {
            ItemKind::Pizza(pizza) => {
                let mut names = HashSet::new();
                if let Some(dup) = pizza.toppings().iter().find(|t| !names.insert(t.name.as_str())) {
                    return Err(AppError::Validation(format!(
                        "topping '{}' is listed more than once",
                        dup.name
                    )));
                }
                Ok(SubtypeRow::Pizza(pizza))
            }
            ItemKind::Drink(drink) => Ok(SubtypeRow::Drink {
                ounces: column_value(drink.ounces(), "drink ounces")?,
            }),
            ItemKind::Breadstick(breadstick) => Ok(SubtypeRow::Breadstick {
                count: column_value(breadstick.count(), "breadstick count")?,
                sauce: breadstick.sauce().map(str::to_string),
            }),
        }
    }
}

fn column_value(value: u32, what: &str) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::Validation(format!("{what} {value} is too large")))
}

async fn insert_pizza<C: ConnectionTrait>(
    conn: &C,
    item_id: i32,
    pizza: &Pizza,
    topping_ids: Vec<i32>,
) -> AppResult<()> {
    let pizza_id = Pizzas::insert(pizzas::ActiveModel {
        pizza_id: NotSet,
        item_id: Set(item_id),
        crust: Set(pizza.crust.code()),
        shape: Set(pizza.shape.code()),
        state: Set(pizza.state().code()),
    })
    .exec(conn)
    .await?
    .last_insert_id;

    let links: Vec<_> = topping_ids
        .into_iter()
        .map(|topping_id| pizza_toppings::ActiveModel {
            pizza_id: Set(pizza_id),
            topping_id: Set(topping_id),
        })
        .collect();
    if !links.is_empty() {
        PizzaToppings::insert_many(links)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

/// Catalog ids for the pizza's toppings, adding the ones the catalog does
/// not know yet. `None` when a topping name is listed at another price.
async fn resolve_toppings<C: ConnectionTrait>(
    conn: &C,
    pizza: &Pizza,
) -> AppResult<Option<Vec<i32>>> {
    let mut ids = Vec::with_capacity(pizza.toppings().len());
    for topping in pizza.toppings() {
        let existing = Toppings::find()
            .filter(toppings::Column::ToppingName.eq(topping.name.as_str()))
            .one(conn)
            .await?;
        match existing {
            Some(row) if row.topping_price == topping.price => ids.push(row.topping_id),
            Some(row) => {
                tracing::debug!(
                    topping = %topping.name,
                    listed = row.topping_price,
                    given = topping.price,
                    "topping price differs from catalog"
                );
                return Ok(None);
            }
            None => {
                let res = Toppings::insert(toppings::ActiveModel {
                    topping_id: NotSet,
                    topping_name: Set(topping.name.clone()),
                    topping_price: Set(topping.price),
                })
                .exec(conn)
                .await?;
                tracing::debug!(topping = %topping.name, "topping added to catalog");
                ids.push(res.last_insert_id);
            }
        }
    }
    Ok(Some(ids))
}

pub(crate) async fn hydrate_items(pool: &DbPool, rows: Vec<ItemRow>) -> AppResult<Vec<Item>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(hydrate_item(pool, row).await?);
    }
    Ok(out)
}

/// Rebuilds the concrete item from a joined row, picking the subtype by the
/// stored discriminator.
pub(crate) async fn hydrate_item(pool: &DbPool, row: ItemRow) -> AppResult<Item> {
    let category: ItemCategory = row.item_type.parse()?;
    let kind = match category {
        ItemCategory::Pizza => {
            let pizza_id = row.pizza_id.ok_or_else(|| missing_subtype(&row))?;
            let toppings = load_toppings(pizza_id, pool).await?;
            let topping_total: i64 = toppings.iter().map(|t| t.price).sum();
            let pizza = Pizza::new(row.price - topping_total)
                .with_crust(PizzaCrust::try_from(row.crust.unwrap_or_default())?)
                .with_shape(PizzaShape::try_from(row.shape.unwrap_or_default())?)
                .with_state(PizzaState::try_from(row.state.unwrap_or_default())?)
                .with_toppings(toppings);
            ItemKind::Pizza(pizza)
        }
        ItemCategory::Drink => {
            let ounces = row.ounces.ok_or_else(|| missing_subtype(&row))?;
            ItemKind::Drink(Drink::new(row.price, ounces.max(0) as u32))
        }
        ItemCategory::Breadstick => {
            let count = row.count.ok_or_else(|| missing_subtype(&row))?;
            let mut breadstick = Breadstick::new(row.price, count.max(0) as u32);
            if let Some(sauce) = row.sauce {
                breadstick.add_sauce(sauce);
            }
            ItemKind::Breadstick(breadstick)
        }
    };

    Ok(Item::new(row.name, row.description, kind))
}

async fn load_toppings(pizza_id: i32, pool: &DbPool) -> AppResult<BTreeSet<Topping>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT t.topping_name, t.topping_price
        FROM toppings t
        JOIN pizza_toppings pt ON pt.topping_id = t.topping_id
        WHERE pt.pizza_id = ?
        "#,
    )
    .bind(pizza_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(name, price)| Topping::new(name, price))
        .collect())
}

fn missing_subtype(row: &ItemRow) -> AppError {
    AppError::Internal(anyhow::anyhow!(
        "item {} ({}) has no {} row",
        row.item_id,
        row.name,
        row.item_type.to_lowercase()
    ))
}
