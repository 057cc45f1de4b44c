use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        Breadstick, Drink, Item, ItemCategory, ItemKind, Pizza, PizzaCrust, PizzaShape, Topping,
    },
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ToppingInput {
    pub name: String,
    pub price: i64,
}

/// New catalog item. `price` is the base price for pizzas; toppings are added
/// on top.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    /// `Pizza`, `Drink` or `Breadstick`.
    pub category: String,
    pub price: i64,
    #[schema(value_type = Option<String>)]
    pub crust: Option<PizzaCrust>,
    #[schema(value_type = Option<String>)]
    pub shape: Option<PizzaShape>,
    #[serde(default)]
    pub toppings: Vec<ToppingInput>,
    pub ounces: Option<u32>,
    pub count: Option<u32>,
    pub sauce: Option<String>,
}

impl CreateItemRequest {
    pub fn into_item(self) -> AppResult<Item> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("item name is required".into()));
        }
        if self.price < 0 {
            return Err(AppError::Validation("price cannot be negative".into()));
        }

        let kind = match self.category.parse::<ItemCategory>()? {
            ItemCategory::Pizza => ItemKind::Pizza(
                Pizza::new(self.price)
                    .with_crust(self.crust.unwrap_or_default())
                    .with_shape(self.shape.unwrap_or_default())
                    .with_toppings(
                        self.toppings
                            .into_iter()
                            .map(|t| Topping::new(t.name, t.price)),
                    ),
            ),
            ItemCategory::Drink => {
                let ounces = self
                    .ounces
                    .ok_or_else(|| AppError::Validation("drinks need a size in ounces".into()))?;
                ItemKind::Drink(Drink::new(self.price, ounces))
            }
            ItemCategory::Breadstick => {
                let mut breadstick = Breadstick::new(self.price, self.count.unwrap_or(1));
                if let Some(sauce) = self.sauce {
                    breadstick.add_sauce(sauce);
                }
                ItemKind::Breadstick(breadstick)
            }
        };

        Ok(Item::new(self.name, self.description.unwrap_or_default(), kind))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemView {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
    pub toppings: Vec<ToppingInput>,
    pub ounces: Option<u32>,
    pub count: Option<u32>,
    pub sauce: Option<String>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        let mut view = ItemView {
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category().to_string(),
            price: item.price(),
            toppings: Vec::new(),
            ounces: None,
            count: None,
            sauce: None,
        };
        match &item.kind {
            ItemKind::Pizza(pizza) => {
                view.toppings = pizza
                    .toppings()
                    .iter()
                    .map(|t| ToppingInput {
                        name: t.name.clone(),
                        price: t.price,
                    })
                    .collect();
            }
            ItemKind::Drink(drink) => view.ounces = Some(drink.ounces()),
            ItemKind::Breadstick(breadstick) => {
                view.count = Some(breadstick.count());
                view.sauce = breadstick.sauce().map(str::to_string);
            }
        }
        view
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemList {
    pub items: Vec<ItemView>,
}
