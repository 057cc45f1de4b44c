use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Discriminator stored in `items.item_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Pizza,
    Drink,
    Breadstick,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Pizza => "Pizza",
            ItemCategory::Drink => "Drink",
            ItemCategory::Breadstick => "Breadstick",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pizza" => Ok(ItemCategory::Pizza),
            "Drink" => Ok(ItemCategory::Drink),
            "Breadstick" => Ok(ItemCategory::Breadstick),
            other => Err(AppError::Validation(format!("unknown item type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PizzaShape {
    #[default]
    Circular,
    Square,
}

impl PizzaShape {
    pub fn code(&self) -> i32 {
        match self {
            PizzaShape::Circular => 0,
            PizzaShape::Square => 1,
        }
    }
}

impl TryFrom<i32> for PizzaShape {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PizzaShape::Circular),
            1 => Ok(PizzaShape::Square),
            other => Err(AppError::Validation(format!("unknown pizza shape {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PizzaCrust {
    Thin,
    Flatbread,
    #[default]
    Thick,
    ChicagoStyle,
}

impl PizzaCrust {
    pub fn code(&self) -> i32 {
        match self {
            PizzaCrust::Thin => 0,
            PizzaCrust::Flatbread => 1,
            PizzaCrust::Thick => 2,
            PizzaCrust::ChicagoStyle => 3,
        }
    }
}

impl TryFrom<i32> for PizzaCrust {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PizzaCrust::Thin),
            1 => Ok(PizzaCrust::Flatbread),
            2 => Ok(PizzaCrust::Thick),
            3 => Ok(PizzaCrust::ChicagoStyle),
            other => Err(AppError::Validation(format!("unknown pizza crust {other}"))),
        }
    }
}

/// Kitchen progress of a pizza. A single field: setting one state replaces
/// the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PizzaState {
    #[default]
    None,
    Prepared,
    Baked,
    Cut,
    Boxed,
}

impl PizzaState {
    pub fn code(&self) -> i32 {
        match self {
            PizzaState::None => 0,
            PizzaState::Prepared => 1,
            PizzaState::Baked => 2,
            PizzaState::Cut => 3,
            PizzaState::Boxed => 4,
        }
    }
}

impl TryFrom<i32> for PizzaState {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PizzaState::None),
            1 => Ok(PizzaState::Prepared),
            2 => Ok(PizzaState::Baked),
            3 => Ok(PizzaState::Cut),
            4 => Ok(PizzaState::Boxed),
            other => Err(AppError::Validation(format!("unknown pizza state {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Topping {
    pub name: String,
    pub price: i64,
}

impl Topping {
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pizza {
    base_price: i64,
    pub shape: PizzaShape,
    pub crust: PizzaCrust,
    state: PizzaState,
    toppings: BTreeSet<Topping>,
}

impl Pizza {
    pub fn new(base_price: i64) -> Self {
        Self {
            base_price,
            ..Default::default()
        }
    }

    pub fn with_shape(mut self, shape: PizzaShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_crust(mut self, crust: PizzaCrust) -> Self {
        self.crust = crust;
        self
    }

    pub fn with_state(mut self, state: PizzaState) -> Self {
        self.state = state;
        self
    }

    pub fn with_toppings(mut self, toppings: impl IntoIterator<Item = Topping>) -> Self {
        self.add_toppings(toppings);
        self
    }

    pub fn base_price(&self) -> i64 {
        self.base_price
    }

    /// Base price plus every topping currently on the pizza.
    pub fn price(&self) -> i64 {
        self.base_price + self.toppings.iter().map(|t| t.price).sum::<i64>()
    }

    pub fn toppings(&self) -> &BTreeSet<Topping> {
        &self.toppings
    }

    pub fn add_toppings(&mut self, toppings: impl IntoIterator<Item = Topping>) {
        self.toppings.extend(toppings);
    }

    pub fn remove_toppings<'a>(&mut self, toppings: impl IntoIterator<Item = &'a Topping>) {
        for topping in toppings {
            self.toppings.remove(topping);
        }
    }

    pub fn remove_all_toppings(&mut self) {
        self.toppings.clear();
    }

    pub fn has_topping(&self, topping: &Topping) -> bool {
        self.toppings.contains(topping)
    }

    pub fn state(&self) -> PizzaState {
        self.state
    }

    pub fn prepare(&mut self) {
        self.state = PizzaState::Prepared;
    }

    pub fn bake(&mut self) {
        self.state = PizzaState::Baked;
    }

    pub fn cut(&mut self) {
        self.state = PizzaState::Cut;
    }

    pub fn boxed(&mut self) {
        self.state = PizzaState::Boxed;
    }

    pub fn is_prepared(&self) -> bool {
        self.state == PizzaState::Prepared
    }

    pub fn is_baked(&self) -> bool {
        self.state == PizzaState::Baked
    }

    pub fn is_cut(&self) -> bool {
        self.state == PizzaState::Cut
    }

    pub fn is_boxed(&self) -> bool {
        self.state == PizzaState::Boxed
    }

    /// Boxing is the last kitchen step, so a boxed pizza is finished.
    pub fn is_finished(&self) -> bool {
        self.is_boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    price: i64,
    ounces: u32,
    ounces_left: u32,
    drank: bool,
}

impl Drink {
    pub fn new(price: i64, ounces: u32) -> Self {
        Self {
            price,
            ounces,
            ounces_left: ounces,
            drank: false,
        }
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn ounces(&self) -> u32 {
        self.ounces
    }

    pub fn ounces_left(&self) -> u32 {
        self.ounces_left
    }

    pub fn is_drank(&self) -> bool {
        self.drank
    }

    /// Drinks `amount` ounces, or everything that is left when `None`.
    pub fn drink(&mut self, amount: Option<u32>) {
        self.ounces_left = match amount {
            Some(amount) => self.ounces_left.saturating_sub(amount),
            None => 0,
        };
        if self.ounces_left == 0 {
            self.drank = true;
        }
    }

    /// Refills by `amount` (capped at capacity), or to the top when `None`.
    pub fn refill(&mut self, amount: Option<u32>) {
        self.ounces_left = match amount {
            Some(amount) => self.ounces_left.saturating_add(amount).min(self.ounces),
            None => self.ounces,
        };
        self.drank = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadstick {
    price: i64,
    count: u32,
    sauce: Option<String>,
}

impl Breadstick {
    pub fn new(price: i64, count: u32) -> Self {
        Self {
            price,
            count,
            sauce: None,
        }
    }

    pub fn with_sauce(mut self, sauce: impl Into<String>) -> Self {
        self.sauce = Some(sauce.into());
        self
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn add_breadsticks(&mut self, amount: Option<u32>) {
        self.count = self.count.saturating_add(amount.unwrap_or(1));
    }

    /// No-op when asked to eat more sticks than there are.
    pub fn eat_breadsticks(&mut self, amount: Option<u32>) {
        let amount = amount.unwrap_or(1);
        if amount <= self.count {
            self.count -= amount;
        }
    }

    pub fn sauce(&self) -> Option<&str> {
        self.sauce.as_deref()
    }

    pub fn add_sauce(&mut self, sauce: impl Into<String>) {
        self.sauce = Some(sauce.into());
    }

    pub fn remove_sauce(&mut self) {
        self.sauce = None;
    }

    pub fn has_sauce(&self) -> bool {
        self.sauce.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ItemKind {
    Pizza(Pizza),
    Drink(Drink),
    Breadstick(Breadstick),
}

/// Anything a customer can put in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: String,
    purchased: u32,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            purchased: 0,
            kind,
        }
    }

    pub fn pizza(name: impl Into<String>, pizza: Pizza) -> Self {
        Self::new(name, "", ItemKind::Pizza(pizza))
    }

    pub fn drink(name: impl Into<String>, drink: Drink) -> Self {
        Self::new(name, "", ItemKind::Drink(drink))
    }

    pub fn breadstick(name: impl Into<String>, breadstick: Breadstick) -> Self {
        Self::new(name, "", ItemKind::Breadstick(breadstick))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(&self) -> ItemCategory {
        match self.kind {
            ItemKind::Pizza(_) => ItemCategory::Pizza,
            ItemKind::Drink(_) => ItemCategory::Drink,
            ItemKind::Breadstick(_) => ItemCategory::Breadstick,
        }
    }

    pub fn price(&self) -> i64 {
        match &self.kind {
            ItemKind::Pizza(pizza) => pizza.price(),
            ItemKind::Drink(drink) => drink.price(),
            ItemKind::Breadstick(breadstick) => breadstick.price(),
        }
    }

    pub fn purchased(&self) -> u32 {
        self.purchased
    }

    /// Records `count` (default 1) purchases and returns what they cost.
    pub fn purchase(&mut self, count: Option<u32>) -> i64 {
        let count = count.unwrap_or(1);
        self.purchased = self.purchased.saturating_add(count);
        self.price().saturating_mul(i64::from(count))
    }

    /// Takes back `count` (default 1) purchases and returns the refund, or 0
    /// when fewer than `count` were purchased.
    pub fn remove(&mut self, count: Option<u32>) -> i64 {
        let count = count.unwrap_or(1);
        if count > self.purchased {
            return 0;
        }
        self.purchased -= count;
        self.price() * i64::from(count)
    }

    pub fn as_pizza(&self) -> Option<&Pizza> {
        match &self.kind {
            ItemKind::Pizza(pizza) => Some(pizza),
            _ => None,
        }
    }

    pub fn as_pizza_mut(&mut self) -> Option<&mut Pizza> {
        match &mut self.kind {
            ItemKind::Pizza(pizza) => Some(pizza),
            _ => None,
        }
    }

    pub fn as_drink(&self) -> Option<&Drink> {
        match &self.kind {
            ItemKind::Drink(drink) => Some(drink),
            _ => None,
        }
    }

    pub fn as_drink_mut(&mut self) -> Option<&mut Drink> {
        match &mut self.kind {
            ItemKind::Drink(drink) => Some(drink),
            _ => None,
        }
    }

    pub fn as_breadstick(&self) -> Option<&Breadstick> {
        match &self.kind {
            ItemKind::Breadstick(breadstick) => Some(breadstick),
            _ => None,
        }
    }

    pub fn as_breadstick_mut(&mut self) -> Option<&mut Breadstick> {
        match &mut self.kind {
            ItemKind::Breadstick(breadstick) => Some(breadstick),
            _ => None,
        }
    }
}
