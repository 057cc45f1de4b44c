pub mod breadsticks;
pub mod customers;
pub mod drinks;
pub mod employees;
pub mod items;
pub mod menu_items;
pub mod menus;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod pizza_toppings;
pub mod pizzas;
pub mod toppings;
pub mod user_login;

pub use breadsticks::Entity as Breadsticks;
pub use customers::Entity as Customers;
pub use drinks::Entity as Drinks;
pub use employees::Entity as Employees;
pub use items::Entity as Items;
pub use menu_items::Entity as MenuItems;
pub use menus::Entity as Menus;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use pizza_toppings::Entity as PizzaToppings;
pub use pizzas::Entity as Pizzas;
pub use toppings::Entity as Toppings;
pub use user_login::Entity as UserLogin;
