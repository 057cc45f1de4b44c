pub mod cart;
pub mod item;
pub mod menu;
pub mod order;
pub mod payment;
pub mod user;

pub use cart::ShoppingCart;
pub use item::{Breadstick, Drink, Item, ItemCategory, ItemKind, Pizza, PizzaCrust, PizzaShape, PizzaState, Topping};
pub use menu::Menu;
pub use order::{Order, OrderBuilder, OrderStatus, OrderTransition};
pub use payment::{CardInfo, Payment, PaymentBuilder, PaymentFactory, PaymentLocation, PaymentMethod, PaymentType};
pub use user::{Capability, Customer, Employee, EmployeeRole, Role, UserLogin, UserType};
