use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{cart::ShoppingCart, item::Item, payment::Payment, user::Capability},
    sequence::Sequences,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    NotSubmitted,
    Submitted,
    Acknowledged,
    Preparing,
    Completed,
    Ready,
    OnItsWay,
}

impl OrderStatus {
    pub const OPEN: [OrderStatus; 4] = [
        OrderStatus::NotSubmitted,
        OrderStatus::Submitted,
        OrderStatus::Acknowledged,
        OrderStatus::Preparing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotSubmitted => "not_submitted",
            OrderStatus::Submitted => "submitted",
            OrderStatus::Acknowledged => "acknowledged",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Completed => "completed",
            OrderStatus::Ready => "ready",
            OrderStatus::OnItsWay => "on_its_way",
        }
    }

    /// Still being worked on by the store.
    pub fn is_open(&self) -> bool {
        *self < OrderStatus::Completed
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_submitted" => Ok(OrderStatus::NotSubmitted),
            "submitted" => Ok(OrderStatus::Submitted),
            "acknowledged" => Ok(OrderStatus::Acknowledged),
            "preparing" => Ok(OrderStatus::Preparing),
            "completed" => Ok(OrderStatus::Completed),
            "ready" => Ok(OrderStatus::Ready),
            "on_its_way" => Ok(OrderStatus::OnItsWay),
            other => Err(AppError::Validation(format!("Invalid order status '{other}'"))),
        }
    }
}

/// A step an employee takes on a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTransition {
    Acknowledge,
    Prepare,
    Finish,
    Pickup,
    Drive,
}

impl OrderTransition {
    pub fn from_status(&self) -> OrderStatus {
        match self {
            OrderTransition::Acknowledge => OrderStatus::Submitted,
            OrderTransition::Prepare => OrderStatus::Acknowledged,
            OrderTransition::Finish => OrderStatus::Preparing,
            OrderTransition::Pickup => OrderStatus::Completed,
            OrderTransition::Drive => OrderStatus::Ready,
        }
    }

    pub fn to_status(&self) -> OrderStatus {
        match self {
            OrderTransition::Acknowledge => OrderStatus::Acknowledged,
            OrderTransition::Prepare => OrderStatus::Preparing,
            OrderTransition::Finish => OrderStatus::Completed,
            OrderTransition::Pickup => OrderStatus::Ready,
            OrderTransition::Drive => OrderStatus::OnItsWay,
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            OrderTransition::Acknowledge => Capability::AcknowledgeOrder,
            OrderTransition::Prepare | OrderTransition::Finish => Capability::PrepareOrder,
            OrderTransition::Pickup | OrderTransition::Drive => Capability::DeliverOrder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    number: Option<i64>,
    customer_name: String,
    customer_email: String,
    payment: Payment,
    items: Vec<Item>,
    status: OrderStatus,
    subtotal: i64,
}

impl Order {
    /// Rebuilds an order loaded from storage. Item counters are left untouched.
    pub fn restore(
        number: i64,
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        payment: Payment,
        items: Vec<Item>,
        status: OrderStatus,
    ) -> Self {
        let subtotal = items.iter().map(Item::price).sum();
        Self {
            number: Some(number),
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            payment,
            items,
            status,
            subtotal,
        }
    }

    pub fn number(&self) -> Option<i64> {
        self.number
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn subtotal(&self) -> i64 {
        self.subtotal
    }

    /// Submits the order and returns its number. The first submit takes the
    /// next number from `sequences`; later submits keep it.
    pub fn submit(&mut self, sequences: &Sequences) -> AppResult<i64> {
        if self.status > OrderStatus::Submitted {
            return Err(AppError::Validation(format!(
                "order is already {}",
                self.status
            )));
        }

        self.subtotal = self.items.iter().map(Item::price).sum();
        self.status = OrderStatus::Submitted;
        let number = match self.number {
            Some(number) => number,
            None => {
                let number = sequences.next_order_number();
                self.number = Some(number);
                number
            }
        };

        tracing::debug!(order_number = number, subtotal = self.subtotal, "order submitted");
        Ok(number)
    }

    /// Moves the order one step forward. The order must be in the state the
    /// transition starts from.
    pub fn advance(&mut self, transition: OrderTransition) -> AppResult<OrderStatus> {
        if self.status != transition.from_status() {
            return Err(AppError::Validation(format!(
                "cannot {:?} an order that is {}",
                transition, self.status
            )));
        }
        self.status = transition.to_status();
        Ok(self.status)
    }
}

#[derive(Debug, Default)]
pub struct OrderBuilder {
    customer_name: String,
    customer_email: String,
    payment: Option<Payment>,
    items: Vec<Item>,
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.customer_name = name.into();
        self.customer_email = email.into();
        self
    }

    /// Copies what is in the cart right now; later cart changes do not reach
    /// the order.
    pub fn items(mut self, cart: &ShoppingCart) -> Self {
        self.items = cart.items().to_vec();
        self
    }

    pub fn payment(mut self, payment: Payment) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn build(self) -> AppResult<Order> {
        if self.customer_name.trim().is_empty() || self.customer_email.trim().is_empty() {
            return Err(AppError::Validation(
                "customer name and email are required".into(),
            ));
        }
        let payment = self
            .payment
            .ok_or_else(|| AppError::Validation("a payment is required".into()))?;
        if self.items.is_empty() {
            return Err(AppError::Validation(
                "an order needs at least one item".into(),
            ));
        }

        let mut items = self.items;
        let subtotal = items.iter_mut().map(|item| item.purchase(None)).sum();

        Ok(Order {
            number: None,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            payment,
            items,
            status: OrderStatus::NotSubmitted,
            subtotal,
        })
    }
}
