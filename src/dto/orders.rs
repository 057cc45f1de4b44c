use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderTransition};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// `CREDIT`, `DEBIT`, `CASH` or `CHECK`.
    pub payment_type: String,
    /// `STORE` or `ONLINE`; card payments only.
    pub location: Option<String>,
    pub card_number: Option<String>,
    pub expiration: Option<String>,
    pub csv: Option<String>,
}

/// Places an order for the signed-in customer from catalog items, listed by
/// name. Without a payment the customer's payment on file is used.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Optional; must match the signed-in customer's email when given.
    pub customer_email: Option<String>,
    pub items: Vec<String>,
    pub payment: Option<PaymentRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// `acknowledge`, `prepare`, `finish`, `pickup` or `drive`.
    #[schema(value_type = String)]
    pub transition: OrderTransition,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderView {
    pub number: Option<i64>,
    pub status: String,
    pub customer_name: String,
    pub customer_email: String,
    pub subtotal: i64,
    pub payment_number: i64,
    pub payment_type: String,
    pub items: Vec<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number(),
            status: order.status().to_string(),
            customer_name: order.customer_name().to_string(),
            customer_email: order.customer_email().to_string(),
            subtotal: order.subtotal(),
            payment_number: order.payment().number(),
            payment_type: order.payment().kind().to_string(),
            items: order.items().iter().map(|i| i.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderView>,
}
