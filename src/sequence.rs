use std::sync::{Mutex, PoisonError};

use crate::{db::DbPool, error::AppResult};

#[derive(Debug)]
struct Counters {
    next_order: i64,
    next_payment: i64,
}

/// Issues order and payment numbers. Both counters live behind one mutex so
/// reading and bumping a counter is a single step.
#[derive(Debug)]
pub struct Sequences {
    counters: Mutex<Counters>,
}

impl Default for Sequences {
    fn default() -> Self {
        Self::starting_at(1, 1)
    }
}

impl Sequences {
    pub fn starting_at(next_order: i64, next_payment: i64) -> Self {
        Self {
            counters: Mutex::new(Counters {
                next_order,
                next_payment,
            }),
        }
    }

    /// Continues numbering after the highest numbers already stored.
    pub async fn from_storage(pool: &DbPool) -> AppResult<Self> {
        let (max_order,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(order_number), 0) FROM orders")
                .fetch_one(pool)
                .await?;
        let (max_payment,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(payment_number), 0) FROM payments")
                .fetch_one(pool)
                .await?;

        tracing::debug!(max_order, max_payment, "sequences loaded from storage");
        Ok(Self::starting_at(max_order + 1, max_payment + 1))
    }

    pub fn next_order_number(&self) -> i64 {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let number = counters.next_order;
        counters.next_order += 1;
        number
    }

    pub fn next_payment_number(&self) -> i64 {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let number = counters.next_payment;
        counters.next_payment += 1;
        number
    }

    /// The number the next submitted order will receive.
    pub fn peek_order_number(&self) -> i64 {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_order
    }
}
