//! Persistence mappers: each one moves a family of domain values in and out of
//! its tables. Every mapper exposes the same five operations through
//! [`Mapper`], so [`crate::proxy::AccessProxy`] can guard any of them.

use async_trait::async_trait;

use crate::{error::AppResult, models::Capability};

pub mod customers;
pub mod employees;
pub mod items;
pub mod logins;
pub mod menus;
pub mod orders;
pub mod payments;
pub mod toppings;

pub use customers::{CustomerMapper, CustomerPatch};
pub use employees::{EmployeeMapper, EmployeePatch};
pub use items::{ItemMapper, ItemPatch};
pub use logins::{LoginMapper, LoginPatch};
pub use menus::{MenuMapper, MenuPatch};
pub use orders::{OrderMapper, OrderPatch};
pub use payments::{PaymentMapper, PaymentPatch};
pub use toppings::{ToppingMapper, ToppingPatch};

/// Result of an insert. A uniqueness clash is an expected outcome, not an
/// error: nothing further is written and the caller decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(i32),
    Conflict,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            AddOutcome::Added(id) => Some(*id),
            AddOutcome::Conflict => None,
        }
    }
}

/// Capabilities a caller needs for each mapper operation. `get` is always
/// open; `list` is `None` when `get_current` is open too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub add: Capability,
    pub modify: Capability,
    pub list: Option<Capability>,
}

impl AccessPolicy {
    pub const CATALOG: AccessPolicy = AccessPolicy {
        add: Capability::ManageCatalog,
        modify: Capability::ManageCatalog,
        list: None,
    };

    pub const PRIVILEGED: AccessPolicy = AccessPolicy {
        add: Capability::ManageCatalog,
        modify: Capability::ManageCatalog,
        list: Some(Capability::ViewPrivileged),
    };
}

#[async_trait]
pub trait Mapper: Send + Sync {
    type Entity: Send + Sync;
    /// Field changes accepted by [`Mapper::edit`].
    type Patch: Send;

    const POLICY: AccessPolicy;

    async fn add(&self, entity: &Self::Entity) -> AppResult<AddOutcome>;

    /// Applies `patch` to the stored record matching `entity`. Returns false
    /// when no such record exists.
    async fn edit(&self, entity: &Self::Entity, patch: Self::Patch) -> AppResult<bool>;

    async fn remove(&self, entity: &Self::Entity) -> AppResult<bool>;

    /// Looks up the stored record matching `entity`'s natural key.
    async fn get(&self, entity: &Self::Entity) -> AppResult<Option<Self::Entity>>;

    async fn get_current(&self) -> AppResult<Vec<Self::Entity>>;
}
