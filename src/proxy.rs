use crate::{
    error::AppResult,
    mappers::{AddOutcome, ItemMapper, LoginMapper, Mapper, MenuMapper, OrderMapper},
    middleware::auth::{Actor, require_capability},
    models::{Capability, Item, Menu, Order, UserLogin},
};

/// Guards one mapper with the capabilities in its [`Mapper::POLICY`].
/// A denied call returns `AppError::Unauthorized` and never reaches the
/// mapper.
pub struct AccessProxy<M> {
    mapper: M,
    actor: Actor,
}

impl<M: Mapper> AccessProxy<M> {
    pub fn new(mapper: M, actor: Actor) -> Self {
        Self { mapper, actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Switches who the following calls are made on behalf of.
    pub fn set_actor(&mut self, actor: Actor) {
        self.actor = actor;
    }

    pub async fn add(&self, entity: &M::Entity) -> AppResult<AddOutcome> {
        require_capability(&self.actor, M::POLICY.add)?;
        self.mapper.add(entity).await
    }

    pub async fn edit(&self, entity: &M::Entity, patch: M::Patch) -> AppResult<bool> {
        require_capability(&self.actor, M::POLICY.modify)?;
        self.mapper.edit(entity, patch).await
    }

    pub async fn remove(&self, entity: &M::Entity) -> AppResult<bool> {
        require_capability(&self.actor, M::POLICY.modify)?;
        self.mapper.remove(entity).await
    }

    pub async fn get(&self, entity: &M::Entity) -> AppResult<Option<M::Entity>> {
        self.mapper.get(entity).await
    }

    pub async fn get_current(&self) -> AppResult<Vec<M::Entity>> {
        if let Some(capability) = M::POLICY.list {
            require_capability(&self.actor, capability)?;
        }
        self.mapper.get_current().await
    }
}

impl AccessProxy<ItemMapper> {
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        self.mapper.find_by_name(name).await
    }
}

impl AccessProxy<OrderMapper> {
    pub async fn find_by_number(&self, number: i64) -> AppResult<Option<Order>> {
        self.mapper.find_by_number(number).await
    }
}

impl AccessProxy<MenuMapper> {
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Menu>> {
        self.mapper.find_by_name(name).await
    }
}

impl AccessProxy<LoginMapper> {
    /// Logins with an open session. Same privilege as listing every login.
    pub async fn current_logins(&self) -> AppResult<Vec<UserLogin>> {
        require_capability(&self.actor, Capability::ViewPrivileged)?;
        self.mapper.current_logins().await
    }
}
