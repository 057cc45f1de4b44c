use std::sync::Arc;

use crate::{
    db::{DbPool, OrmConn, create_orm_conn},
    error::AppResult,
    sequence::Sequences,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub sequences: Arc<Sequences>,
}

impl AppState {
    /// Builds the state over a migrated pool, continuing order and payment
    /// numbering from what is already stored.
    pub async fn new(pool: DbPool) -> AppResult<Self> {
        let sequences = Sequences::from_storage(&pool).await?;
        Ok(Self {
            orm: create_orm_conn(&pool),
            pool,
            sequences: Arc::new(sequences),
        })
    }
}
