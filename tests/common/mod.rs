#![allow(dead_code)]

use pizza_store::{
    db::{create_pool, run_migrations},
    middleware::auth::Actor,
    models::Role,
    state::AppState,
};

/// Fresh store backed by a private in-memory database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let pool = create_pool("sqlite::memory:", 1).await?;
    run_migrations(&pool).await?;
    Ok(AppState::new(pool).await?)
}

pub fn admin() -> Actor {
    Actor::new("admin", "Devon King", Role::Administrator)
}

pub fn desk_worker() -> Actor {
    Actor::new("desk", "Casey Moss", Role::DeskWorker)
}

pub fn baker() -> Actor {
    Actor::new("baker", "Jordan King", Role::Baker)
}

pub fn driver() -> Actor {
    Actor::new("driver", "Riley Park", Role::Driver)
}

pub fn customer() -> Actor {
    Actor::new("sam", "Sam Hill", Role::Customer)
}
