use crate::{
    dto::items::{CreateItemRequest, ItemList, ItemView},
    error::{AppError, AppResult},
    mappers::{AddOutcome, ItemMapper},
    middleware::auth::Actor,
    proxy::AccessProxy,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_items(
    state: &AppState,
    query: Pagination,
) -> AppResult<ApiResponse<ItemList>> {
    let (page, limit, offset) = query.normalize();
    let items = AccessProxy::new(ItemMapper::new(state), Actor::anonymous())
        .get_current()
        .await?;
    let total = items.len() as i64;

    let items = items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(ItemView::from)
        .collect();

    Ok(ApiResponse::success(
        "Items",
        ItemList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_item(
    state: &AppState,
    actor: &Actor,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<ItemView>> {
    let item = payload.into_item()?;
    let items = AccessProxy::new(ItemMapper::new(state), actor.clone());

    match items.add(&item).await? {
        AddOutcome::Added(item_id) => {
            tracing::info!(item_id, name = %item.name, actor = %actor.name, "item created");
            Ok(ApiResponse::ok("Item created", ItemView::from(&item)))
        }
        AddOutcome::Conflict => Err(AppError::Conflict(format!(
            "item '{}' already exists",
            item.name
        ))),
    }
}

pub async fn delete_item(
    state: &AppState,
    actor: &Actor,
    name: &str,
) -> AppResult<ApiResponse<ItemView>> {
    let items = AccessProxy::new(ItemMapper::new(state), actor.clone());
    let item = items.find_by_name(name).await?.ok_or(AppError::NotFound)?;

    if !items.remove(&item).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(name, actor = %actor.name, "item removed");
    Ok(ApiResponse::ok("Item removed", ItemView::from(&item)))
}
