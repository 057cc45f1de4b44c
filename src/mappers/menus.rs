use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    db::OrmConn,
    entity::{
        items::{self, Entity as Items},
        menu_items::{self, Entity as MenuItems},
        menus::{self, Entity as Menus},
    },
    error::{AppResult, is_unique_violation},
    mappers::{AccessPolicy, AddOutcome, Mapper},
    models::Menu,
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct MenuPatch {
    pub description: Option<String>,
    /// `Some(None)` detaches the menu from its parent.
    pub parent: Option<Option<String>>,
    pub add_items: Vec<String>,
}

#[derive(Clone)]
pub struct MenuMapper {
    db: OrmConn,
}

impl MenuMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
        }
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Menu>> {
        match find_menu_row(&self.db, name).await? {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn hydrate(&self, row: menus::Model) -> AppResult<Menu> {
        let mut menu = Menu::new(row.menu_name, row.description);
        if let Some(parent_id) = row.parent_id {
            if let Some(parent) = Menus::find_by_id(parent_id).one(&self.db).await? {
                menu = menu.with_parent(parent.menu_name);
            }
        }

        let item_ids: Vec<i32> = MenuItems::find()
            .filter(menu_items::Column::MenuId.eq(row.menu_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.item_id)
            .collect();
        if !item_ids.is_empty() {
            let names = Items::find()
                .filter(items::Column::ItemId.is_in(item_ids))
                .order_by_asc(items::Column::ItemId)
                .all(&self.db)
                .await?;
            for item in names {
                menu.add_item(item.name);
            }
        }
        Ok(menu)
    }
}

async fn find_menu_row<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<Option<menus::Model>> {
    Ok(Menus::find()
        .filter(menus::Column::MenuName.eq(name))
        .one(conn)
        .await?)
}

/// Links the named catalog items to a menu. Names the catalog does not know
/// are skipped, as are items already on the menu.
async fn link_items<C: ConnectionTrait>(conn: &C, menu_id: i32, names: &[String]) -> AppResult<()> {
    if names.is_empty() {
        return Ok(());
    }
    let found = Items::find()
        .filter(items::Column::Name.is_in(names.iter().map(String::as_str)))
        .all(conn)
        .await?;
    if found.len() < names.len() {
        tracing::warn!(menu_id, requested = names.len(), found = found.len(), "some menu items are not in the catalog");
    }

    for item in found {
        let res = MenuItems::insert(menu_items::ActiveModel {
            menu_id: Set(menu_id),
            item_id: Set(item.item_id),
        })
        .exec_without_returning(conn)
        .await;
        match res {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[async_trait]
impl Mapper for MenuMapper {
    type Entity = Menu;
    type Patch = MenuPatch;

    const POLICY: AccessPolicy = AccessPolicy::CATALOG;

    async fn add(&self, menu: &Menu) -> AppResult<AddOutcome> {
        let txn = self.db.begin().await?;
        let parent_id = match &menu.parent {
            Some(parent) => find_menu_row(&txn, parent).await?.map(|row| row.menu_id),
            None => None,
        };

        let res = Menus::insert(menus::ActiveModel {
            menu_id: NotSet,
            parent_id: Set(parent_id),
            menu_name: Set(menu.name.clone()),
            description: Set(menu.description.clone()),
        })
        .exec(&txn)
        .await;
        let menu_id = match res {
            Ok(res) => res.last_insert_id,
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                tracing::warn!(menu = %menu.name, "menu already stored");
                return Ok(AddOutcome::Conflict);
            }
            Err(err) => return Err(err.into()),
        };

        link_items(&txn, menu_id, &menu.items).await?;
        txn.commit().await?;
        Ok(AddOutcome::Added(menu_id))
    }

    async fn edit(&self, menu: &Menu, patch: MenuPatch) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        let Some(row) = find_menu_row(&txn, &menu.name).await? else {
            return Ok(false);
        };
        let menu_id = row.menu_id;

        let mut active: menus::ActiveModel = row.into();
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(parent) = patch.parent {
            let parent_id = match parent {
                Some(name) => find_menu_row(&txn, &name).await?.map(|row| row.menu_id),
                None => None,
            };
            active.parent_id = Set(parent_id);
        }
        if active.is_changed() {
            active.update(&txn).await?;
        }

        link_items(&txn, menu_id, &patch.add_items).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn remove(&self, menu: &Menu) -> AppResult<bool> {
        let res = Menus::delete_many()
            .filter(menus::Column::MenuName.eq(menu.name.as_str()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, menu: &Menu) -> AppResult<Option<Menu>> {
        self.find_by_name(&menu.name).await
    }

    async fn get_current(&self) -> AppResult<Vec<Menu>> {
        let rows = Menus::find()
            .order_by_asc(menus::Column::MenuId)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.hydrate(row).await?);
        }
        Ok(out)
    }
}
