use sea_orm::entity::prelude::*;

/// Base row shared by every purchasable item; `item_type` names the subtype
/// table holding the rest.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub item_type: String,
    pub description: String,
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::pizzas::Entity")]
    Pizzas,
    #[sea_orm(has_one = "super::drinks::Entity")]
    Drinks,
    #[sea_orm(has_one = "super::breadsticks::Entity")]
    Breadsticks,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::pizzas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pizzas.def()
    }
}

impl Related<super::drinks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Drinks.def()
    }
}

impl Related<super::breadsticks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Breadsticks.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
