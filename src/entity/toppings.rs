use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "toppings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub topping_id: i32,
    #[sea_orm(unique)]
    pub topping_name: String,
    pub topping_price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pizza_toppings::Entity")]
    PizzaToppings,
}

impl Related<super::pizza_toppings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PizzaToppings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
