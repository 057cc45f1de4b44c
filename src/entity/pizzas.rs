use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pizzas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub pizza_id: i32,
    #[sea_orm(unique)]
    pub item_id: i32,
    pub crust: i32,
    pub shape: i32,
    pub state: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::ItemId",
        on_delete = "Cascade"
    )]
    Items,
    #[sea_orm(has_many = "super::pizza_toppings::Entity")]
    PizzaToppings,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::pizza_toppings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PizzaToppings.def()
    }
}

impl Related<super::toppings::Entity> for Entity {
    fn to() -> RelationDef {
        super::pizza_toppings::Relation::Toppings.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::pizza_toppings::Relation::Pizzas.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
