use sea_orm::entity::prelude::*;

/// Bridge between a pizza and the toppings on it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pizza_toppings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pizza_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub topping_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pizzas::Entity",
        from = "Column::PizzaId",
        to = "super::pizzas::Column::PizzaId",
        on_delete = "Cascade"
    )]
    Pizzas,
    #[sea_orm(
        belongs_to = "super::toppings::Entity",
        from = "Column::ToppingId",
        to = "super::toppings::Column::ToppingId",
        on_delete = "Cascade"
    )]
    Toppings,
}

impl Related<super::pizzas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pizzas.def()
    }
}

impl Related<super::toppings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Toppings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
