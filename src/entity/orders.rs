use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub order_number: i32,
    pub order_date: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text")]
    pub delivery_address: String,
    pub customer_phone: String,
    pub customer_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_positions::Entity")]
    OrderPositions,
}

impl Related<super::order_positions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPositions.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_positions::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_positions::Relation::Orders.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
