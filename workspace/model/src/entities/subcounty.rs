use sea_orm::entity::prelude::*;

/// A subdivision of a county. Deleting a county with subcounties is
/// rejected (Restrict), so reference rows never disappear from under
/// registered sellers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subcounties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub subcounty_name: String,
    pub county_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::county::Entity",
        from = "Column::CountyId",
        to = "super::county::Column::Id",
        on_delete = "Restrict"
    )]
    County,
    #[sea_orm(has_many = "super::seller::Entity")]
    Seller,
}

impl Related<super::county::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::County.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
