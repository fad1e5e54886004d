use sea_orm::entity::prelude::*;

/// A top-level administrative region.
/// Counties are reference data: they are either seeded or created lazily
/// when a seller registers with a county name that does not exist yet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "counties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub county_name: String,
    /// Numeric county code.
    pub code: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subcounty::Entity")]
    Subcounty,
}

impl Related<super::subcounty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcounty.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
