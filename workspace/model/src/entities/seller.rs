use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A registered construction-material seller. Extends a user one-to-one
/// with the business identity and physical address. The business fields
/// (name, registration number and document, subcounty, registration date)
/// are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sellers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The backing user account. Exactly one seller per user.
    #[sea_orm(unique)]
    pub profile_id: i32,
    pub business_name: String,
    pub business_reg_no: String,
    pub phone_number: String,
    pub sub_county_id: i32,
    pub town: String,
    pub local_area_name: String,
    pub street: String,
    pub building: String,
    /// Path to the uploaded registration document image.
    pub business_reg_doc: String,
    pub profile_pic: String,
    pub registration_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ProfileId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::subcounty::Entity",
        from = "Column::SubCountyId",
        to = "super::subcounty::Column::Id",
        on_delete = "Restrict"
    )]
    SubCounty,
    #[sea_orm(has_many = "super::item::Entity")]
    Item,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::subcounty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCounty.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
