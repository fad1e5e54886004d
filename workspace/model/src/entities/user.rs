use sea_orm::entity::prelude::*;

/// A login identity. Seller and buyer profiles both hang off this table
/// one-to-one; the password is stored as a bcrypt hash.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::seller::Entity")]
    Seller,
    #[sea_orm(has_one = "super::buyer::Entity")]
    Buyer,
    #[sea_orm(has_one = "super::auth_token::Entity")]
    AuthToken,
}

impl ActiveModelBehavior for ActiveModel {}
