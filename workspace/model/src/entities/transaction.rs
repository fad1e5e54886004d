use sea_orm::entity::prelude::*;

/// Supported payment channels. Only mobile money for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(100))")]
pub enum TransactionMode {
    #[sea_orm(string_value = "m-pesa")]
    Mpesa,
}

/// A payment record between a payer (buyer) and a recipient (seller).
/// The payer is nulled out if the buyer account is deleted; the record
/// disappears with its recipient seller.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub transaction_mode: TransactionMode,
    pub amount: f64,
    /// The code reported by the external payment channel. Trusted as
    /// submitted; there is no gateway verification.
    pub transaction_code: String,
    pub recipient_id: i32,
    pub payer_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seller::Entity",
        from = "Column::RecipientId",
        to = "super::seller::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
    #[sea_orm(
        belongs_to = "super::buyer::Entity",
        from = "Column::PayerId",
        to = "super::buyer::Column::Id",
        on_delete = "SetNull"
    )]
    Payer,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl Related<super::buyer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
