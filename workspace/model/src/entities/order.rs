use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A buyer's request for a set of items, linked to one payment transaction.
/// `total_amount_payable` is stored as submitted, never derived from the
/// item set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date_placed: DateTime<Utc>,
    pub total_amount_payable: f64,
    #[sea_orm(default_value = "false")]
    pub is_delivered: bool,
    pub date_delivered: Option<DateTime<Utc>>,
    /// Nulled out if the transaction record is deleted.
    pub payment_transaction_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::PaymentTransactionId",
        to = "super::transaction::Column::Id",
        on_delete = "SetNull"
    )]
    Transaction,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_item::Relation::Item.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::order_item::Relation::Order.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
