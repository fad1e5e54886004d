//! Request-authorization predicates.
//!
//! Each protected operation is gated by one or more of these checks,
//! evaluated against the authenticated caller and the already-loaded
//! target rows. All predicates are pure and fail closed: when no
//! condition matches, access is denied.

use model::entities::{buyer, seller, user};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

/// The caller's role classification, resolved seller-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Seller(i32),
    Buyer(i32),
    None,
}

impl SessionRole {
    pub fn status(&self) -> Option<&'static str> {
        match self {
            SessionRole::Seller(_) => Some("seller"),
            SessionRole::Buyer(_) => Some("buyer"),
            SessionRole::None => None,
        }
    }

    pub fn account_id(&self) -> Option<i32> {
        match self {
            SessionRole::Seller(id) | SessionRole::Buyer(id) => Some(*id),
            SessionRole::None => None,
        }
    }
}

/// Classify a user as seller, buyer, or neither. A user holding both
/// profiles classifies as a seller, matching the login contract.
pub async fn resolve_role(db: &DatabaseConnection, user_id: i32) -> Result<SessionRole, DbErr> {
    if let Some(seller) = find_seller_for(db, user_id).await? {
        return Ok(SessionRole::Seller(seller.id));
    }
    if let Some(buyer) = find_buyer_for(db, user_id).await? {
        return Ok(SessionRole::Buyer(buyer.id));
    }
    Ok(SessionRole::None)
}

/// The seller profile backed by this user, if any. Used as the role gate
/// for item creation.
pub async fn find_seller_for(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<seller::Model>, DbErr> {
    seller::Entity::find()
        .filter(seller::Column::ProfileId.eq(user_id))
        .one(db)
        .await
}

/// The buyer profile backed by this user, if any. Used as the role gate
/// for order submission.
pub async fn find_buyer_for(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<buyer::Model>, DbErr> {
    buyer::Entity::find()
        .filter(buyer::Column::ProfileId.eq(user_id))
        .one(db)
        .await
}

/// The caller owns the profile backing this resource (seller or buyer
/// self-service).
pub fn is_account_owner(caller: &user::Model, profile_user_id: i32) -> bool {
    caller.id == profile_user_id
}

/// The caller is the seller who owns the item.
pub fn is_item_seller(caller: &user::Model, item_seller: &seller::Model) -> bool {
    caller.id == item_seller.profile_id
}

/// The caller is the recipient seller of the order's payment transaction.
pub fn is_order_recipient(caller: &user::Model, recipient: &seller::Model) -> bool {
    caller.id == recipient.profile_id
}

/// The caller is the payer buyer of the order's payment transaction.
/// A nullified payer never matches.
pub fn is_order_payer(caller: &user::Model, payer: Option<&buyer::Model>) -> bool {
    payer.is_some_and(|buyer| caller.id == buyer.profile_id)
}
