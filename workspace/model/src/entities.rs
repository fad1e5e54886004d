//! This file serves as the root for all SeaORM entity modules.
//! The data model for the marketplace lives here: geography reference
//! data, login identities, seller/buyer profiles, the item catalog, and
//! order/payment records.

pub mod auth_token;
pub mod buyer;
pub mod county;
pub mod item;
pub mod order;
pub mod order_item;
pub mod seller;
pub mod subcounty;
pub mod transaction;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::auth_token::Entity as AuthToken;
    pub use super::buyer::Entity as Buyer;
    pub use super::county::Entity as County;
    pub use super::item::Entity as Item;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::seller::Entity as Seller;
    pub use super::subcounty::Entity as SubCounty;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn create_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set("hash".to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Geography reference data
        let county = county::ActiveModel {
            county_name: Set("Nairobi".to_string()),
            code: Set(47),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let subcounty = subcounty::ActiveModel {
            subcounty_name: Set("Westlands".to_string()),
            county_id: Set(county.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Identities and profiles
        let seller_user = create_user(&db, "hardware_hank").await?;
        let buyer_user = create_user(&db, "site_foreman").await?;

        let seller = seller::ActiveModel {
            profile_id: Set(seller_user.id),
            business_name: Set("Hank Hardware".to_string()),
            business_reg_no: Set("BN-001".to_string()),
            phone_number: Set("0712000001".to_string()),
            sub_county_id: Set(subcounty.id),
            town: Set("Nairobi".to_string()),
            local_area_name: Set("Westlands".to_string()),
            street: Set("Waiyaki Way".to_string()),
            building: Set("Pamstech House".to_string()),
            business_reg_doc: Set("images/profile/profile.jpg".to_string()),
            profile_pic: Set("images/profile/profile.jpg".to_string()),
            registration_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let buyer = buyer::ActiveModel {
            profile_id: Set(buyer_user.id),
            phone_number: Set("0712000002".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Catalog
        let item = item::ActiveModel {
            item_name: Set("Portland cement 50kg".to_string()),
            item_description: Set(Some("Standard grade".to_string())),
            item_seller_id: Set(seller.id),
            item_price: Set(750.0),
            item_measurement_unit: Set("bag".to_string()),
            item_main_image: Set("images/product/main.jpg".to_string()),
            category: Set(item::ItemCategory::Cement),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Order and payment
        let tx = transaction::ActiveModel {
            transaction_mode: Set(transaction::TransactionMode::Mpesa),
            amount: Set(750.0),
            transaction_code: Set("QX12AB34".to_string()),
            recipient_id: Set(seller.id),
            payer_id: Set(Some(buyer.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let order = order::ActiveModel {
            date_placed: Set(Utc::now()),
            total_amount_payable: Set(750.0),
            is_delivered: Set(false),
            date_delivered: Set(None),
            payment_transaction_id: Set(Some(tx.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        order_item::ActiveModel {
            order_id: Set(order.id),
            item_id: Set(item.id),
        }
        .insert(&db)
        .await?;

        // Read back over the relations
        let found_items = item::Entity::find()
            .filter(item::Column::ItemSellerId.eq(seller.id))
            .all(&db)
            .await?;
        assert_eq!(found_items.len(), 1);
        assert_eq!(found_items[0].category, item::ItemCategory::Cement);

        let order_items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&db)
            .await?;
        assert_eq!(order_items.len(), 1);
        assert_eq!(order_items[0].item_id, item.id);

        let seller_subcounty = seller.find_related(SubCounty).one(&db).await?.unwrap();
        assert_eq!(seller_subcounty.id, subcounty.id);

        // Deleting a county with subcounties is rejected
        let restricted = County::delete_by_id(county.id).exec(&db).await;
        assert!(restricted.is_err());

        // Deleting the buyer nulls out the transaction payer
        Buyer::delete_by_id(buyer.id).exec(&db).await?;
        let tx = Transaction::find_by_id(tx.id).one(&db).await?.unwrap();
        assert_eq!(tx.payer_id, None);

        // Deleting the transaction nulls out the order link
        Transaction::delete_by_id(tx.id).exec(&db).await?;
        let order = Order::find_by_id(order.id).one(&db).await?.unwrap();
        assert_eq!(order.payment_transaction_id, None);

        // Deleting the seller's user cascades through seller and items
        User::delete_by_id(seller_user.id).exec(&db).await?;
        assert!(Seller::find_by_id(seller.id).one(&db).await?.is_none());
        assert!(Item::find_by_id(item.id).one(&db).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_username_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;
        create_user(&db, "duplicate_me").await?;
        assert!(create_user(&db, "duplicate_me").await.is_err());
        Ok(())
    }
}
