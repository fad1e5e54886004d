use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create counties table
        manager
            .create_table(
                Table::create()
                    .table(Counties::Table)
                    .if_not_exists()
                    .col(pk_auto(Counties::Id))
                    .col(string(Counties::CountyName))
                    .col(integer(Counties::Code))
                    .to_owned(),
            )
            .await?;

        // Create subcounties table
        manager
            .create_table(
                Table::create()
                    .table(Subcounties::Table)
                    .if_not_exists()
                    .col(pk_auto(Subcounties::Id))
                    .col(string(Subcounties::SubcountyName))
                    .col(integer(Subcounties::CountyId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subcounty_county")
                            .from(Subcounties::Table, Subcounties::CountyId)
                            .to(Counties::Table, Counties::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        // Create auth_tokens table
        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(string_len(AuthTokens::Key, 40).primary_key())
                    .col(integer(AuthTokens::UserId).unique_key())
                    .col(timestamp_with_time_zone(AuthTokens::Created))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auth_token_user")
                            .from(AuthTokens::Table, AuthTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sellers table
        manager
            .create_table(
                Table::create()
                    .table(Sellers::Table)
                    .if_not_exists()
                    .col(pk_auto(Sellers::Id))
                    .col(integer(Sellers::ProfileId).unique_key())
                    .col(string(Sellers::BusinessName))
                    .col(string(Sellers::BusinessRegNo))
                    .col(string_len(Sellers::PhoneNumber, 15))
                    .col(integer(Sellers::SubCountyId))
                    .col(string(Sellers::Town))
                    .col(string(Sellers::LocalAreaName))
                    .col(string(Sellers::Street))
                    .col(string(Sellers::Building))
                    .col(string(Sellers::BusinessRegDoc))
                    .col(string(Sellers::ProfilePic))
                    .col(timestamp_with_time_zone(Sellers::RegistrationDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seller_profile")
                            .from(Sellers::Table, Sellers::ProfileId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seller_subcounty")
                            .from(Sellers::Table, Sellers::SubCountyId)
                            .to(Subcounties::Table, Subcounties::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create buyers table
        manager
            .create_table(
                Table::create()
                    .table(Buyers::Table)
                    .if_not_exists()
                    .col(pk_auto(Buyers::Id))
                    .col(integer(Buyers::ProfileId).unique_key())
                    .col(string_len(Buyers::PhoneNumber, 15))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_buyer_profile")
                            .from(Buyers::Table, Buyers::ProfileId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create items table
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(pk_auto(Items::Id))
                    .col(string(Items::ItemName))
                    .col(text_null(Items::ItemDescription))
                    .col(integer(Items::ItemSellerId))
                    .col(double(Items::ItemPrice))
                    .col(string(Items::ItemMeasurementUnit))
                    .col(string(Items::ItemMainImage))
                    .col(string_null(Items::ItemExtraImage1))
                    .col(string_null(Items::ItemExtraImage2))
                    .col(string_null(Items::ItemExtraImage3))
                    .col(string_null(Items::ItemExtraImage4))
                    .col(string_len(Items::Category, 50).default("others"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_seller")
                            .from(Items::Table, Items::ItemSellerId)
                            .to(Sellers::Table, Sellers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create transactions table
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(string_len(Transactions::TransactionMode, 100))
                    .col(double(Transactions::Amount))
                    .col(string(Transactions::TransactionCode))
                    .col(integer(Transactions::RecipientId))
                    .col(integer_null(Transactions::PayerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_recipient")
                            .from(Transactions::Table, Transactions::RecipientId)
                            .to(Sellers::Table, Sellers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_payer")
                            .from(Transactions::Table, Transactions::PayerId)
                            .to(Buyers::Table, Buyers::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create orders table
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_auto(Orders::Id))
                    .col(timestamp_with_time_zone(Orders::DatePlaced))
                    .col(double(Orders::TotalAmountPayable))
                    .col(boolean(Orders::IsDelivered).default(false))
                    .col(timestamp_with_time_zone_null(Orders::DateDelivered))
                    .col(integer_null(Orders::PaymentTransactionId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_transaction")
                            .from(Orders::Table, Orders::PaymentTransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create order_items table (join table)
        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(integer(OrderItems::OrderId))
                    .col(integer(OrderItems::ItemId))
                    .primary_key(
                        Index::create()
                            .name("pk_order_items")
                            .col(OrderItems::OrderId)
                            .col(OrderItems::ItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_item")
                            .from(OrderItems::Table, OrderItems::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Buyers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sellers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subcounties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Counties::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Counties {
    Table,
    Id,
    CountyName,
    Code,
}

#[derive(DeriveIden)]
enum Subcounties {
    Table,
    Id,
    SubcountyName,
    CountyId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsActive,
}

#[derive(DeriveIden)]
enum AuthTokens {
    Table,
    Key,
    UserId,
    Created,
}

#[derive(DeriveIden)]
enum Sellers {
    Table,
    Id,
    ProfileId,
    BusinessName,
    BusinessRegNo,
    PhoneNumber,
    SubCountyId,
    Town,
    LocalAreaName,
    Street,
    Building,
    BusinessRegDoc,
    ProfilePic,
    RegistrationDate,
}

#[derive(DeriveIden)]
enum Buyers {
    Table,
    Id,
    ProfileId,
    PhoneNumber,
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    ItemName,
    ItemDescription,
    ItemSellerId,
    ItemPrice,
    ItemMeasurementUnit,
    ItemMainImage,
    ItemExtraImage1,
    ItemExtraImage2,
    ItemExtraImage3,
    ItemExtraImage4,
    Category,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    TransactionMode,
    Amount,
    TransactionCode,
    RecipientId,
    PayerId,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    DatePlaced,
    TotalAmountPayable,
    IsDelivered,
    DateDelivered,
    PaymentTransactionId,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    OrderId,
    ItemId,
}
