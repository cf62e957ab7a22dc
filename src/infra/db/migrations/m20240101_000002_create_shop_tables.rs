//! Migration: products, orders and the order ↔ product link table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Products::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Products::Price).double().not_null().default(0.0))
                    .col(ColumnDef::new(Products::Discount).small_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Archived).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::DeliveryAddress).text().not_null().default(""))
                    .col(ColumnDef::new(Orders::Promocode).string_len(20).not_null().default(""))
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user_id")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-user export reads a user's orders newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id_created_at")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderProducts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrderProducts::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderProducts::ProductId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(OrderProducts::OrderId)
                            .col(OrderProducts::ProductId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_products_order_id")
                            .from(OrderProducts::Table, OrderProducts::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_products_product_id")
                            .from(OrderProducts::Table, OrderProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderProducts::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_orders_user_id_created_at")
                    .table(Orders::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    Discount,
    CreatedAt,
    Archived,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    DeliveryAddress,
    Promocode,
    CreatedAt,
    UserId,
}

#[derive(Iden)]
enum OrderProducts {
    Table,
    OrderId,
    ProductId,
}
