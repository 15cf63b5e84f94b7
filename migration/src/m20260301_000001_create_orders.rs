use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Every statement is IF NOT EXISTS so an existing ledger file is adopted as-is
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
                    // ISO-8601 UTC text, fixed width so it sorts chronologically
                    .col(ColumnDef::new(Orders::Timestamp).text().not_null())
                    .col(ColumnDef::new(Orders::UserId).text().not_null())
                    .col(ColumnDef::new(Orders::Status).text().not_null())
                    // JSON object
                    .col(ColumnDef::new(Orders::Metadata).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_timestamp")
                    .table(Orders::Table)
                    .col(Orders::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    Timestamp,
    UserId,
    Status,
    Metadata,
}
