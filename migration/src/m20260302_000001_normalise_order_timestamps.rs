use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Adopted ledgers may hold whole-second UTC timestamps
        // (`YYYY-MM-DDTHH:MM:SS+00:00`); pad them to the fixed-width
        // microsecond form so text comparison stays chronological
        manager
            .get_connection()
            .execute_unprepared(
                "UPDATE orders \
                 SET timestamp = substr(timestamp, 1, 19) || '.000000' || substr(timestamp, 20) \
                 WHERE length(timestamp) = 25 AND substr(timestamp, 20) = '+00:00'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Padding is lossless; nothing to undo
        Ok(())
    }
}
