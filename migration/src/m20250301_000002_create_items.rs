use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum Items {
    Table,
    Id,
    Name,
    Description,
    Price,
    Available,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Items::Description).text().null())
                    // cents
                    .col(ColumnDef::new(Items::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Items::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Items::Table).to_owned())
            .await?;
        Ok(())
    }
}
