use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RepairRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RepairRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RepairRequests::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RepairRequests::TechnicianId).big_integer())
                    .col(ColumnDef::new(RepairRequests::Description).text().not_null())
                    .col(ColumnDef::new(RepairRequests::Location).string())
                    .col(ColumnDef::new(RepairRequests::ImageUrl).text())
                    .col(
                        ColumnDef::new(RepairRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(RepairRequests::Priority)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(RepairRequests::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(RepairRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RepairRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RepairRequests::Table, RepairRequests::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RepairRequests::Table, RepairRequests::TechnicianId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RepairRequests::Table)
                    .col(RepairRequests::Status)
                    .name("idx_repair_requests_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RepairRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RepairRequests {
    Table,
    Id,
    UserId,
    TechnicianId,
    Description,
    Location,
    ImageUrl,
    Status,
    Priority,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
