use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_users_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .col(pk_uuid(Room::Id))
                    .col(uuid(Room::OwnerId))
                    .col(string(Room::Name))
                    .col(string(Room::Description))
                    .col(string(Room::InviteCode))
                    .col(timestamp(Room::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-room-owner_id")
                            .from(Room::Table, Room::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Invite codes are stored uppercased; this index enforces global
        // uniqueness across rooms.
        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_invite_code_unique")
                    .table(Room::Table)
                    .col(Room::InviteCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_owner_id")
                    .table(Room::Table)
                    .col(Room::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Room::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Room {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    InviteCode,
    CreatedAt,
}
