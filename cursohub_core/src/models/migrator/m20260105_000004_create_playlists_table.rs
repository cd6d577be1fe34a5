use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000002_create_rooms_table::Room;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .col(pk_uuid(Playlist::Id))
                    .col(uuid(Playlist::RoomId))
                    .col(string(Playlist::Name))
                    .col(integer(Playlist::Position))
                    .col(timestamp(Playlist::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-playlist-room_id")
                            .from(Playlist::Table, Playlist::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlists_room_id")
                    .table(Playlist::Table)
                    .col(Playlist::RoomId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Playlist::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Playlist {
    Table,
    Id,
    RoomId,
    Name,
    Position,
    CreatedAt,
}
