use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000002_create_rooms_table::Room;
use super::m20260105_000004_create_playlists_table::Playlist;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .col(pk_uuid(Video::Id))
                    .col(uuid(Video::PlaylistId))
                    .col(uuid(Video::RoomId))
                    .col(string(Video::Title))
                    .col(string(Video::SourceUrl))
                    .col(string(Video::Description))
                    .col(integer(Video::Position))
                    .col(timestamp(Video::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-playlist_id")
                            .from(Video::Table, Video::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-room_id")
                            .from(Video::Table, Video::RoomId)
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
                    .name("idx_videos_playlist_id")
                    .table(Video::Table)
                    .col(Video::PlaylistId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_videos_room_id")
                    .table(Video::Table)
                    .col(Video::RoomId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Video {
    Table,
    Id,
    PlaylistId,
    RoomId,
    Title,
    SourceUrl,
    Description,
    Position,
    CreatedAt,
}
