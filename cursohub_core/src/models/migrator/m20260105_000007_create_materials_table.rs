use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_users_table::User;
use super::m20260105_000002_create_rooms_table::Room;
use super::m20260105_000004_create_playlists_table::Playlist;
use super::m20260105_000005_create_videos_table::Video;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Material::Table)
                    .col(pk_uuid(Material::Id))
                    .col(uuid_null(Material::VideoId))
                    .col(uuid_null(Material::PlaylistId))
                    .col(uuid_null(Material::RoomId))
                    .col(string(Material::Name))
                    .col(string(Material::Url))
                    .col(string(Material::Kind))
                    .col(big_integer_null(Material::ByteSize))
                    .col(uuid(Material::UploadedBy))
                    .col(timestamp(Material::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-material-video_id")
                            .from(Material::Table, Material::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-material-playlist_id")
                            .from(Material::Table, Material::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-material-room_id")
                            .from(Material::Table, Material::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-material-uploaded_by")
                            .from(Material::Table, Material::UploadedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_materials_video_id")
                    .table(Material::Table)
                    .col(Material::VideoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_materials_playlist_id")
                    .table(Material::Table)
                    .col(Material::PlaylistId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_materials_room_id")
                    .table(Material::Table)
                    .col(Material::RoomId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Material::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Material {
    Table,
    Id,
    VideoId,
    PlaylistId,
    RoomId,
    Name,
    Url,
    Kind,
    ByteSize,
    UploadedBy,
    CreatedAt,
}
