use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_users_table::User;
use super::m20260105_000005_create_videos_table::Video;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WatchProgress::Table)
                    .col(pk_uuid(WatchProgress::Id))
                    .col(uuid(WatchProgress::UserId))
                    .col(uuid(WatchProgress::VideoId))
                    .col(integer(WatchProgress::Progress))
                    .col(timestamp(WatchProgress::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-watch-progress-user_id")
                            .from(WatchProgress::Table, WatchProgress::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-watch-progress-video_id")
                            .from(WatchProgress::Table, WatchProgress::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One ledger row per (user, video); reports overwrite in place.
        manager
            .create_index(
                Index::create()
                    .name("idx_watch_progress_user_video_unique")
                    .table(WatchProgress::Table)
                    .col(WatchProgress::UserId)
                    .col(WatchProgress::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_progress_video_id")
                    .table(WatchProgress::Table)
                    .col(WatchProgress::VideoId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WatchProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WatchProgress {
    Table,
    Id,
    UserId,
    VideoId,
    Progress,
    UpdatedAt,
}
