use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_users_table::User;
use super::m20260105_000002_create_rooms_table::Room;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomStudent::Table)
                    .col(pk_uuid(RoomStudent::Id))
                    .col(uuid(RoomStudent::RoomId))
                    .col(uuid(RoomStudent::StudentId))
                    .col(timestamp(RoomStudent::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-room-student-room_id")
                            .from(RoomStudent::Table, RoomStudent::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-room-student-student_id")
                            .from(RoomStudent::Table, RoomStudent::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The single membership relation: one row per (room, student).
        manager
            .create_index(
                Index::create()
                    .name("idx_room_students_room_student_unique")
                    .table(RoomStudent::Table)
                    .col(RoomStudent::RoomId)
                    .col(RoomStudent::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_students_room_id")
                    .table(RoomStudent::Table)
                    .col(RoomStudent::RoomId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_students_student_id")
                    .table(RoomStudent::Table)
                    .col(RoomStudent::StudentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomStudent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RoomStudent {
    Table,
    Id,
    RoomId,
    StudentId,
    CreatedAt,
}
