use sea_orm_migration::prelude::*;

mod m20260105_000001_create_users_table;
mod m20260105_000002_create_rooms_table;
mod m20260105_000003_create_room_students_table;
mod m20260105_000004_create_playlists_table;
mod m20260105_000005_create_videos_table;
mod m20260105_000006_create_comments_table;
mod m20260105_000007_create_materials_table;
mod m20260105_000008_create_notifications_table;
mod m20260105_000009_create_watch_progress_table;
mod m20260105_000010_create_password_resets_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_users_table::Migration),
            Box::new(m20260105_000002_create_rooms_table::Migration),
            Box::new(m20260105_000003_create_room_students_table::Migration),
            Box::new(m20260105_000004_create_playlists_table::Migration),
            Box::new(m20260105_000005_create_videos_table::Migration),
            Box::new(m20260105_000006_create_comments_table::Migration),
            Box::new(m20260105_000007_create_materials_table::Migration),
            Box::new(m20260105_000008_create_notifications_table::Migration),
            Box::new(m20260105_000009_create_watch_progress_table::Migration),
            Box::new(m20260105_000010_create_password_resets_table::Migration),
        ]
    }
}

#[cfg(test)]
use sea_orm::{Database, DbErr};

#[tokio::test]
async fn test_migrations_okay() -> Result<(), DbErr> {
    let db = Database::connect("sqlite:file::memory:?cache=shared").await?;
    let schema_manager = SchemaManager::new(&db);

    Migrator::refresh(&db).await?;

    assert!(schema_manager.has_table("user").await?);
    assert!(schema_manager.has_table("room").await?);
    assert!(schema_manager.has_table("room_student").await?);
    assert!(schema_manager.has_table("playlist").await?);
    assert!(schema_manager.has_table("video").await?);
    assert!(schema_manager.has_table("comment").await?);
    assert!(schema_manager.has_table("material").await?);
    assert!(schema_manager.has_table("notification").await?);
    assert!(schema_manager.has_table("watch_progress").await?);
    assert!(schema_manager.has_table("password_reset").await?);

    Ok(())
}
