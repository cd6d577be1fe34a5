use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::info;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{PlaylistId, RoomId, UserId},
    service::notify,
};

#[derive(Debug, Error)]
pub enum PlaylistsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("room not found")]
    RoomNotFound,

    #[error("playlist not found")]
    PlaylistNotFound,

    #[error("reorder list does not match the room's playlists")]
    ReorderMismatch,

    #[error("unauthorized: not the room owner")]
    Unauthorized,
}

impl PlaylistsServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaylistsServiceError::DbError(_) => ErrorKind::Internal,
            PlaylistsServiceError::RoomNotFound => ErrorKind::NotFound,
            PlaylistsServiceError::PlaylistNotFound => ErrorKind::NotFound,
            PlaylistsServiceError::ReorderMismatch => ErrorKind::InvalidState,
            PlaylistsServiceError::Unauthorized => ErrorKind::Unauthorized,
        }
    }
}

#[derive(Clone)]
pub struct PlaylistsService {
    db: DatabaseConnection,
}

impl PlaylistsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn get_owned_room(
        &self,
        room_id: RoomId,
        caller: UserId,
    ) -> Result<RoomModel, PlaylistsServiceError> {
        let room = Room::find_by_id(room_id)
            .one(&self.db)
            .await?
            .ok_or(PlaylistsServiceError::RoomNotFound)?;
        if room.owner_id != caller {
            return Err(PlaylistsServiceError::Unauthorized);
        }
        Ok(room)
    }

    /// Append a playlist at the next position and tell every enrolled
    /// student, all in one transaction.
    pub async fn create_playlist(
        &self,
        room_id: RoomId,
        caller: UserId,
        name: String,
    ) -> Result<PlaylistModel, PlaylistsServiceError> {
        let room = self.get_owned_room(room_id, caller).await?;

        let position = Playlist::find()
            .filter(PlaylistColumn::RoomId.eq(room_id))
            .count(&self.db)
            .await? as i32;

        let playlist = PlaylistActiveModel {
            id: Set(PlaylistId::new()),
            room_id: Set(room_id),
            name: Set(name),
            position: Set(position),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let memberships = RoomStudent::find()
            .filter(RoomStudentColumn::RoomId.eq(room_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;
        let playlist = Playlist::insert(playlist).exec_with_returning(&txn).await?;
        for membership in &memberships {
            Notification::insert(notify::new_playlist(membership.student_id, &room, &playlist))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        info!(playlist = %playlist.id, room = %room_id, "created playlist");
        Ok(playlist)
    }

    pub async fn get_playlist(
        &self,
        playlist_id: PlaylistId,
    ) -> Result<PlaylistModel, PlaylistsServiceError> {
        Playlist::find_by_id(playlist_id)
            .one(&self.db)
            .await?
            .ok_or(PlaylistsServiceError::PlaylistNotFound)
    }

    /// Playlists of a room in display order.
    pub async fn list_playlists(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<PlaylistModel>, PlaylistsServiceError> {
        let playlists = Playlist::find()
            .filter(PlaylistColumn::RoomId.eq(room_id))
            .order_by_asc(PlaylistColumn::Position)
            .all(&self.db)
            .await?;

        Ok(playlists)
    }

    pub async fn update_playlist(
        &self,
        playlist_id: PlaylistId,
        caller: UserId,
        name: String,
    ) -> Result<PlaylistModel, PlaylistsServiceError> {
        let playlist = self.get_playlist(playlist_id).await?;
        self.get_owned_room(playlist.room_id, caller).await?;

        let mut playlist: PlaylistActiveModel = playlist.into();
        playlist.name = Set(name);
        let updated = playlist.update(&self.db).await?;

        Ok(updated)
    }

    /// Remove a playlist; its videos, their comments and every material
    /// scoped to any of them go with it.
    pub async fn delete_playlist(
        &self,
        playlist_id: PlaylistId,
        caller: UserId,
    ) -> Result<(), PlaylistsServiceError> {
        let playlist = self.get_playlist(playlist_id).await?;
        self.get_owned_room(playlist.room_id, caller).await?;

        Playlist::delete_by_id(playlist_id).exec(&self.db).await?;

        info!(playlist = %playlist_id, "deleted playlist");
        Ok(())
    }

    /// Assign positions from array order. `ordered_ids` must be exactly the
    /// room's playlists, each exactly once.
    pub async fn reorder_playlists(
        &self,
        room_id: RoomId,
        caller: UserId,
        ordered_ids: &[PlaylistId],
    ) -> Result<(), PlaylistsServiceError> {
        self.get_owned_room(room_id, caller).await?;

        let existing = Playlist::find()
            .filter(PlaylistColumn::RoomId.eq(room_id))
            .all(&self.db)
            .await?;

        if existing.len() != ordered_ids.len()
            || !existing.iter().all(|p| ordered_ids.contains(&p.id))
        {
            return Err(PlaylistsServiceError::ReorderMismatch);
        }

        let mut by_id: std::collections::HashMap<PlaylistId, PlaylistModel> =
            existing.into_iter().map(|p| (p.id, p)).collect();

        let txn = self.db.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            if let Some(playlist) = by_id.remove(id) {
                let mut playlist: PlaylistActiveModel = playlist.into();
                playlist.position = Set(position as i32);
                playlist.update(&txn).await?;
            }
        }
        txn.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{MaterialId, MembershipId, VideoId};
    use crate::models::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup_test_service() -> PlaylistsService {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        PlaylistsService::new(db)
    }

    async fn create_test_user(
        service: &PlaylistsService,
        email: &str,
        role: UserRole,
    ) -> UserId {
        let user_id = UserId::new();
        let user = UserActiveModel {
            id: Set(user_id),
            email: Set(email.to_string()),
            password_hash: Set("x".to_string()),
            display_name: Set("Test User".to_string()),
            role: Set(role),
            avatar: Set(role.default_avatar().to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        User::insert(user).exec(&service.db).await.unwrap();
        user_id
    }

    async fn create_test_room(service: &PlaylistsService, owner_id: UserId, code: &str) -> RoomId {
        let room_id = RoomId::new();
        let room = RoomActiveModel {
            id: Set(room_id),
            owner_id: Set(owner_id),
            name: Set("Algebra I".to_string()),
            description: Set("".to_string()),
            invite_code: Set(code.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Room::insert(room).exec(&service.db).await.unwrap();
        room_id
    }

    async fn enroll(service: &PlaylistsService, room_id: RoomId, student_id: UserId) {
        let membership = RoomStudentActiveModel {
            id: Set(MembershipId::new()),
            room_id: Set(room_id),
            student_id: Set(student_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        RoomStudent::insert(membership).exec(&service.db).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_playlist_positions_increment() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        let first = service
            .create_playlist(room_id, owner, "Week 1".to_string())
            .await
            .unwrap();
        let second = service
            .create_playlist(room_id, owner, "Week 2".to_string())
            .await
            .unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);

        let listed = service.list_playlists(room_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
    }

    #[tokio::test]
    async fn test_create_playlist_fans_out_to_students() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        for i in 0..2 {
            let student =
                create_test_user(&service, &format!("s{}@example.com", i), UserRole::Student)
                    .await;
            enroll(&service, room_id, student).await;
        }

        service
            .create_playlist(room_id, owner, "Week 1".to_string())
            .await
            .unwrap();

        let sent = Notification::find()
            .filter(NotificationColumn::Kind.eq(NotificationKind::NewPlaylist))
            .all(&service.db)
            .await
            .unwrap();

        assert_eq!(sent.len(), 2, "Exactly one notification per enrolled student");
        assert!(sent.iter().all(|n| n.recipient_id != owner));
    }

    #[tokio::test]
    async fn test_create_playlist_requires_owner() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let other = create_test_user(&service, "other@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        let result = service
            .create_playlist(room_id, other, "Nope".to_string())
            .await;

        assert!(matches!(result, Err(PlaylistsServiceError::Unauthorized)));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_update_playlist() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        let playlist = service
            .create_playlist(room_id, owner, "Week 1".to_string())
            .await
            .unwrap();

        let updated = service
            .update_playlist(playlist.id, owner, "Week One".to_string())
            .await
            .unwrap();
        assert_eq!(updated.name, "Week One");
    }

    #[tokio::test]
    async fn test_reorder_playlists() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        let a = service.create_playlist(room_id, owner, "A".to_string()).await.unwrap();
        let b = service.create_playlist(room_id, owner, "B".to_string()).await.unwrap();
        let c = service.create_playlist(room_id, owner, "C".to_string()).await.unwrap();

        service
            .reorder_playlists(room_id, owner, &[c.id, a.id, b.id])
            .await
            .unwrap();

        let listed = service.list_playlists(room_id).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_reorder_rejects_mismatched_ids() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        let a = service.create_playlist(room_id, owner, "A".to_string()).await.unwrap();
        service.create_playlist(room_id, owner, "B".to_string()).await.unwrap();

        // Missing one playlist
        let short = service.reorder_playlists(room_id, owner, &[a.id]).await;
        assert!(matches!(short, Err(PlaylistsServiceError::ReorderMismatch)));

        // Foreign id in the list
        let foreign = service
            .reorder_playlists(room_id, owner, &[a.id, PlaylistId::new()])
            .await;
        assert!(matches!(foreign, Err(PlaylistsServiceError::ReorderMismatch)));
    }

    #[tokio::test]
    async fn test_delete_playlist_cascades() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;

        let playlist = service
            .create_playlist(room_id, owner, "Week 1".to_string())
            .await
            .unwrap();

        let video = VideoActiveModel {
            id: Set(VideoId::new()),
            playlist_id: Set(playlist.id),
            room_id: Set(room_id),
            title: Set("Intro".to_string()),
            source_url: Set("https://example.com/v".to_string()),
            description: Set("".to_string()),
            position: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Video::insert(video).exec(&service.db).await.unwrap();

        let material = MaterialActiveModel {
            id: Set(MaterialId::new()),
            video_id: Set(None),
            playlist_id: Set(Some(playlist.id)),
            room_id: Set(Some(room_id)),
            name: Set("syllabus.pdf".to_string()),
            url: Set("https://example.com/syllabus.pdf".to_string()),
            kind: Set(MaterialKind::Pdf),
            byte_size: Set(None),
            uploaded_by: Set(owner),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Material::insert(material).exec(&service.db).await.unwrap();

        service.delete_playlist(playlist.id, owner).await.unwrap();

        assert_eq!(Video::find().all(&service.db).await.unwrap().len(), 0);
        assert_eq!(Material::find().all(&service.db).await.unwrap().len(), 0);
    }
}
