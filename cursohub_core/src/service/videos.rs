use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::info;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{PlaylistId, RoomId, UserId, VideoId},
    service::notify,
};

#[derive(Debug, Error)]
pub enum VideosServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("playlist not found")]
    PlaylistNotFound,

    #[error("video not found")]
    VideoNotFound,

    #[error("reorder list does not match the playlist's videos")]
    ReorderMismatch,

    #[error("unauthorized: not the room owner")]
    Unauthorized,
}

impl VideosServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VideosServiceError::DbError(_) => ErrorKind::Internal,
            VideosServiceError::PlaylistNotFound => ErrorKind::NotFound,
            VideosServiceError::VideoNotFound => ErrorKind::NotFound,
            VideosServiceError::ReorderMismatch => ErrorKind::InvalidState,
            VideosServiceError::Unauthorized => ErrorKind::Unauthorized,
        }
    }
}

#[derive(Clone)]
pub struct VideosService {
    db: DatabaseConnection,
}

impl VideosService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn get_room_checked(
        &self,
        room_id: RoomId,
        caller: UserId,
    ) -> Result<RoomModel, VideosServiceError> {
        // Rooms always outlive their playlists, so a missing room here is a
        // broken invariant, not a user error.
        let room = Room::find_by_id(room_id)
            .one(&self.db)
            .await?
            .ok_or(VideosServiceError::PlaylistNotFound)?;
        if room.owner_id != caller {
            return Err(VideosServiceError::Unauthorized);
        }
        Ok(room)
    }

    /// Append a video to a playlist and notify every enrolled student.
    /// Fan-out commits with the video row or not at all.
    pub async fn add_video(
        &self,
        playlist_id: PlaylistId,
        caller: UserId,
        title: String,
        source_url: String,
        description: String,
    ) -> Result<VideoModel, VideosServiceError> {
        let playlist = Playlist::find_by_id(playlist_id)
            .one(&self.db)
            .await?
            .ok_or(VideosServiceError::PlaylistNotFound)?;
        let room = self.get_room_checked(playlist.room_id, caller).await?;

        let position = Video::find()
            .filter(VideoColumn::PlaylistId.eq(playlist_id))
            .count(&self.db)
            .await? as i32;

        let video = VideoActiveModel {
            id: Set(VideoId::new()),
            playlist_id: Set(playlist_id),
            room_id: Set(room.id),
            title: Set(title),
            source_url: Set(source_url),
            description: Set(description),
            position: Set(position),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let memberships = RoomStudent::find()
            .filter(RoomStudentColumn::RoomId.eq(room.id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;
        let video = Video::insert(video).exec_with_returning(&txn).await?;
        for membership in &memberships {
            Notification::insert(notify::new_video(membership.student_id, &room, &video))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        info!(video = %video.id, room = %room.id, "added video");
        Ok(video)
    }

    pub async fn get_video(&self, video_id: VideoId) -> Result<VideoModel, VideosServiceError> {
        Video::find_by_id(video_id)
            .one(&self.db)
            .await?
            .ok_or(VideosServiceError::VideoNotFound)
    }

    /// Videos of a playlist in display order.
    pub async fn list_videos(
        &self,
        playlist_id: PlaylistId,
    ) -> Result<Vec<VideoModel>, VideosServiceError> {
        let videos = Video::find()
            .filter(VideoColumn::PlaylistId.eq(playlist_id))
            .order_by_asc(VideoColumn::Position)
            .all(&self.db)
            .await?;

        Ok(videos)
    }

    pub async fn update_video(
        &self,
        video_id: VideoId,
        caller: UserId,
        title: Option<String>,
        source_url: Option<String>,
        description: Option<String>,
    ) -> Result<VideoModel, VideosServiceError> {
        let video = self.get_video(video_id).await?;
        self.get_room_checked(video.room_id, caller).await?;

        let mut video: VideoActiveModel = video.into();
        if let Some(title) = title {
            video.title = Set(title);
        }
        if let Some(source_url) = source_url {
            video.source_url = Set(source_url);
        }
        if let Some(description) = description {
            video.description = Set(description);
        }

        let updated = video.update(&self.db).await?;
        Ok(updated)
    }

    /// Remove a video together with its comments and materials.
    pub async fn delete_video(
        &self,
        video_id: VideoId,
        caller: UserId,
    ) -> Result<(), VideosServiceError> {
        let video = self.get_video(video_id).await?;
        self.get_room_checked(video.room_id, caller).await?;

        Video::delete_by_id(video_id).exec(&self.db).await?;

        info!(video = %video_id, "deleted video");
        Ok(())
    }

    /// Assign positions from array order. `ordered_ids` must be exactly the
    /// playlist's videos, each exactly once.
    pub async fn reorder_videos(
        &self,
        playlist_id: PlaylistId,
        caller: UserId,
        ordered_ids: &[VideoId],
    ) -> Result<(), VideosServiceError> {
        let playlist = Playlist::find_by_id(playlist_id)
            .one(&self.db)
            .await?
            .ok_or(VideosServiceError::PlaylistNotFound)?;
        self.get_room_checked(playlist.room_id, caller).await?;

        let existing = Video::find()
            .filter(VideoColumn::PlaylistId.eq(playlist_id))
            .all(&self.db)
            .await?;

        if existing.len() != ordered_ids.len()
            || !existing.iter().all(|v| ordered_ids.contains(&v.id))
        {
            return Err(VideosServiceError::ReorderMismatch);
        }

        let mut by_id: std::collections::HashMap<VideoId, VideoModel> =
            existing.into_iter().map(|v| (v.id, v)).collect();

        let txn = self.db.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            if let Some(video) = by_id.remove(id) {
                let mut video: VideoActiveModel = video.into();
                video.position = Set(position as i32);
                video.update(&txn).await?;
            }
        }
        txn.commit().await?;

        Ok(())
    }

    /// Substring match over title and description. SQLite's LIKE is
    /// case-insensitive for ASCII, which is what the UI search box expects.
    pub async fn search_videos(
        &self,
        query: &str,
        room_id: Option<RoomId>,
    ) -> Result<Vec<VideoModel>, VideosServiceError> {
        let mut select = Video::find().filter(
            Condition::any()
                .add(VideoColumn::Title.contains(query))
                .add(VideoColumn::Description.contains(query)),
        );
        if let Some(room_id) = room_id {
            select = select.filter(VideoColumn::RoomId.eq(room_id));
        }

        let videos = select
            .order_by_asc(VideoColumn::Title)
            .all(&self.db)
            .await?;

        Ok(videos)
    }

    /// How many users have watched this video (progress ≥ 90).
    pub async fn watched_by_count(&self, video_id: VideoId) -> Result<u64, VideosServiceError> {
        self.get_video(video_id).await?;

        let count = WatchProgress::find()
            .filter(WatchProgressColumn::VideoId.eq(video_id))
            .filter(WatchProgressColumn::Progress.gte(WATCHED_THRESHOLD))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CommentId, MaterialId, MembershipId, WatchProgressId};
    use crate::models::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup_test_service() -> VideosService {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        VideosService::new(db)
    }

    async fn create_test_user(service: &VideosService, email: &str, role: UserRole) -> UserId {
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

    async fn create_test_room(service: &VideosService, owner_id: UserId, code: &str) -> RoomId {
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

    async fn create_test_playlist(service: &VideosService, room_id: RoomId) -> PlaylistId {
        let playlist_id = PlaylistId::new();
        let playlist = PlaylistActiveModel {
            id: Set(playlist_id),
            room_id: Set(room_id),
            name: Set("Week 1".to_string()),
            position: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Playlist::insert(playlist).exec(&service.db).await.unwrap();
        playlist_id
    }

    async fn enroll(service: &VideosService, room_id: RoomId, student_id: UserId) {
        let membership = RoomStudentActiveModel {
            id: Set(MembershipId::new()),
            room_id: Set(room_id),
            student_id: Set(student_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        RoomStudent::insert(membership).exec(&service.db).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_video_appends_position() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let first = service
            .add_video(
                playlist_id,
                owner,
                "Intro".to_string(),
                "https://example.com/1".to_string(),
                "".to_string(),
            )
            .await
            .unwrap();
        let second = service
            .add_video(
                playlist_id,
                owner,
                "Next".to_string(),
                "https://example.com/2".to_string(),
                "".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(first.room_id, room_id);
    }

    #[tokio::test]
    async fn test_add_video_fans_out_to_each_student_once() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let mut students = Vec::new();
        for i in 0..3 {
            let student =
                create_test_user(&service, &format!("s{}@example.com", i), UserRole::Student)
                    .await;
            enroll(&service, room_id, student).await;
            students.push(student);
        }

        let video = service
            .add_video(
                playlist_id,
                owner,
                "Intro".to_string(),
                "https://example.com/1".to_string(),
                "".to_string(),
            )
            .await
            .unwrap();

        let sent = Notification::find()
            .filter(NotificationColumn::Kind.eq(NotificationKind::NewVideo))
            .all(&service.db)
            .await
            .unwrap();

        assert_eq!(sent.len(), 3, "Exactly one new_video notification per student");
        for student in students {
            assert_eq!(
                sent.iter().filter(|n| n.recipient_id == student).count(),
                1,
                "No student may be notified twice for one video"
            );
        }
        assert!(sent.iter().all(|n| n.recipient_id != owner));
        assert!(sent.iter().all(|n| n.video_id == Some(video.id)));
    }

    #[tokio::test]
    async fn test_add_video_requires_owner() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let other = create_test_user(&service, "other@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let result = service
            .add_video(
                playlist_id,
                other,
                "Nope".to_string(),
                "https://example.com".to_string(),
                "".to_string(),
            )
            .await;

        assert!(matches!(result, Err(VideosServiceError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_video() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let video = service
            .add_video(
                playlist_id,
                owner,
                "Intro".to_string(),
                "https://example.com/1".to_string(),
                "".to_string(),
            )
            .await
            .unwrap();

        let updated = service
            .update_video(
                video.id,
                owner,
                Some("Introduction".to_string()),
                None,
                Some("First lesson".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Introduction");
        assert_eq!(updated.source_url, "https://example.com/1");
        assert_eq!(updated.description, "First lesson");
    }

    #[tokio::test]
    async fn test_delete_video_cascades_comments_and_materials() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let video = service
            .add_video(
                playlist_id,
                owner,
                "Intro".to_string(),
                "https://example.com/1".to_string(),
                "".to_string(),
            )
            .await
            .unwrap();

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            video_id: Set(video.id),
            room_id: Set(room_id),
            author_id: Set(owner),
            author_role: Set(UserRole::Instructor),
            content: Set("Welcome".to_string()),
            parent_id: Set(None),
            resolved: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Comment::insert(comment).exec(&service.db).await.unwrap();

        let material = MaterialActiveModel {
            id: Set(MaterialId::new()),
            video_id: Set(Some(video.id)),
            playlist_id: Set(Some(playlist_id)),
            room_id: Set(Some(room_id)),
            name: Set("notes.pdf".to_string()),
            url: Set("https://example.com/notes.pdf".to_string()),
            kind: Set(MaterialKind::Pdf),
            byte_size: Set(None),
            uploaded_by: Set(owner),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Material::insert(material).exec(&service.db).await.unwrap();

        service.delete_video(video.id, owner).await.unwrap();

        assert_eq!(Comment::find().all(&service.db).await.unwrap().len(), 0);
        assert_eq!(Material::find().all(&service.db).await.unwrap().len(), 0);
        assert_eq!(
            Playlist::find().all(&service.db).await.unwrap().len(),
            1,
            "Container must survive its video"
        );
    }

    #[tokio::test]
    async fn test_reorder_videos() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let video = service
                .add_video(
                    playlist_id,
                    owner,
                    title.to_string(),
                    "https://example.com".to_string(),
                    "".to_string(),
                )
                .await
                .unwrap();
            ids.push(video.id);
        }

        service
            .reorder_videos(playlist_id, owner, &[ids[2], ids[0], ids[1]])
            .await
            .unwrap();

        let listed = service.list_videos(playlist_id).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);

        let mismatch = service.reorder_videos(playlist_id, owner, &[ids[0]]).await;
        assert!(matches!(mismatch, Err(VideosServiceError::ReorderMismatch)));
    }

    #[tokio::test]
    async fn test_search_videos_case_insensitive() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        service
            .add_video(
                playlist_id,
                owner,
                "Linear Equations".to_string(),
                "https://example.com/1".to_string(),
                "Solving for x".to_string(),
            )
            .await
            .unwrap();
        service
            .add_video(
                playlist_id,
                owner,
                "Quadratics".to_string(),
                "https://example.com/2".to_string(),
                "Parabolas and roots of equations".to_string(),
            )
            .await
            .unwrap();

        // Title match, any case
        let by_title = service.search_videos("linear", None).await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Linear Equations");

        // Description matches count too
        let by_description = service.search_videos("EQUATIONS", None).await.unwrap();
        assert_eq!(by_description.len(), 2);

        let none = service.search_videos("geometry", None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_videos_scoped_to_room() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_a = create_test_room(&service, owner, "AAAAAA").await;
        let room_b = create_test_room(&service, owner, "BBBBBB").await;
        let playlist_a = create_test_playlist(&service, room_a).await;
        let playlist_b = create_test_playlist(&service, room_b).await;

        for (playlist, title) in [(playlist_a, "Algebra intro"), (playlist_b, "Algebra review")] {
            service
                .add_video(
                    playlist,
                    owner,
                    title.to_string(),
                    "https://example.com".to_string(),
                    "".to_string(),
                )
                .await
                .unwrap();
        }

        let scoped = service.search_videos("algebra", Some(room_a)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].title, "Algebra intro");

        let global = service.search_videos("algebra", None).await.unwrap();
        assert_eq!(global.len(), 2);
    }

    #[tokio::test]
    async fn test_watched_by_count() {
        let service = setup_test_service().await;
        let owner = create_test_user(&service, "owner@example.com", UserRole::Instructor).await;
        let room_id = create_test_room(&service, owner, "AAAAAA").await;
        let playlist_id = create_test_playlist(&service, room_id).await;

        let video = service
            .add_video(
                playlist_id,
                owner,
                "Intro".to_string(),
                "https://example.com/1".to_string(),
                "".to_string(),
            )
            .await
            .unwrap();

        for (i, progress) in [95, 90, 45].into_iter().enumerate() {
            let student =
                create_test_user(&service, &format!("s{}@example.com", i), UserRole::Student)
                    .await;
            let row = WatchProgressActiveModel {
                id: Set(WatchProgressId::new()),
                user_id: Set(student),
                video_id: Set(video.id),
                progress: Set(progress),
                updated_at: Set(chrono::Utc::now().to_rfc3339()),
            };
            WatchProgress::insert(row).exec(&service.db).await.unwrap();
        }

        assert_eq!(service.watched_by_count(video.id).await.unwrap(), 2);
    }
}
