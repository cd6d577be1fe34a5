use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::info;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{MaterialId, PlaylistId, RoomId, UserId, VideoId},
};

#[derive(Debug, Error)]
pub enum MaterialsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("video not found")]
    VideoNotFound,

    #[error("playlist not found")]
    PlaylistNotFound,

    #[error("room not found")]
    RoomNotFound,

    #[error("material not found")]
    MaterialNotFound,

    #[error("unauthorized: not the room owner")]
    Unauthorized,
}

impl MaterialsServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MaterialsServiceError::DbError(_) => ErrorKind::Internal,
            MaterialsServiceError::VideoNotFound => ErrorKind::NotFound,
            MaterialsServiceError::PlaylistNotFound => ErrorKind::NotFound,
            MaterialsServiceError::RoomNotFound => ErrorKind::NotFound,
            MaterialsServiceError::MaterialNotFound => ErrorKind::NotFound,
            MaterialsServiceError::Unauthorized => ErrorKind::Unauthorized,
        }
    }
}

/// Where an attachment hangs in the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialScope {
    Video(VideoId),
    Playlist(PlaylistId),
    Room(RoomId),
}

#[derive(Clone)]
pub struct MaterialsService {
    db: DatabaseConnection,
}

impl MaterialsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Expand a scope into the parent columns it implies. A video-scoped
    /// material inherits the video's playlist and room, so the attachment
    /// falls with whichever container is deleted first.
    async fn resolve_scope(
        &self,
        scope: MaterialScope,
    ) -> Result<(Option<VideoId>, Option<PlaylistId>, RoomId), MaterialsServiceError> {
        match scope {
            MaterialScope::Video(video_id) => {
                let video = Video::find_by_id(video_id)
                    .one(&self.db)
                    .await?
                    .ok_or(MaterialsServiceError::VideoNotFound)?;
                Ok((Some(video.id), Some(video.playlist_id), video.room_id))
            }
            MaterialScope::Playlist(playlist_id) => {
                let playlist = Playlist::find_by_id(playlist_id)
                    .one(&self.db)
                    .await?
                    .ok_or(MaterialsServiceError::PlaylistNotFound)?;
                Ok((None, Some(playlist.id), playlist.room_id))
            }
            MaterialScope::Room(room_id) => {
                let room = Room::find_by_id(room_id)
                    .one(&self.db)
                    .await?
                    .ok_or(MaterialsServiceError::RoomNotFound)?;
                Ok((None, None, room.id))
            }
        }
    }

    async fn require_owner(
        &self,
        room_id: RoomId,
        caller: UserId,
    ) -> Result<RoomModel, MaterialsServiceError> {
        let room = Room::find_by_id(room_id)
            .one(&self.db)
            .await?
            .ok_or(MaterialsServiceError::RoomNotFound)?;
        if room.owner_id != caller {
            return Err(MaterialsServiceError::Unauthorized);
        }
        Ok(room)
    }

    /// Attach a file or link at the given scope. The caller supplies the URL
    /// (object storage upload happens elsewhere) plus metadata; when no kind
    /// is given it is inferred from the file name.
    pub async fn add_material(
        &self,
        caller: UserId,
        scope: MaterialScope,
        name: String,
        url: String,
        kind: Option<MaterialKind>,
        byte_size: Option<i64>,
    ) -> Result<MaterialModel, MaterialsServiceError> {
        let (video_id, playlist_id, room_id) = self.resolve_scope(scope).await?;
        self.require_owner(room_id, caller).await?;

        let kind = kind.unwrap_or_else(|| MaterialKind::from_file_name(&name));

        let material = MaterialActiveModel {
            id: Set(MaterialId::new()),
            video_id: Set(video_id),
            playlist_id: Set(playlist_id),
            room_id: Set(Some(room_id)),
            name: Set(name),
            url: Set(url),
            kind: Set(kind),
            byte_size: Set(byte_size),
            uploaded_by: Set(caller),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let material = Material::insert(material)
            .exec_with_returning(&self.db)
            .await?;

        info!(material = %material.id, "added material");
        Ok(material)
    }

    pub async fn delete_material(
        &self,
        material_id: MaterialId,
        caller: UserId,
    ) -> Result<(), MaterialsServiceError> {
        let material = Material::find_by_id(material_id)
            .one(&self.db)
            .await?
            .ok_or(MaterialsServiceError::MaterialNotFound)?;

        // Every scope records its room, so ownership is always checkable.
        let room_id = material.room_id.ok_or(MaterialsServiceError::RoomNotFound)?;
        self.require_owner(room_id, caller).await?;

        Material::delete_by_id(material_id).exec(&self.db).await?;

        Ok(())
    }

    pub async fn list_for_video(
        &self,
        video_id: VideoId,
    ) -> Result<Vec<MaterialModel>, MaterialsServiceError> {
        let materials = Material::find()
            .filter(MaterialColumn::VideoId.eq(video_id))
            .all(&self.db)
            .await?;

        Ok(materials)
    }

    /// Materials attached to the playlist itself, not to its videos.
    pub async fn list_for_playlist(
        &self,
        playlist_id: PlaylistId,
    ) -> Result<Vec<MaterialModel>, MaterialsServiceError> {
        let materials = Material::find()
            .filter(MaterialColumn::PlaylistId.eq(playlist_id))
            .filter(MaterialColumn::VideoId.is_null())
            .all(&self.db)
            .await?;

        Ok(materials)
    }

    /// Materials attached directly to the room.
    pub async fn list_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<MaterialModel>, MaterialsServiceError> {
        let materials = Material::find()
            .filter(MaterialColumn::RoomId.eq(room_id))
            .filter(MaterialColumn::PlaylistId.is_null())
            .all(&self.db)
            .await?;

        Ok(materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup_test_service() -> MaterialsService {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        MaterialsService::new(db)
    }

    async fn create_test_user(service: &MaterialsService, email: &str, role: UserRole) -> UserId {
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

    async fn setup_content(service: &MaterialsService) -> (UserId, RoomId, PlaylistId, VideoId) {
        let owner = create_test_user(service, "owner@example.com", UserRole::Instructor).await;

        let room_id = RoomId::new();
        let room = RoomActiveModel {
            id: Set(room_id),
            owner_id: Set(owner),
            name: Set("Algebra I".to_string()),
            description: Set("".to_string()),
            invite_code: Set("AAAAAA".to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Room::insert(room).exec(&service.db).await.unwrap();

        let playlist_id = PlaylistId::new();
        let playlist = PlaylistActiveModel {
            id: Set(playlist_id),
            room_id: Set(room_id),
            name: Set("Week 1".to_string()),
            position: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Playlist::insert(playlist).exec(&service.db).await.unwrap();

        let video_id = VideoId::new();
        let video = VideoActiveModel {
            id: Set(video_id),
            playlist_id: Set(playlist_id),
            room_id: Set(room_id),
            title: Set("Intro".to_string()),
            source_url: Set("https://example.com/v".to_string()),
            description: Set("".to_string()),
            position: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Video::insert(video).exec(&service.db).await.unwrap();

        (owner, room_id, playlist_id, video_id)
    }

    #[tokio::test]
    async fn test_video_scope_inherits_parents() {
        let service = setup_test_service().await;
        let (owner, room_id, playlist_id, video_id) = setup_content(&service).await;

        let material = service
            .add_material(
                owner,
                MaterialScope::Video(video_id),
                "notes.pdf".to_string(),
                "https://example.com/notes.pdf".to_string(),
                None,
                Some(2048),
            )
            .await
            .unwrap();

        assert_eq!(material.video_id, Some(video_id));
        assert_eq!(material.playlist_id, Some(playlist_id));
        assert_eq!(material.room_id, Some(room_id));
        assert_eq!(material.kind, MaterialKind::Pdf);
        assert_eq!(material.byte_size, Some(2048));
    }

    #[tokio::test]
    async fn test_playlist_and_room_scopes() {
        let service = setup_test_service().await;
        let (owner, room_id, playlist_id, _) = setup_content(&service).await;

        let on_playlist = service
            .add_material(
                owner,
                MaterialScope::Playlist(playlist_id),
                "slides.pptx".to_string(),
                "https://example.com/slides.pptx".to_string(),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(on_playlist.video_id, None);
        assert_eq!(on_playlist.playlist_id, Some(playlist_id));
        assert_eq!(on_playlist.kind, MaterialKind::Slides);

        let on_room = service
            .add_material(
                owner,
                MaterialScope::Room(room_id),
                "Course homepage".to_string(),
                "https://example.com/course".to_string(),
                Some(MaterialKind::Link),
                None,
            )
            .await
            .unwrap();
        assert_eq!(on_room.video_id, None);
        assert_eq!(on_room.playlist_id, None);
        assert_eq!(on_room.room_id, Some(room_id));
        assert_eq!(on_room.kind, MaterialKind::Link);

        assert_eq!(service.list_for_playlist(playlist_id).await.unwrap().len(), 1);
        assert_eq!(service.list_for_room(room_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_kind_inferred_from_extension() {
        for (name, kind) in [
            ("a.pdf", MaterialKind::Pdf),
            ("b.PPTX", MaterialKind::Slides),
            ("c.docx", MaterialKind::Document),
            ("d.xlsx", MaterialKind::Spreadsheet),
            ("e.zip", MaterialKind::Archive),
            ("f.png", MaterialKind::Image),
            ("noext", MaterialKind::File),
        ] {
            assert_eq!(MaterialKind::from_file_name(name), kind, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_add_material_requires_owner() {
        let service = setup_test_service().await;
        let (_, _, _, video_id) = setup_content(&service).await;
        let student = create_test_user(&service, "s@example.com", UserRole::Student).await;

        let result = service
            .add_material(
                student,
                MaterialScope::Video(video_id),
                "notes.pdf".to_string(),
                "https://example.com/notes.pdf".to_string(),
                None,
                None,
            )
            .await;

        assert!(matches!(result, Err(MaterialsServiceError::Unauthorized)));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_delete_material() {
        let service = setup_test_service().await;
        let (owner, _, _, video_id) = setup_content(&service).await;
        let student = create_test_user(&service, "s@example.com", UserRole::Student).await;

        let material = service
            .add_material(
                owner,
                MaterialScope::Video(video_id),
                "notes.pdf".to_string(),
                "https://example.com/notes.pdf".to_string(),
                None,
                None,
            )
            .await
            .unwrap();

        let by_student = service.delete_material(material.id, student).await;
        assert!(matches!(by_student, Err(MaterialsServiceError::Unauthorized)));

        service.delete_material(material.id, owner).await.unwrap();
        assert!(service.list_for_video(video_id).await.unwrap().is_empty());

        let gone = service.delete_material(material.id, owner).await;
        assert!(matches!(gone, Err(MaterialsServiceError::MaterialNotFound)));
    }

    #[tokio::test]
    async fn test_unknown_scope_target() {
        let service = setup_test_service().await;
        let (owner, _, _, _) = setup_content(&service).await;

        let result = service
            .add_material(
                owner,
                MaterialScope::Video(VideoId::new()),
                "notes.pdf".to_string(),
                "https://example.com/notes.pdf".to_string(),
                None,
                None,
            )
            .await;

        assert!(matches!(result, Err(MaterialsServiceError::VideoNotFound)));
    }
}
