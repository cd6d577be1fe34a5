use crate::ids::{MaterialId, PlaylistId, RoomId, UserId, VideoId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attachment category, shown as an icon in the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MaterialKind {
    #[sea_orm(string_value = "pdf")]
    Pdf,
    #[sea_orm(string_value = "slides")]
    Slides,
    #[sea_orm(string_value = "document")]
    Document,
    #[sea_orm(string_value = "spreadsheet")]
    Spreadsheet,
    #[sea_orm(string_value = "archive")]
    Archive,
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "link")]
    Link,
    #[sea_orm(string_value = "file")]
    File,
}

impl MaterialKind {
    /// Infer a kind from a file name extension. Anything unrecognized is a
    /// plain file.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => MaterialKind::Pdf,
            "ppt" | "pptx" => MaterialKind::Slides,
            "doc" | "docx" | "txt" => MaterialKind::Document,
            "xls" | "xlsx" => MaterialKind::Spreadsheet,
            "zip" | "rar" => MaterialKind::Archive,
            "jpg" | "jpeg" | "png" | "gif" => MaterialKind::Image,
            _ => MaterialKind::File,
        }
    }
}

// Scope columns: a video-scoped material carries all three parents, a
// playlist-scoped one carries playlist + room, a room-scoped one only the
// room. Each set column has a cascading FK, so the attachment disappears
// with whichever container goes first.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: MaterialId,
    pub video_id: Option<VideoId>,
    pub playlist_id: Option<PlaylistId>,
    pub room_id: Option<RoomId>,
    pub name: String,
    pub url: String,
    pub kind: MaterialKind,
    pub byte_size: Option<i64>,
    pub uploaded_by: UserId,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::video::Entity",
        from = "Column::VideoId",
        to = "super::video::Column::Id"
    )]
    Video,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
