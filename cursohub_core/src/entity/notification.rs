use crate::ids::{CommentId, NotificationId, RoomId, UserId, VideoId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What triggered the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum NotificationKind {
    #[sea_orm(string_value = "welcome")]
    Welcome,
    #[sea_orm(string_value = "new_video")]
    NewVideo,
    #[sea_orm(string_value = "new_playlist")]
    NewPlaylist,
    #[sea_orm(string_value = "enrolled")]
    Enrolled,
    #[sea_orm(string_value = "new_question")]
    NewQuestion,
    #[sea_orm(string_value = "comment_reply")]
    CommentReply,
}

// Correlation columns are nulled (not cascaded) when the referenced entity
// is deleted; the inbox entry itself stays.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub room_id: Option<RoomId>,
    pub video_id: Option<VideoId>,
    pub comment_id: Option<CommentId>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
