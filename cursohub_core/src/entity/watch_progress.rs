use crate::ids::{UserId, VideoId, WatchProgressId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Completion percentage counts as "watched" from this threshold up.
pub const WATCHED_THRESHOLD: i32 = 90;

// One row per (user, video); a new report overwrites in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watch_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: WatchProgressId,
    pub user_id: UserId,
    pub video_id: VideoId,
    /// 0–100, clamped at write time.
    pub progress: i32,
    pub updated_at: String,
}

impl Model {
    pub fn is_watched(&self) -> bool {
        self.progress >= WATCHED_THRESHOLD
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::video::Entity",
        from = "Column::VideoId",
        to = "super::video::Column::Id"
    )]
    Video,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
