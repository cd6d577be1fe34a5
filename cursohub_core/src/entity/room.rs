use crate::ids::{RoomId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Invite codes are stored uppercased; lookups normalize before comparing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: RoomId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub invite_code: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::playlist::Entity")]
    Playlist,
    #[sea_orm(has_many = "super::room_student::Entity")]
    RoomStudent,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::playlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Playlist.def()
    }
}

impl Related<super::room_student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomStudent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
