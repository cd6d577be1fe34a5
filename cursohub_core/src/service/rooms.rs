use rand::Rng;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{MembershipId, RoomId, UserId, VideoId},
    service::notify,
};

const INVITE_CODE_LEN: usize = 6;
const INVITE_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error)]
pub enum RoomsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("room not found")]
    RoomNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("no room with that invite code")]
    InvalidInviteCode,

    #[error("student already enrolled in this room")]
    AlreadyEnrolled,

    #[error("student not enrolled in this room")]
    NotEnrolled,

    #[error("target user is not a student")]
    NotAStudent,

    #[error("unauthorized: not the room owner")]
    Unauthorized,
}

impl RoomsServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomsServiceError::DbError(_) => ErrorKind::Internal,
            RoomsServiceError::RoomNotFound => ErrorKind::NotFound,
            RoomsServiceError::UserNotFound => ErrorKind::NotFound,
            RoomsServiceError::InvalidInviteCode => ErrorKind::NotFound,
            RoomsServiceError::AlreadyEnrolled => ErrorKind::Conflict,
            RoomsServiceError::NotEnrolled => ErrorKind::NotFound,
            RoomsServiceError::NotAStudent => ErrorKind::InvalidState,
            RoomsServiceError::Unauthorized => ErrorKind::Unauthorized,
        }
    }
}

/// Derived, never stored; recomputed on every call so it cannot go stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomStats {
    pub students: u64,
    pub playlists: u64,
    pub videos: u64,
    pub comments: u64,
    /// Top-level comments still waiting for resolution.
    pub open_questions: u64,
}

fn mint_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_CHARSET[rng.random_range(0..INVITE_CODE_CHARSET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct RoomsService {
    db: DatabaseConnection,
}

impl RoomsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserModel, RoomsServiceError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(RoomsServiceError::UserNotFound)
    }

    /// Resolve the room and require `caller` to be its owner.
    async fn get_owned_room(
        &self,
        room_id: RoomId,
        caller: UserId,
    ) -> Result<RoomModel, RoomsServiceError> {
        let room = self.get_room(room_id).await?;
        if room.owner_id != caller {
            return Err(RoomsServiceError::Unauthorized);
        }
        Ok(room)
    }

    async fn membership(
        &self,
        room_id: RoomId,
        student_id: UserId,
    ) -> Result<Option<RoomStudentModel>, DbErr> {
        RoomStudent::find()
            .filter(RoomStudentColumn::RoomId.eq(room_id))
            .filter(RoomStudentColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
    }

    /// Draw codes until one is free. Re-checked against the unique index at
    /// insert time, so a race loses with a conflict instead of a duplicate.
    async fn mint_unique_invite_code(&self) -> Result<String, DbErr> {
        loop {
            let code = mint_invite_code();
            let taken = Room::find()
                .filter(RoomColumn::InviteCode.eq(code.clone()))
                .one(&self.db)
                .await?
                .is_some();
            if !taken {
                return Ok(code);
            }
        }
    }

    /// Create a room owned by `owner_id`. Only instructors hold rooms.
    pub async fn create_room(
        &self,
        owner_id: UserId,
        name: String,
        description: String,
    ) -> Result<RoomModel, RoomsServiceError> {
        let owner = self.get_user(owner_id).await?;
        if owner.role != UserRole::Instructor {
            return Err(RoomsServiceError::Unauthorized);
        }

        let invite_code = self.mint_unique_invite_code().await?;

        let room = RoomActiveModel {
            id: Set(RoomId::new()),
            owner_id: Set(owner_id),
            name: Set(name),
            description: Set(description),
            invite_code: Set(invite_code),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let room = Room::insert(room).exec_with_returning(&self.db).await?;
        info!(room = %room.id, "created room");
        Ok(room)
    }

    pub async fn get_room(&self, room_id: RoomId) -> Result<RoomModel, RoomsServiceError> {
        Room::find_by_id(room_id)
            .one(&self.db)
            .await?
            .ok_or(RoomsServiceError::RoomNotFound)
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomModel>, RoomsServiceError> {
        Ok(Room::find().all(&self.db).await?)
    }

    /// Instructors see the rooms they own; students the rooms they joined.
    pub async fn my_rooms(&self, user_id: UserId) -> Result<Vec<RoomModel>, RoomsServiceError> {
        let user = self.get_user(user_id).await?;

        let rooms = match user.role {
            UserRole::Instructor => {
                Room::find()
                    .filter(RoomColumn::OwnerId.eq(user_id))
                    .all(&self.db)
                    .await?
            }
            UserRole::Student => {
                let memberships = RoomStudent::find()
                    .filter(RoomStudentColumn::StudentId.eq(user_id))
                    .all(&self.db)
                    .await?;
                let room_ids: Vec<RoomId> = memberships.iter().map(|m| m.room_id).collect();
                Room::find()
                    .filter(RoomColumn::Id.is_in(room_ids))
                    .all(&self.db)
                    .await?
            }
        };

        Ok(rooms)
    }

    pub async fn update_room(
        &self,
        room_id: RoomId,
        caller: UserId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<RoomModel, RoomsServiceError> {
        let room = self.get_owned_room(room_id, caller).await?;

        let mut room: RoomActiveModel = room.into();
        if let Some(name) = name {
            room.name = Set(name);
        }
        if let Some(description) = description {
            room.description = Set(description);
        }

        let updated = room.update(&self.db).await?;
        Ok(updated)
    }

    /// Remove the room and everything it contains. The schema cascades
    /// through playlists, videos, comments, materials and memberships, so
    /// one statement takes the whole subtree or none of it.
    pub async fn delete_room(
        &self,
        room_id: RoomId,
        caller: UserId,
    ) -> Result<(), RoomsServiceError> {
        self.get_owned_room(room_id, caller).await?;

        Room::delete_by_id(room_id).exec(&self.db).await?;

        info!(room = %room_id, "deleted room");
        Ok(())
    }

    /// Replace the invite code. The old code stops resolving immediately;
    /// existing enrollment is untouched.
    pub async fn regenerate_invite_code(
        &self,
        room_id: RoomId,
        caller: UserId,
    ) -> Result<RoomModel, RoomsServiceError> {
        let room = self.get_owned_room(room_id, caller).await?;

        let invite_code = self.mint_unique_invite_code().await?;

        let mut room: RoomActiveModel = room.into();
        room.invite_code = Set(invite_code);
        let updated = room.update(&self.db).await?;

        Ok(updated)
    }

    /// Membership insert plus the enrolled notification, one transaction.
    async fn enroll(
        &self,
        room: &RoomModel,
        student: &UserModel,
    ) -> Result<RoomStudentModel, RoomsServiceError> {
        if student.role != UserRole::Student {
            return Err(RoomsServiceError::NotAStudent);
        }
        if self.membership(room.id, student.id).await?.is_some() {
            return Err(RoomsServiceError::AlreadyEnrolled);
        }

        let membership = RoomStudentActiveModel {
            id: Set(MembershipId::new()),
            room_id: Set(room.id),
            student_id: Set(student.id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let txn = self.db.begin().await?;
        let membership = RoomStudent::insert(membership)
            .exec_with_returning(&txn)
            .await?;
        Notification::insert(notify::enrolled(student.id, room))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(room = %room.id, student = %student.id, "enrolled student");
        Ok(membership)
    }

    /// Self-service enrollment. Codes match case-insensitively.
    pub async fn enroll_by_invite_code(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<RoomStudentModel, RoomsServiceError> {
        let student = self.get_user(user_id).await?;

        let room = Room::find()
            .filter(RoomColumn::InviteCode.eq(code.trim().to_uppercase()))
            .one(&self.db)
            .await?
            .ok_or(RoomsServiceError::InvalidInviteCode)?;

        self.enroll(&room, &student).await
    }

    /// Owner-initiated enrollment, same contract as the invite-code path.
    pub async fn add_student_to_room(
        &self,
        room_id: RoomId,
        student_id: UserId,
        caller: UserId,
    ) -> Result<RoomStudentModel, RoomsServiceError> {
        let room = self.get_owned_room(room_id, caller).await?;
        let student = self.get_user(student_id).await?;

        self.enroll(&room, &student).await
    }

    /// Drop a membership. The room owner may remove anyone; a student may
    /// remove themself.
    pub async fn remove_student_from_room(
        &self,
        room_id: RoomId,
        student_id: UserId,
        caller: UserId,
    ) -> Result<(), RoomsServiceError> {
        let room = self.get_room(room_id).await?;
        if caller != room.owner_id && caller != student_id {
            return Err(RoomsServiceError::Unauthorized);
        }

        let membership = self
            .membership(room_id, student_id)
            .await?
            .ok_or(RoomsServiceError::NotEnrolled)?;

        RoomStudent::delete_by_id(membership.id).exec(&self.db).await?;

        Ok(())
    }

    pub async fn list_students(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<UserModel>, RoomsServiceError> {
        self.get_room(room_id).await?;

        let memberships = RoomStudent::find()
            .filter(RoomStudentColumn::RoomId.eq(room_id))
            .all(&self.db)
            .await?;
        let student_ids: Vec<UserId> = memberships.iter().map(|m| m.student_id).collect();

        let students = User::find()
            .filter(UserColumn::Id.is_in(student_ids))
            .all(&self.db)
            .await?;

        Ok(students)
    }

    pub async fn room_stats(&self, room_id: RoomId) -> Result<RoomStats, RoomsServiceError> {
        self.get_room(room_id).await?;

        let students = RoomStudent::find()
            .filter(RoomStudentColumn::RoomId.eq(room_id))
            .count(&self.db)
            .await?;
        let playlists = Playlist::find()
            .filter(PlaylistColumn::RoomId.eq(room_id))
            .count(&self.db)
            .await?;
        let videos = Video::find()
            .filter(VideoColumn::RoomId.eq(room_id))
            .count(&self.db)
            .await?;
        let comments = Comment::find()
            .filter(CommentColumn::RoomId.eq(room_id))
            .count(&self.db)
            .await?;
        let open_questions = Comment::find()
            .filter(CommentColumn::RoomId.eq(room_id))
            .filter(CommentColumn::ParentId.is_null())
            .filter(CommentColumn::Resolved.eq(false))
            .count(&self.db)
            .await?;

        Ok(RoomStats {
            students,
            playlists,
            videos,
            comments,
            open_questions,
        })
    }

    /// Mean completion across enrolled students: each contributes the share
    /// of the room's videos they have watched (progress ≥ 90). Rooms with no
    /// videos or no students average to zero.
    pub async fn room_average_progress(
        &self,
        room_id: RoomId,
    ) -> Result<i32, RoomsServiceError> {
        self.get_room(room_id).await?;

        let video_ids: Vec<VideoId> = Video::find()
            .filter(VideoColumn::RoomId.eq(room_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        if video_ids.is_empty() {
            return Ok(0);
        }

        let memberships = RoomStudent::find()
            .filter(RoomStudentColumn::RoomId.eq(room_id))
            .all(&self.db)
            .await?;
        if memberships.is_empty() {
            return Ok(0);
        }

        let mut total = 0.0;
        for membership in &memberships {
            let watched = WatchProgress::find()
                .filter(WatchProgressColumn::UserId.eq(membership.student_id))
                .filter(WatchProgressColumn::VideoId.is_in(video_ids.clone()))
                .filter(WatchProgressColumn::Progress.gte(WATCHED_THRESHOLD))
                .count(&self.db)
                .await?;
            total += watched as f64 / video_ids.len() as f64 * 100.0;
        }

        Ok((total / memberships.len() as f64).round() as i32)
    }
}
