use sea_orm::{sea_query::Expr, DatabaseConnection};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{CommentId, NotificationId, RoomId, UserId, VideoId},
};

/// Listing returns at most this many entries, newest first.
const INBOX_CAP: u64 = 50;

#[derive(Debug, Error)]
pub enum NotificationsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("recipient not found")]
    RecipientNotFound,

    #[error("notification not found")]
    NotificationNotFound,
}

impl NotificationsServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotificationsServiceError::DbError(_) => ErrorKind::Internal,
            NotificationsServiceError::RecipientNotFound => ErrorKind::NotFound,
            NotificationsServiceError::NotificationNotFound => ErrorKind::NotFound,
        }
    }
}

/// Everything an inbox entry carries besides its identity and read state.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub room_id: Option<RoomId>,
    pub video_id: Option<VideoId>,
    pub comment_id: Option<CommentId>,
}

#[derive(Clone)]
pub struct NotificationsService {
    db: DatabaseConnection,
}

impl NotificationsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append an entry to a user's inbox. Sibling services call this (or
    /// insert rows inside their own transactions); it is not a user-facing
    /// write.
    pub async fn add(
        &self,
        recipient_id: UserId,
        payload: NotificationPayload,
    ) -> Result<NotificationModel, NotificationsServiceError> {
        let recipient_exists = User::find_by_id(recipient_id)
            .one(&self.db)
            .await?
            .is_some();
        if !recipient_exists {
            return Err(NotificationsServiceError::RecipientNotFound);
        }

        let notification = NotificationActiveModel {
            id: Set(NotificationId::new()),
            recipient_id: Set(recipient_id),
            kind: Set(payload.kind),
            title: Set(payload.title),
            message: Set(payload.message),
            read: Set(false),
            room_id: Set(payload.room_id),
            video_id: Set(payload.video_id),
            comment_id: Set(payload.comment_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = Notification::insert(notification)
            .exec_with_returning(&self.db)
            .await?;

        Ok(result)
    }

    /// The 50 most recent entries, newest first.
    pub async fn list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<NotificationModel>, NotificationsServiceError> {
        let notifications = Notification::find()
            .filter(NotificationColumn::RecipientId.eq(user_id))
            .order_by_desc(NotificationColumn::CreatedAt)
            .limit(INBOX_CAP)
            .all(&self.db)
            .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: UserId) -> Result<u64, NotificationsServiceError> {
        let count = Notification::find()
            .filter(NotificationColumn::RecipientId.eq(user_id))
            .filter(NotificationColumn::Read.eq(false))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Idempotent: marking an already-read entry is a no-op.
    pub async fn mark_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<NotificationModel, NotificationsServiceError> {
        let notification = Notification::find_by_id(notification_id)
            .one(&self.db)
            .await?
            .ok_or(NotificationsServiceError::NotificationNotFound)?;

        if notification.read {
            return Ok(notification);
        }

        let mut notification: NotificationActiveModel = notification.into();
        notification.read = Set(true);
        let updated = notification.update(&self.db).await?;

        Ok(updated)
    }

    /// Returns how many entries flipped from unread to read.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, NotificationsServiceError> {
        let result = Notification::update_many()
            .col_expr(NotificationColumn::Read, Expr::value(true))
            .filter(NotificationColumn::RecipientId.eq(user_id))
            .filter(NotificationColumn::Read.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
