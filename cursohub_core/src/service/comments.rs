use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::info;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{CommentId, UserId, VideoId},
    service::notify,
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("video not found")]
    VideoNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("parent must be a top-level comment on the same video")]
    InvalidParent,

    #[error("only top-level comments can be resolved")]
    NotAQuestion,

    #[error("unauthorized")]
    Unauthorized,
}

impl CommentsServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommentsServiceError::DbError(_) => ErrorKind::Internal,
            CommentsServiceError::VideoNotFound => ErrorKind::NotFound,
            CommentsServiceError::CommentNotFound => ErrorKind::NotFound,
            CommentsServiceError::UserNotFound => ErrorKind::NotFound,
            CommentsServiceError::InvalidParent => ErrorKind::InvalidState,
            CommentsServiceError::NotAQuestion => ErrorKind::InvalidState,
            CommentsServiceError::Unauthorized => ErrorKind::Unauthorized,
        }
    }
}

#[derive(Clone)]
pub struct CommentsService {
    db: DatabaseConnection,
}

impl CommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn get_comment(
        &self,
        comment_id: CommentId,
    ) -> Result<CommentModel, CommentsServiceError> {
        Comment::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::CommentNotFound)
    }

    /// Post a remark or question on a video, or a reply to a top-level
    /// comment. Thread depth is capped at two: a reply can never be a
    /// parent.
    ///
    /// Side effects, committed with the comment: a student's new question
    /// notifies the room owner; an instructor's reply notifies the question
    /// author (unless replying to themself).
    pub async fn add_comment(
        &self,
        video_id: VideoId,
        author_id: UserId,
        content: String,
        parent_id: Option<CommentId>,
    ) -> Result<CommentModel, CommentsServiceError> {
        let author = User::find_by_id(author_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::UserNotFound)?;
        let video = Video::find_by_id(video_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::VideoNotFound)?;

        let parent = match parent_id {
            None => None,
            Some(parent_id) => {
                let parent = Comment::find_by_id(parent_id)
                    .one(&self.db)
                    .await?
                    .ok_or(CommentsServiceError::InvalidParent)?;
                if parent.video_id != video_id || parent.parent_id.is_some() {
                    return Err(CommentsServiceError::InvalidParent);
                }
                Some(parent)
            }
        };

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            video_id: Set(video_id),
            room_id: Set(video.room_id),
            author_id: Set(author_id),
            author_role: Set(author.role),
            content: Set(content),
            parent_id: Set(parent_id),
            resolved: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let txn = self.db.begin().await?;
        let comment = Comment::insert(comment).exec_with_returning(&txn).await?;

        match (&parent, author.role) {
            // A student opened a question thread: the room owner hears about it.
            (None, UserRole::Student) => {
                let room = Room::find_by_id(video.room_id)
                    .one(&txn)
                    .await?
                    .ok_or(CommentsServiceError::VideoNotFound)?;
                Notification::insert(notify::new_question(
                    room.owner_id,
                    &author.display_name,
                    &video,
                    comment.id,
                ))
                .exec(&txn)
                .await?;
            }
            // The instructor answered: the question author hears about it.
            (Some(parent), UserRole::Instructor) if parent.author_id != author_id => {
                Notification::insert(notify::comment_reply(
                    parent.author_id,
                    &author.display_name,
                    &video,
                    comment.id,
                ))
                .exec(&txn)
                .await?;
            }
            _ => {}
        }

        txn.commit().await?;

        info!(comment = %comment.id, video = %video_id, "added comment");
        Ok(comment)
    }

    /// Close a question thread. Only the room owner may resolve; resolving
    /// again is a no-op.
    pub async fn mark_resolved(
        &self,
        comment_id: CommentId,
        caller: UserId,
    ) -> Result<CommentModel, CommentsServiceError> {
        let comment = self.get_comment(comment_id).await?;
        if comment.parent_id.is_some() {
            return Err(CommentsServiceError::NotAQuestion);
        }

        let room = Room::find_by_id(comment.room_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::CommentNotFound)?;
        if room.owner_id != caller {
            return Err(CommentsServiceError::Unauthorized);
        }

        if comment.resolved {
            return Ok(comment);
        }

        let mut comment: CommentActiveModel = comment.into();
        comment.resolved = Set(true);
        let updated = comment.update(&self.db).await?;

        Ok(updated)
    }

    /// Remove a comment and, when it heads a thread, its replies. Allowed
    /// for the author and for the room owner.
    pub async fn delete_comment(
        &self,
        comment_id: CommentId,
        caller: UserId,
    ) -> Result<(), CommentsServiceError> {
        let comment = self.get_comment(comment_id).await?;

        if comment.author_id != caller {
            let room = Room::find_by_id(comment.room_id)
                .one(&self.db)
                .await?
                .ok_or(CommentsServiceError::CommentNotFound)?;
            if room.owner_id != caller {
                return Err(CommentsServiceError::Unauthorized);
            }
        }

        let txn = self.db.begin().await?;
        Comment::delete_many()
            .filter(CommentColumn::ParentId.eq(comment_id))
            .exec(&txn)
            .await?;
        Comment::delete_by_id(comment_id).exec(&txn).await?;
        txn.commit().await?;

        info!(comment = %comment_id, "deleted comment");
        Ok(())
    }

    /// All comments on a video in conversation order.
    pub async fn list_for_video(
        &self,
        video_id: VideoId,
    ) -> Result<Vec<CommentModel>, CommentsServiceError> {
        let comments = Comment::find()
            .filter(CommentColumn::VideoId.eq(video_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(comments)
    }

    pub async fn list_replies(
        &self,
        comment_id: CommentId,
    ) -> Result<Vec<CommentModel>, CommentsServiceError> {
        let replies = Comment::find()
            .filter(CommentColumn::ParentId.eq(comment_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(replies)
    }

    pub async fn count_for_video(
        &self,
        video_id: VideoId,
    ) -> Result<u64, CommentsServiceError> {
        let count = Comment::find()
            .filter(CommentColumn::VideoId.eq(video_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
