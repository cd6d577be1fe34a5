//! Constructors for the notification rows that ride along with writes.
//!
//! Keeping every trigger in one place makes the fan-out contract auditable:
//! one row per intended recipient, built here, inserted by the calling
//! service inside its own transaction.

use sea_orm::Set;

use crate::entity::prelude::*;
use crate::ids::{CommentId, NotificationId, UserId};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Greeting for a freshly registered account.
pub(crate) fn welcome(recipient: UserId, role: UserRole) -> NotificationActiveModel {
    let message = match role {
        UserRole::Instructor => "Start by creating your first room.",
        UserRole::Student => "Explore the available rooms and enroll.",
    };
    NotificationActiveModel {
        id: Set(NotificationId::new()),
        recipient_id: Set(recipient),
        kind: Set(NotificationKind::Welcome),
        title: Set("Welcome to CursoHub!".to_string()),
        message: Set(message.to_string()),
        read: Set(false),
        room_id: Set(None),
        video_id: Set(None),
        comment_id: Set(None),
        created_at: Set(now()),
    }
}

/// Confirmation sent to the student who just joined a room.
pub(crate) fn enrolled(recipient: UserId, room: &RoomModel) -> NotificationActiveModel {
    NotificationActiveModel {
        id: Set(NotificationId::new()),
        recipient_id: Set(recipient),
        kind: Set(NotificationKind::Enrolled),
        title: Set("Enrollment confirmed".to_string()),
        message: Set(format!("You are now enrolled in {}.", room.name)),
        read: Set(false),
        room_id: Set(Some(room.id)),
        video_id: Set(None),
        comment_id: Set(None),
        created_at: Set(now()),
    }
}

/// One per enrolled student when a video lands in their room.
pub(crate) fn new_video(
    recipient: UserId,
    room: &RoomModel,
    video: &VideoModel,
) -> NotificationActiveModel {
    NotificationActiveModel {
        id: Set(NotificationId::new()),
        recipient_id: Set(recipient),
        kind: Set(NotificationKind::NewVideo),
        title: Set("New video".to_string()),
        message: Set(format!("{} was added to {}.", video.title, room.name)),
        read: Set(false),
        room_id: Set(Some(room.id)),
        video_id: Set(Some(video.id)),
        comment_id: Set(None),
        created_at: Set(now()),
    }
}

/// One per enrolled student when a playlist is created in their room.
pub(crate) fn new_playlist(
    recipient: UserId,
    room: &RoomModel,
    playlist: &PlaylistModel,
) -> NotificationActiveModel {
    NotificationActiveModel {
        id: Set(NotificationId::new()),
        recipient_id: Set(recipient),
        kind: Set(NotificationKind::NewPlaylist),
        title: Set("New playlist".to_string()),
        message: Set(format!("{} was added to {}.", playlist.name, room.name)),
        read: Set(false),
        room_id: Set(Some(room.id)),
        video_id: Set(None),
        comment_id: Set(None),
        created_at: Set(now()),
    }
}

/// Sent to the room owner when a student opens a question thread.
pub(crate) fn new_question(
    recipient: UserId,
    author_name: &str,
    video: &VideoModel,
    comment_id: CommentId,
) -> NotificationActiveModel {
    NotificationActiveModel {
        id: Set(NotificationId::new()),
        recipient_id: Set(recipient),
        kind: Set(NotificationKind::NewQuestion),
        title: Set("New question".to_string()),
        message: Set(format!("{} asked a question on {}.", author_name, video.title)),
        read: Set(false),
        room_id: Set(Some(video.room_id)),
        video_id: Set(Some(video.id)),
        comment_id: Set(Some(comment_id)),
        created_at: Set(now()),
    }
}

/// Sent to the question author when the instructor answers.
pub(crate) fn comment_reply(
    recipient: UserId,
    replier_name: &str,
    video: &VideoModel,
    comment_id: CommentId,
) -> NotificationActiveModel {
    NotificationActiveModel {
        id: Set(NotificationId::new()),
        recipient_id: Set(recipient),
        kind: Set(NotificationKind::CommentReply),
        title: Set("Your question was answered".to_string()),
        message: Set(format!(
            "{} replied to your question on {}.",
            replier_name, video.title
        )),
        read: Set(false),
        room_id: Set(Some(video.room_id)),
        video_id: Set(Some(video.id)),
        comment_id: Set(Some(comment_id)),
        created_at: Set(now()),
    }
}
