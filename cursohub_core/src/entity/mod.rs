// SeaORM entities, one module per table. Referential integrity lives in
// the migrations (cascading foreign keys + unique indexes); the services
// layer adds the checks the schema cannot express.

pub mod comment;
pub mod material;
pub mod notification;
pub mod password_reset;
pub mod playlist;
pub mod room;
pub mod room_student;
pub mod user;
pub mod video;
pub mod watch_progress;


pub mod prelude {
    // Re-export all entities for convenience
    pub use super::comment::{
        ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comment,
        Model as CommentModel,
    };
    pub use super::material::{
        ActiveModel as MaterialActiveModel, Column as MaterialColumn, Entity as Material,
        MaterialKind, Model as MaterialModel,
    };
    pub use super::notification::{
        ActiveModel as NotificationActiveModel, Column as NotificationColumn,
        Entity as Notification, Model as NotificationModel, NotificationKind,
    };
    pub use super::password_reset::{
        ActiveModel as PasswordResetActiveModel, Column as PasswordResetColumn,
        Entity as PasswordReset, Model as PasswordResetModel,
    };
    pub use super::playlist::{
        ActiveModel as PlaylistActiveModel, Column as PlaylistColumn, Entity as Playlist,
        Model as PlaylistModel,
    };
    pub use super::room::{
        ActiveModel as RoomActiveModel, Column as RoomColumn, Entity as Room, Model as RoomModel,
    };
    pub use super::room_student::{
        ActiveModel as RoomStudentActiveModel, Column as RoomStudentColumn, Entity as RoomStudent,
        Model as RoomStudentModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
        UserRole,
    };
    pub use super::video::{
        ActiveModel as VideoActiveModel, Column as VideoColumn, Entity as Video,
        Model as VideoModel,
    };
    pub use super::watch_progress::{
        ActiveModel as WatchProgressActiveModel, Column as WatchProgressColumn,
        Entity as WatchProgress, Model as WatchProgressModel, WATCHED_THRESHOLD,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        Condition,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DbConn,
        // Common result types
        DbErr,
        Delete,

        // Core traits
        EntityTrait,
        Insert,
        ItemsAndPagesNumber,
        Linked,

        ModelTrait,
        NotSet,
        // Pagination
        Paginator,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        RelationTrait,
        // Query builders
        Select,
        // Active model helpers
        Set,
        TransactionTrait,
        TryInsertResult,

        Unchanged,
        Update,
    };
}
