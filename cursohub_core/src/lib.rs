pub mod entity;
pub mod ids;
pub mod models;
use tokio::sync::OnceCell;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::service::{
    accounts::AccountsService, comments::CommentsService, materials::MaterialsService,
    notifications::NotificationsService, playlists::PlaylistsService, rooms::RoomsService,
    videos::VideosService,
};

pub mod service;

pub mod error;

pub mod config;

static CURSOHUB_CORE: OnceCell<Arc<CursoHubCore>> = OnceCell::const_new();

pub async fn core() -> Arc<CursoHubCore> {
    CURSOHUB_CORE
        .get_or_init(|| async move {
            Arc::new(CursoHubCore::start().await.expect("failed to init"))
        })
        .await
        .clone()
}

/// Main runtime handle for CursoHub.
///
/// Opens (or creates) the database, runs migrations and hands out the
/// service set. The embedding layer keeps one of these for the process.
pub struct CursoHubCore {
    pub config: config::CursoHubConfig,

    /// Shared connection; every service holds a clone.
    pub db: DatabaseConnection,

    pub accounts: AccountsService,
    pub notifications: NotificationsService,
    pub rooms: RoomsService,
    pub playlists: PlaylistsService,
    pub videos: VideosService,
    pub comments: CommentsService,
    pub materials: MaterialsService,
}

impl CursoHubCore {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let config = config::get_or_init().await?;

        // DB + migrations
        let db = models::open_or_create_db(&config).await;
        models::migrate_up(db.clone()).await;

        info!("store ready at {}", config.database_path.display());

        Ok(Self {
            accounts: AccountsService::new(db.clone()),
            notifications: NotificationsService::new(db.clone()),
            rooms: RoomsService::new(db.clone()),
            playlists: PlaylistsService::new(db.clone()),
            videos: VideosService::new(db.clone()),
            comments: CommentsService::new(db.clone()),
            materials: MaterialsService::new(db.clone()),
            config,
            db,
        })
    }
}

pub mod prelude {
    pub use super::entity;
    pub use super::ids;
    pub use super::models;

    pub use super::service;

    pub use super::error;

    pub use super::config;
}
