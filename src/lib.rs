pub mod api;
pub mod config;
pub mod db;
pub mod forms;
pub mod repository;
pub mod ui;
pub mod workflow;

pub use db::DbPool;

use config::Config;
use std::sync::Arc;
use tower_sessions_sqlx_store::SqliteStore;

use crate::repository::SqliteReservationRepository;
use crate::ui::Renderer;
use crate::workflow::ReservationWorkflow;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub workflow: ReservationWorkflow,
    pub sessions: SqliteStore,
    pub renderer: Renderer,
}

impl AppState {
    pub async fn new(config: Config, db: DbPool) -> anyhow::Result<Self> {
        let repo = Arc::new(SqliteReservationRepository::new(db.clone()));
        let sessions = ui::session::open_store(&db).await?;
        let renderer = Renderer::new(config.site.name.clone());

        Ok(Self {
            config,
            db,
            workflow: ReservationWorkflow::new(repo),
            sessions,
            renderer,
        })
    }
}
