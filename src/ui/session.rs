//! Per-visitor session state: the draft reservation and one-shot notices.

use std::time::Duration;

use tokio::task::JoinHandle;
use tower_sessions::{session, ExpiredDeletion, Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{error, info};

use crate::config::Config;
use crate::db::{DbPool, Reservation};

/// Session key holding the draft reservation
pub const RESERVATION_KEY: &str = "reservation";

/// Message shown once on the next rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Flash,
    Warning,
    Error,
}

impl Notice {
    pub fn key(self) -> &'static str {
        match self {
            Notice::Flash => "flash",
            Notice::Warning => "warning",
            Notice::Error => "error",
        }
    }
}

/// Session store sharing the application pool; creates its table if needed
pub async fn open_store(db: &DbPool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(db.clone());
    store.migrate().await?;
    Ok(store)
}

/// Periodically purges expired sessions and the drafts they carry
pub fn spawn_expired_cleanup(store: SqliteStore, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting expired session cleanup");
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(every).await {
            error!(error = %e, "Expired session cleanup stopped");
        }
    })
}

pub fn session_layer(config: &Config, store: SqliteStore) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(config.session.cookie_name.clone())
        .with_secure(config.server.in_production)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            config.session.lifetime_hours,
        )))
}

pub async fn put_notice(
    session: &Session,
    notice: Notice,
    message: impl Into<String>,
) -> Result<(), session::Error> {
    session.insert(notice.key(), message.into()).await
}

/// Reads and clears a notice; empty when none was set
pub async fn take_notice(session: &Session, notice: Notice) -> Result<String, session::Error> {
    Ok(session
        .remove::<String>(notice.key())
        .await?
        .unwrap_or_default())
}

pub async fn load_draft(session: &Session) -> Result<Option<Reservation>, session::Error> {
    session.get::<Reservation>(RESERVATION_KEY).await
}

pub async fn store_draft(session: &Session, draft: &Reservation) -> Result<(), session::Error> {
    session.insert(RESERVATION_KEY, draft).await
}

pub async fn clear_draft(session: &Session) -> Result<(), session::Error> {
    session.remove::<Reservation>(RESERVATION_KEY).await?;
    Ok(())
}
