//! Database seeders for built-in data
//!
//! Rooms and restriction kinds are upserted on every startup so renames in
//! code reach existing databases.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use super::models::RestrictionKind;

/// Rooms offered by the house: (id, name)
pub const ROOMS: [(i64, &str); 2] = [(1, "Panda Suite"), (2, "Bamboo Dorm")];

pub async fn seed_rooms(pool: &SqlitePool) -> Result<()> {
    info!("Seeding rooms...");
    let now = chrono::Utc::now().to_rfc3339();

    for (id, name) in ROOMS {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, room_name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                room_name = excluded.room_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn seed_restrictions(pool: &SqlitePool) -> Result<()> {
    info!("Seeding restriction kinds...");
    let now = chrono::Utc::now().to_rfc3339();

    for kind in RestrictionKind::all() {
        sqlx::query(
            r#"
            INSERT INTO restrictions (id, restriction_name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                restriction_name = excluded.restriction_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind.id())
        .bind(kind.name())
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    Ok(())
}
