use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::{RepositoryError, RepositoryResult, ReservationRepository};
use crate::db::{format_storage_date, DbPool, Reservation, Room, RoomRestriction};

pub struct SqliteReservationRepository {
    db: DbPool,
}

impl SqliteReservationRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

async fn room_is_free(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
    room_id: i64,
) -> RepositoryResult<bool> {
    if start >= end {
        return Ok(false);
    }

    let blocking: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM room_restrictions
        WHERE room_id = ?
          AND start_date < ?
          AND ? < end_date
        "#,
    )
    .bind(room_id)
    .bind(format_storage_date(end))
    .bind(format_storage_date(start))
    .fetch_one(&mut *conn)
    .await?;

    Ok(blocking == 0)
}

async fn insert_reservation_row(
    conn: &mut SqliteConnection,
    reservation: &Reservation,
) -> RepositoryResult<i64> {
    let room_id = reservation
        .room_id
        .ok_or_else(|| RepositoryError::InvalidData("reservation has no room".to_string()))?;
    if reservation.start_date >= reservation.end_date {
        return Err(RepositoryError::InvalidData(
            "reservation must end after it starts".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO reservations
            (first_name, last_name, email, phone, start_date, end_date,
             room_id, booking_token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&reservation.first_name)
    .bind(&reservation.last_name)
    .bind(&reservation.email)
    .bind(&reservation.phone)
    .bind(format_storage_date(reservation.start_date))
    .bind(format_storage_date(reservation.end_date))
    .bind(room_id)
    .bind(reservation.booking_token.to_string())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn insert_restriction_row(
    conn: &mut SqliteConnection,
    restriction: &RoomRestriction,
) -> RepositoryResult<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO room_restrictions
            (start_date, end_date, room_id, reservation_id, restriction_id,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(format_storage_date(restriction.start_date))
    .bind(format_storage_date(restriction.end_date))
    .bind(restriction.room_id)
    .bind(restriction.reservation_id)
    .bind(restriction.kind.id())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepository {
    async fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Room>> {
        if start >= end {
            return Ok(Vec::new());
        }

        let rooms: Vec<Room> = sqlx::query_as(
            r#"
            SELECT r.id, r.room_name
            FROM rooms r
            WHERE r.id NOT IN (
                SELECT rr.room_id
                FROM room_restrictions rr
                WHERE rr.start_date < ?
                  AND ? < rr.end_date
            )
            ORDER BY r.id
            "#,
        )
        .bind(format_storage_date(end))
        .bind(format_storage_date(start))
        .fetch_all(&self.db)
        .await?;

        debug!(%start, %end, available = rooms.len(), "Searched availability");
        Ok(rooms)
    }

    async fn search_availability_by_dates_by_room_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i64,
    ) -> RepositoryResult<bool> {
        let mut conn = self.db.acquire().await?;
        room_is_free(&mut conn, start, end, room_id).await
    }

    async fn get_room_by_id(&self, id: i64) -> RepositoryResult<Room> {
        sqlx::query_as("SELECT id, room_name FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Room {}", id)))
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> RepositoryResult<i64> {
        let mut conn = self.db.acquire().await?;
        insert_reservation_row(&mut conn, reservation).await
    }

    async fn insert_room_restriction(&self, restriction: &RoomRestriction) -> RepositoryResult<()> {
        let mut conn = self.db.acquire().await?;
        insert_restriction_row(&mut conn, restriction).await
    }

    async fn confirm_reservation(&self, reservation: &Reservation) -> RepositoryResult<i64> {
        let mut tx = self.db.begin().await?;

        // A retried or double-submitted draft resolves to the first booking
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM reservations WHERE booking_token = ?")
                .bind(reservation.booking_token.to_string())
                .fetch_optional(&mut *tx)
                .await?;
        if let Some(id) = existing {
            tx.commit().await?;
            info!(reservation_id = id, "Reservation already confirmed for this draft");
            return Ok(id);
        }

        let room_id = reservation
            .room_id
            .ok_or_else(|| RepositoryError::InvalidData("reservation has no room".to_string()))?;
        if !room_is_free(&mut tx, reservation.start_date, reservation.end_date, room_id).await? {
            return Err(RepositoryError::Conflict(format!(
                "room {} is already booked between {} and {}",
                room_id, reservation.start_date, reservation.end_date
            )));
        }

        let id = insert_reservation_row(&mut tx, reservation).await?;
        let restriction = RoomRestriction::for_reservation(reservation, id)
            .ok_or_else(|| RepositoryError::InvalidData("reservation has no room".to_string()))?;
        insert_restriction_row(&mut tx, &restriction).await?;

        tx.commit().await?;

        info!(reservation_id = id, room_id, "Reservation confirmed");
        Ok(id)
    }
}
