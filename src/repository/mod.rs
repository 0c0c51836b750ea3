//! Storage boundary for rooms, reservations and room restrictions.

mod sqlite;

pub use sqlite::SqliteReservationRepository;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::db::{Reservation, Room, RoomRestriction};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflicting booking: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Reservation storage.
///
/// All date ranges are half-open: a room is free for `[start, end)` unless a
/// restriction `[s, e)` exists with `s < end && start < e`.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Rooms with no restriction overlapping `[start, end)`
    async fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Room>>;

    /// Whether `room_id` has no restriction overlapping `[start, end)`
    async fn search_availability_by_dates_by_room_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i64,
    ) -> RepositoryResult<bool>;

    async fn get_room_by_id(&self, id: i64) -> RepositoryResult<Room>;

    /// Stores the reservation and returns its generated id
    async fn insert_reservation(&self, reservation: &Reservation) -> RepositoryResult<i64>;

    async fn insert_room_restriction(&self, restriction: &RoomRestriction) -> RepositoryResult<()>;

    /// Stores a reservation together with its reservation-kind restriction.
    ///
    /// Implementations backed by a transactional store should override this
    /// so both rows commit or neither does.
    async fn confirm_reservation(&self, reservation: &Reservation) -> RepositoryResult<i64> {
        let id = self.insert_reservation(reservation).await?;
        let restriction = RoomRestriction::for_reservation(reservation, id)
            .ok_or_else(|| RepositoryError::InvalidData("reservation has no room".to_string()))?;
        self.insert_room_restriction(&restriction).await?;
        Ok(id)
    }
}
