//! Room restriction models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::reservation::Reservation;

/// Why a room is blocked. The discriminant is the row id in `restrictions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    Reservation = 1,
    OwnerBlock = 2,
}

impl RestrictionKind {
    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            RestrictionKind::Reservation => "Reservation",
            RestrictionKind::OwnerBlock => "Owner Block",
        }
    }

    pub fn all() -> [RestrictionKind; 2] {
        [RestrictionKind::Reservation, RestrictionKind::OwnerBlock]
    }
}

/// A blocked `[start_date, end_date)` range on a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRestriction {
    pub id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i64,
    pub reservation_id: Option<i64>,
    pub kind: RestrictionKind,
}

impl RoomRestriction {
    /// Restriction recording a confirmed stay. Returns `None` if the
    /// reservation has no room.
    pub fn for_reservation(reservation: &Reservation, reservation_id: i64) -> Option<Self> {
        Some(Self {
            id: None,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            room_id: reservation.room_id?,
            reservation_id: Some(reservation_id),
            kind: RestrictionKind::Reservation,
        })
    }
}
