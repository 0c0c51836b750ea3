//! Reservation models.
//!
//! The same [`Reservation`] value is the draft carried in the visitor's
//! session and, once `id` is set, the persisted record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{DateRange, STORAGE_DATE_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Assigned on persist
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: Option<i64>,
    /// Display snapshot of the room name, not stored in `reservations`
    #[serde(default)]
    pub room_name: String,
    /// Idempotency key for confirming this draft
    pub booking_token: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// A fresh draft holding only the stay dates
    pub fn draft(stay: DateRange) -> Self {
        Self {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            start_date: stay.start,
            end_date: stay.end,
            room_id: None,
            room_name: String::new(),
            booking_token: Uuid::new_v4(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn stay(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn start_date_display(&self) -> String {
        self.start_date.format(STORAGE_DATE_FORMAT).to_string()
    }

    pub fn end_date_display(&self) -> String {
        self.end_date.format(STORAGE_DATE_FORMAT).to_string()
    }

    /// Zero-padded reservation id, empty for an unsaved draft
    pub fn confirmation_number(&self) -> String {
        self.id.map(|id| format!("{:06}", id)).unwrap_or_default()
    }

    pub fn apply_contact(&mut self, contact: ContactDetails) {
        self.first_name = contact.first_name;
        self.last_name = contact.last_name;
        self.email = contact.email;
        self.phone = contact.phone;
    }
}

/// Guest fields posted by the reservation form
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}
