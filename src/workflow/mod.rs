//! Reservation workflow.
//!
//! Search → choose room → fill in contact details → confirm → summary.
//! Between requests the in-progress [`Reservation`] lives in the visitor's
//! session; every transition takes that draft as an explicit argument and
//! hands back the value the caller must store (or remove). Nothing here
//! touches the session directly.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{
    parse_date, ContactDetails, DateRange, Reservation, Room, SEARCH_DATE_FORMAT,
};
use crate::forms::{Form, FormValues};
use crate::repository::{RepositoryError, ReservationRepository};

/// Where a visitor is in the booking flow, judged from the session draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Browsing,
    SearchedAvailability,
    ReservationFormShown,
    Persisted,
}

impl WorkflowState {
    pub fn of(draft: Option<&Reservation>) -> Self {
        match draft {
            None => WorkflowState::Browsing,
            Some(d) if d.is_persisted() => WorkflowState::Persisted,
            Some(d) if d.room_id.is_some() => WorkflowState::ReservationFormShown,
            Some(_) => WorkflowState::SearchedAvailability,
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid {field} date '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("The end date must be after the start date")]
    InvalidDateRange,

    #[error("Invalid room id '{0}'")]
    InvalidRoomId(String),

    #[error("No reservation in session")]
    MissingDraft,

    #[error("No room has been chosen for this reservation")]
    NoRoomChosen,

    #[error("This reservation has already been confirmed")]
    AlreadyConfirmed,

    #[error("This reservation has not been confirmed yet")]
    NotConfirmed,

    #[error("The room is no longer available for these dates")]
    RoomUnavailable,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug)]
pub enum SearchOutcome {
    /// Nothing free: no draft is created
    NoAvailability,
    /// Store `draft` in the session and offer `rooms`
    Available { draft: Reservation, rooms: Vec<Room> },
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Re-show the form; the session keeps its previous draft
    Invalid { draft: Reservation, form: Form },
    /// Store the confirmed reservation in the session
    Persisted(Reservation),
}

/// Result of a single-room availability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAvailability {
    pub room_id: i64,
    pub stay: DateRange,
    pub available: bool,
}

pub fn parse_stay(start: &str, end: &str) -> WorkflowResult<DateRange> {
    let start_date = parse_date(start, SEARCH_DATE_FORMAT).ok_or_else(|| WorkflowError::InvalidDate {
        field: "start",
        value: start.to_string(),
    })?;
    let end_date = parse_date(end, SEARCH_DATE_FORMAT).ok_or_else(|| WorkflowError::InvalidDate {
        field: "end",
        value: end.to_string(),
    })?;

    DateRange::new(start_date, end_date).ok_or(WorkflowError::InvalidDateRange)
}

pub fn parse_room_id(value: &str) -> WorkflowResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| WorkflowError::InvalidRoomId(value.to_string()))
}

/// Runs the reservation form checks over the posted values
pub fn validate_contact(values: FormValues) -> Form {
    let mut form = Form::new(values);
    form.required(&["first_name", "last_name", "email"]);
    form.min_length("first_name", 3);
    form.is_email("email");
    form
}

fn contact_from(values: &FormValues) -> ContactDetails {
    ContactDetails {
        first_name: values.get("first_name").trim().to_string(),
        last_name: values.get("last_name").trim().to_string(),
        email: values.get("email").trim().to_string(),
        phone: values.get("phone").trim().to_string(),
    }
}

/// A draft in ReservationFormShown, with its room
fn form_draft(draft: Option<Reservation>) -> WorkflowResult<(Reservation, i64)> {
    match WorkflowState::of(draft.as_ref()) {
        WorkflowState::Browsing => Err(WorkflowError::MissingDraft),
        WorkflowState::SearchedAvailability => Err(WorkflowError::NoRoomChosen),
        WorkflowState::Persisted => Err(WorkflowError::AlreadyConfirmed),
        WorkflowState::ReservationFormShown => {
            let draft = draft.ok_or(WorkflowError::MissingDraft)?;
            let room_id = draft.room_id.ok_or(WorkflowError::NoRoomChosen)?;
            Ok((draft, room_id))
        }
    }
}

#[derive(Clone)]
pub struct ReservationWorkflow {
    repo: Arc<dyn ReservationRepository>,
}

impl ReservationWorkflow {
    pub fn new(repo: Arc<dyn ReservationRepository>) -> Self {
        Self { repo }
    }

    /// Browsing → SearchedAvailability. The only step besides
    /// [`book_room`](Self::book_room) that creates a draft.
    pub async fn search(&self, start: &str, end: &str) -> WorkflowResult<SearchOutcome> {
        let stay = parse_stay(start, end)?;

        let rooms = self
            .repo
            .search_availability_for_all_rooms(stay.start, stay.end)
            .await?;

        if rooms.is_empty() {
            info!(start = %stay.start, end = %stay.end, "No availability");
            return Ok(SearchOutcome::NoAvailability);
        }

        debug!(start = %stay.start, end = %stay.end, rooms = rooms.len(), "Rooms available");
        Ok(SearchOutcome::Available {
            draft: Reservation::draft(stay),
            rooms,
        })
    }

    /// SearchedAvailability → ReservationFormShown. Picking again before
    /// confirming replaces the room.
    pub async fn choose_room(
        &self,
        draft: Option<Reservation>,
        room_id: i64,
    ) -> WorkflowResult<Reservation> {
        let mut draft = match WorkflowState::of(draft.as_ref()) {
            WorkflowState::Browsing => return Err(WorkflowError::MissingDraft),
            WorkflowState::Persisted => return Err(WorkflowError::AlreadyConfirmed),
            WorkflowState::SearchedAvailability | WorkflowState::ReservationFormShown => {
                draft.ok_or(WorkflowError::MissingDraft)?
            }
        };

        if draft.room_id != Some(room_id) {
            draft.room_name.clear();
        }
        draft.room_id = Some(room_id);

        debug!(room_id, token = %draft.booking_token, "Room chosen");
        Ok(draft)
    }

    /// Starts a draft for one room straight from a room page link.
    /// The room must be free for the whole stay.
    pub async fn book_room(&self, room_id: i64, start: &str, end: &str) -> WorkflowResult<Reservation> {
        let stay = parse_stay(start, end)?;
        let room = self.repo.get_room_by_id(room_id).await?;

        let free = self
            .repo
            .search_availability_by_dates_by_room_id(stay.start, stay.end, room.id)
            .await?;
        if !free {
            info!(room_id, start = %stay.start, end = %stay.end, "Room page booking for taken dates");
            return Err(WorkflowError::RoomUnavailable);
        }

        let mut draft = Reservation::draft(stay);
        draft.room_id = Some(room.id);
        draft.room_name = room.room_name;

        debug!(room_id, token = %draft.booking_token, "Draft started from room page");
        Ok(draft)
    }

    /// Entry into ReservationFormShown: refreshes the room name snapshot.
    /// The returned draft goes back into the session.
    pub async fn show_form(&self, draft: Option<Reservation>) -> WorkflowResult<Reservation> {
        let (mut draft, room_id) = form_draft(draft)?;

        let room = self.repo.get_room_by_id(room_id).await?;
        draft.room_name = room.room_name;

        Ok(draft)
    }

    /// ReservationFormShown → Persisted, or back to the form when the
    /// contact details do not validate.
    ///
    /// Dates and room always come from the session draft; the form only
    /// carries contact details.
    pub async fn submit(
        &self,
        draft: Option<Reservation>,
        values: FormValues,
    ) -> WorkflowResult<SubmitOutcome> {
        let draft = match (WorkflowState::of(draft.as_ref()), draft) {
            (WorkflowState::Persisted, Some(done)) => {
                info!(reservation_id = ?done.id, "Ignoring repeated submit of a confirmed reservation");
                return Ok(SubmitOutcome::Persisted(done));
            }
            (_, draft) => draft,
        };
        let (mut draft, room_id) = form_draft(draft)?;
        let stay = draft.stay().ok_or(WorkflowError::InvalidDateRange)?;

        draft.apply_contact(contact_from(&values));

        let form = validate_contact(values);
        if !form.valid() {
            debug!(token = %draft.booking_token, "Reservation form invalid");
            return Ok(SubmitOutcome::Invalid { draft, form });
        }

        let free = self
            .repo
            .search_availability_by_dates_by_room_id(stay.start, stay.end, room_id)
            .await?;
        if !free {
            warn!(room_id, start = %stay.start, end = %stay.end, "Room taken before confirmation");
            return Err(WorkflowError::RoomUnavailable);
        }

        let id = self.repo.confirm_reservation(&draft).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => WorkflowError::RoomUnavailable,
            other => WorkflowError::Repository(other),
        })?;

        let now = chrono::Utc::now();
        draft.id = Some(id);
        draft.created_at = Some(now);
        draft.updated_at = Some(now);

        info!(reservation_id = id, room_id, "Reservation persisted");
        Ok(SubmitOutcome::Persisted(draft))
    }

    /// Persisted → SummaryShown. On success the caller removes the draft
    /// from the session so the summary is shown once.
    pub fn summary(&self, draft: Option<Reservation>) -> WorkflowResult<Reservation> {
        match (WorkflowState::of(draft.as_ref()), draft) {
            (WorkflowState::Persisted, Some(draft)) => Ok(draft),
            (_, None) => Err(WorkflowError::MissingDraft),
            (_, Some(_)) => Err(WorkflowError::NotConfirmed),
        }
    }

    pub async fn check_room_availability(
        &self,
        start: &str,
        end: &str,
        room_id: &str,
    ) -> WorkflowResult<RoomAvailability> {
        let stay = parse_stay(start, end)?;
        let room_id = parse_room_id(room_id)?;

        let available = self
            .repo
            .search_availability_by_dates_by_room_id(stay.start, stay.end, room_id)
            .await?;

        Ok(RoomAvailability {
            room_id,
            stay,
            available,
        })
    }
}
