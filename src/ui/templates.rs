// Askama template definitions

use askama::Template;

use super::render::PageContext;
use crate::db::{Reservation, Room};
use crate::forms::Form;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "panda_suite.html")]
pub struct PandaSuiteTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "bamboo_dorm.html")]
pub struct BambooDormTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "search_availability.html")]
pub struct SearchAvailabilityTemplate {
    pub ctx: PageContext,
}

// Rooms free for the searched stay
#[derive(Template)]
#[template(path = "choose_room.html")]
pub struct ChooseRoomTemplate {
    pub ctx: PageContext,
    pub rooms: Vec<Room>,
    pub start_date: String,
    pub end_date: String,
}

// Contact details form, pre-filled from the draft
#[derive(Template)]
#[template(path = "make_reservation.html")]
pub struct MakeReservationTemplate {
    pub ctx: PageContext,
    pub reservation: Reservation,
    pub form: Form,
}

#[derive(Template)]
#[template(path = "reservation_summary.html")]
pub struct ReservationSummaryTemplate {
    pub ctx: PageContext,
    pub reservation: Reservation,
}
