// Public website: informational pages and the reservation flow.
// Server-side rendered with Askama templates.

mod error;
mod render;
pub mod session;
mod templates;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::warn;

use crate::forms::{Form as ContactForm, FormValues};
use crate::workflow::{parse_room_id, SearchOutcome, SubmitOutcome, WorkflowError};
use crate::AppState;

pub use error::PageError;
pub use render::{PageContext, Renderer};
pub use templates::*;

use session::{clear_draft, load_draft, put_notice, store_draft, Notice};

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/panda-suite", get(panda_suite))
        .route("/bamboo-dorm", get(bamboo_dorm))
        .route(
            "/search-availability",
            get(search_availability).post(post_search_availability),
        )
        .route("/choose-room/:id", get(choose_room))
        .route("/book-room", get(book_room))
        .route(
            "/make-reservation",
            get(make_reservation).post(post_make_reservation),
        )
        .route("/reservation-summary", get(reservation_summary))
}

// Turn navigation errors into a notice plus redirect; anything else fails the request
async fn recover(session: &Session, err: WorkflowError) -> Result<Response, PageError> {
    let (notice, to) = match err {
        WorkflowError::MissingDraft => ("Can't get reservation from session", "/"),
        WorkflowError::NotConfirmed => ("Please complete your reservation first", "/"),
        WorkflowError::NoRoomChosen => ("Please choose a room first", "/search-availability"),
        WorkflowError::RoomUnavailable => (
            "Sorry, that room is no longer available for your dates",
            "/search-availability",
        ),
        WorkflowError::AlreadyConfirmed => {
            return Ok(Redirect::to("/reservation-summary").into_response())
        }
        other => return Err(other.into()),
    };

    warn!(redirect = to, "{}", notice);
    put_notice(session, Notice::Error, notice).await?;
    Ok(Redirect::to(to).into_response())
}

// Home page
async fn home(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&HomeTemplate { ctx })
}

// About page
async fn about(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&AboutTemplate { ctx })
}

// Contact page
async fn contact(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&ContactTemplate { ctx })
}

async fn panda_suite(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&PandaSuiteTemplate { ctx })
}

async fn bamboo_dorm(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&BambooDormTemplate { ctx })
}

// Search form
async fn search_availability(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&SearchAvailabilityTemplate { ctx })
}

#[derive(Deserialize)]
struct SearchForm {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
}

// Search submit: list free rooms and start a draft
async fn post_search_availability(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> Result<Response, PageError> {
    match state.workflow.search(&form.start, &form.end).await? {
        SearchOutcome::NoAvailability => {
            put_notice(&session, Notice::Error, "No availability").await?;
            Ok(Redirect::to("/search-availability").into_response())
        }
        SearchOutcome::Available { draft, rooms } => {
            store_draft(&session, &draft).await?;

            let ctx = state.renderer.context(&session).await?;
            state.renderer.render(&ChooseRoomTemplate {
                ctx,
                rooms,
                start_date: draft.start_date_display(),
                end_date: draft.end_date_display(),
            })
        }
    }
}

// Room picked from the search results
async fn choose_room(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let room_id = parse_room_id(&id)?;
    let draft = load_draft(&session).await?;

    match state.workflow.choose_room(draft, room_id).await {
        Ok(draft) => {
            store_draft(&session, &draft).await?;
            Ok(Redirect::to("/make-reservation").into_response())
        }
        Err(e) => recover(&session, e).await,
    }
}

#[derive(Deserialize)]
struct BookRoomQuery {
    #[serde(default)]
    id: String,
    #[serde(default)]
    s: String,
    #[serde(default)]
    e: String,
}

// Book a specific room straight from its page
async fn book_room(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<BookRoomQuery>,
) -> Result<Response, PageError> {
    let room_id = parse_room_id(&query.id)?;

    match state.workflow.book_room(room_id, &query.s, &query.e).await {
        Ok(draft) => {
            store_draft(&session, &draft).await?;
            Ok(Redirect::to("/make-reservation").into_response())
        }
        Err(e) => recover(&session, e).await,
    }
}

// Reservation form
async fn make_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let draft = load_draft(&session).await?;

    let draft = match state.workflow.show_form(draft).await {
        Ok(draft) => draft,
        Err(e) => return recover(&session, e).await,
    };
    store_draft(&session, &draft).await?;

    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&MakeReservationTemplate {
        ctx,
        reservation: draft,
        form: ContactForm::default(),
    })
}

// Reservation form submit
async fn post_make_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let draft = load_draft(&session).await?;
    let values = FormValues::from_pairs(fields);

    match state.workflow.submit(draft, values).await {
        Ok(SubmitOutcome::Invalid { draft, form }) => {
            // The session keeps the last valid draft
            let ctx = state.renderer.context(&session).await?;
            state.renderer.render(&MakeReservationTemplate {
                ctx,
                reservation: draft,
                form,
            })
        }
        Ok(SubmitOutcome::Persisted(reservation)) => {
            store_draft(&session, &reservation).await?;
            Ok(Redirect::to("/reservation-summary").into_response())
        }
        Err(e) => recover(&session, e).await,
    }
}

// Confirmation page, shown once per reservation
async fn reservation_summary(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let draft = load_draft(&session).await?;

    let reservation = match state.workflow.summary(draft) {
        Ok(reservation) => reservation,
        Err(e) => return recover(&session, e).await,
    };
    clear_draft(&session).await?;

    let ctx = state.renderer.context(&session).await?;
    state.renderer.render(&ReservationSummaryTemplate { ctx, reservation })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::{self, DbPool, RestrictionKind, RoomRestriction};
    use crate::repository::{ReservationRepository, SqliteReservationRepository};

    async fn app() -> (Router, Arc<AppState>) {
        let pool = db::init_in_memory().await.unwrap();
        let state = Arc::new(AppState::new(Config::default(), pool).await.unwrap());
        (crate::api::create_router(state.clone()), state)
    }

    async fn block_room(pool: &DbPool, room_id: i64, start: (i32, u32, u32), end: (i32, u32, u32)) {
        let date = |(y, m, d)| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
        SqliteReservationRepository::new(pool.clone())
            .insert_room_restriction(&RoomRestriction {
                id: None,
                start_date: date(start),
                end_date: date(end),
                room_id,
                reservation_id: None,
                kind: RestrictionKind::OwnerBlock,
            })
            .await
            .unwrap();
    }

    async fn reservations(pool: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    /// A browser that keeps its session cookie between requests
    struct Visitor {
        app: Router,
        cookie: Option<String>,
    }

    struct Page {
        status: StatusCode,
        location: Option<String>,
        body: String,
    }

    impl Visitor {
        fn new(app: Router) -> Self {
            Self { app, cookie: None }
        }

        async fn get(&mut self, uri: &str) -> Page {
            let request = Request::builder().uri(uri);
            self.send(request, Body::empty()).await
        }

        async fn post(&mut self, uri: &str, form: &str) -> Page {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            self.send(request, Body::from(form.to_string())).await
        }

        async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> Page {
            if let Some(cookie) = &self.cookie {
                request = request.header(header::COOKIE, cookie);
            }

            let response = self
                .app
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap();

            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie
                    .to_str()
                    .unwrap()
                    .split(';')
                    .next()
                    .unwrap()
                    .to_string();
                let cleared = pair.split_once('=').map_or(true, |(_, v)| v.is_empty());
                self.cookie = if cleared { None } else { Some(pair) };
            }

            let status = response.status();
            let location = response
                .headers()
                .get(header::LOCATION)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();

            Page {
                status,
                location,
                body: String::from_utf8(bytes.to_vec()).unwrap(),
            }
        }
    }

    fn assert_redirect(page: &Page, to: &str) {
        assert_eq!(page.status, StatusCode::SEE_OTHER);
        assert_eq!(page.location.as_deref(), Some(to));
    }

    #[tokio::test]
    async fn test_static_pages_render() {
        let (app, _) = app().await;
        let mut visitor = Visitor::new(app);

        for (uri, heading) in [
            ("/", "Welcome to"),
            ("/about", "About"),
            ("/contact", "Contact"),
            ("/panda-suite", "Panda Suite"),
            ("/bamboo-dorm", "Bamboo Dorm"),
            ("/search-availability", "Search for Availability"),
        ] {
            let page = visitor.get(uri).await;
            assert_eq!(page.status, StatusCode::OK, "GET {}", uri);
            assert!(page.body.contains(heading), "GET {} missing {}", uri, heading);
            assert!(page.body.contains("Fort Smythe"));
        }
    }

    #[tokio::test]
    async fn test_health_and_static_files() {
        let (app, _) = app().await;
        let mut visitor = Visitor::new(app);

        let page = visitor.get("/health").await;
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(page.body, "OK");

        let page = visitor.get("/static/css/styles.css").await;
        assert_eq!(page.status, StatusCode::OK);

        let page = visitor.get("/no-such-page").await;
        assert_eq!(page.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_no_availability_redirects_with_notice() {
        let (app, state) = app().await;
        for (room_id, _) in db::ROOMS {
            block_room(&state.db, room_id, (2030, 1, 1), (2030, 1, 10)).await;
        }
        let mut visitor = Visitor::new(app);

        let page = visitor
            .post("/search-availability", "start=2030%2F01%2F02&end=2030%2F01%2F04")
            .await;
        assert_redirect(&page, "/search-availability");

        let page = visitor.get("/search-availability").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("No availability"));

        // Shown once
        let page = visitor.get("/search-availability").await;
        assert!(!page.body.contains("No availability"));
    }

    #[tokio::test]
    async fn test_full_reservation_flow() {
        let (app, state) = app().await;
        let mut visitor = Visitor::new(app);

        let page = visitor
            .post("/search-availability", "start=2030%2F01%2F01&end=2030%2F01%2F05")
            .await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("/choose-room/1"));
        assert!(page.body.contains("/choose-room/2"));
        assert!(page.body.contains("2030-01-01"));

        let page = visitor.get("/choose-room/1").await;
        assert_redirect(&page, "/make-reservation");

        let page = visitor.get("/make-reservation").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Panda Suite"));
        assert!(page.body.contains("2030-01-05"));

        let page = visitor
            .post(
                "/make-reservation",
                "first_name=John&last_name=Smith&email=me%40here.com&phone=555-555-5555",
            )
            .await;
        assert_redirect(&page, "/reservation-summary");
        assert_eq!(reservations(&state.db).await, 1);

        let page = visitor.get("/reservation-summary").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("John"));
        assert!(page.body.contains("me@here.com"));
        assert!(page.body.contains("000001"));

        // The summary consumes the draft
        let page = visitor.get("/reservation-summary").await;
        assert_redirect(&page, "/");

        let page = visitor.get("/").await;
        assert!(page.body.contains("get reservation from session"));

        // The room is now taken for those dates
        let free = state
            .workflow
            .check_room_availability("2030/01/02", "2030/01/03", "1")
            .await
            .unwrap();
        assert!(!free.available);
    }

    #[tokio::test]
    async fn test_invalid_form_shows_errors_without_saving() {
        let (app, state) = app().await;
        let mut visitor = Visitor::new(app);

        visitor
            .post("/search-availability", "start=2030%2F02%2F01&end=2030%2F02%2F03")
            .await;
        visitor.get("/choose-room/2").await;

        let page = visitor
            .post(
                "/make-reservation",
                "first_name=Jo&last_name=Smith&email=me%40here.com&phone=",
            )
            .await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page
            .body
            .contains("This field must be at least 3 characters long"));
        assert!(page.body.contains("value=\"Jo\""));
        assert_eq!(reservations(&state.db).await, 0);

        // The draft is still usable
        let page = visitor
            .post(
                "/make-reservation",
                "first_name=John&last_name=Smith&email=me%40here.com&phone=",
            )
            .await;
        assert_redirect(&page, "/reservation-summary");
        assert_eq!(reservations(&state.db).await, 1);
    }

    #[tokio::test]
    async fn test_repeated_submit_stores_one_reservation() {
        let (app, state) = app().await;
        let mut visitor = Visitor::new(app);

        visitor
            .post("/search-availability", "start=2030%2F03%2F01&end=2030%2F03%2F03")
            .await;
        visitor.get("/choose-room/1").await;

        let form = "first_name=John&last_name=Smith&email=me%40here.com&phone=";
        let page = visitor.post("/make-reservation", form).await;
        assert_redirect(&page, "/reservation-summary");
        let page = visitor.post("/make-reservation", form).await;
        assert_redirect(&page, "/reservation-summary");

        assert_eq!(reservations(&state.db).await, 1);
    }

    #[tokio::test]
    async fn test_reservation_pages_without_session_redirect_home() {
        let (app, state) = app().await;

        for (method, uri) in [
            ("GET", "/make-reservation"),
            ("POST", "/make-reservation"),
            ("GET", "/reservation-summary"),
            ("GET", "/choose-room/1"),
        ] {
            let mut visitor = Visitor::new(app.clone());
            let page = if method == "POST" {
                visitor
                    .post(uri, "first_name=John&last_name=Smith&email=me%40here.com")
                    .await
            } else {
                visitor.get(uri).await
            };
            assert_redirect(&page, "/");

            let page = visitor.get("/").await;
            assert!(
                page.body.contains("get reservation from session"),
                "{} {}",
                method,
                uri
            );
        }

        assert_eq!(reservations(&state.db).await, 0);
    }

    #[tokio::test]
    async fn test_summary_before_confirmation_keeps_draft() {
        let (app, _) = app().await;
        let mut visitor = Visitor::new(app);

        visitor
            .post("/search-availability", "start=2030%2F04%2F01&end=2030%2F04%2F03")
            .await;
        visitor.get("/choose-room/1").await;

        let page = visitor.get("/reservation-summary").await;
        assert_redirect(&page, "/");

        let page = visitor.get("/make-reservation").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Panda Suite"));
    }

    #[tokio::test]
    async fn test_bad_input_is_a_client_error() {
        let (app, _) = app().await;
        let mut visitor = Visitor::new(app);

        let page = visitor
            .post("/search-availability", "start=tomorrow&end=2030%2F01%2F05")
            .await;
        assert_eq!(page.status, StatusCode::BAD_REQUEST);

        let page = visitor
            .post("/search-availability", "start=2030%2F01%2F05&end=2030%2F01%2F05")
            .await;
        assert_eq!(page.status, StatusCode::BAD_REQUEST);

        let page = visitor.get("/choose-room/abc").await;
        assert_eq!(page.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_book_room_from_room_page() {
        let (app, _) = app().await;
        let mut visitor = Visitor::new(app);

        let page = visitor
            .get("/book-room?id=2&s=2030%2F05%2F01&e=2030%2F05%2F04")
            .await;
        assert_redirect(&page, "/make-reservation");

        let page = visitor.get("/make-reservation").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Bamboo Dorm"));
        assert!(page.body.contains("2030-05-04"));

        let page = visitor
            .get("/book-room?id=99&s=2030%2F05%2F01&e=2030%2F05%2F04")
            .await;
        assert_eq!(page.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_book_room_for_taken_dates_redirects_to_search() {
        let (app, state) = app().await;
        block_room(&state.db, 2, (2030, 5, 1), (2030, 5, 10)).await;
        let mut visitor = Visitor::new(app);

        let page = visitor
            .get("/book-room?id=2&s=2030%2F05%2F02&e=2030%2F05%2F04")
            .await;
        assert_redirect(&page, "/search-availability");

        let page = visitor.get("/search-availability").await;
        assert!(page.body.contains("no longer available"));

        // No draft was started
        let page = visitor.get("/make-reservation").await;
        assert_redirect(&page, "/");
    }

    #[tokio::test]
    async fn test_padded_short_name_is_rejected() {
        let (app, state) = app().await;
        let mut visitor = Visitor::new(app);

        visitor
            .post("/search-availability", "start=2030%2F07%2F01&end=2030%2F07%2F03")
            .await;
        visitor.get("/choose-room/1").await;

        let page = visitor
            .post(
                "/make-reservation",
                "first_name=%20%20Jo&last_name=Smith&email=me%40here.com&phone=",
            )
            .await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page
            .body
            .contains("This field must be at least 3 characters long"));
        assert_eq!(reservations(&state.db).await, 0);
    }

    #[tokio::test]
    async fn test_availability_json() {
        let (app, _) = app().await;
        let mut visitor = Visitor::new(app);

        let page = visitor
            .post(
                "/search-availability-json",
                "start=2030%2F01%2F01&end=2030%2F01%2F02&room_id=1",
            )
            .await;
        assert_eq!(page.status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&page.body).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["room_id"], "1");
        assert_eq!(json["start_date"], "2030/01/01");

        let page = visitor
            .post(
                "/search-availability-json",
                "start=2030%2F01%2F02&end=2030%2F01%2F01&room_id=1",
            )
            .await;
        assert_eq!(page.status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&page.body).unwrap();
        assert_eq!(json["error"]["code"], "bad_request");
    }
}
