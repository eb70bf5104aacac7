use rocket::State;
use rocket_okapi::openapi;

use crate::config::Environment;
use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{BookingLookup, FreeTrialFilter};
use crate::routes::{ok, ApiResult};
use crate::services::bookings::BookingsView;
use crate::services::{Dashboard, Desks};

#[openapi(tag = "Bookings")]
#[get("/bookings")]
pub async fn get_bookings(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<BookingsView> {
    let desk = desks.open(&admin.admin_id);
    let screen = desk.bookings.lock().await;
    ok(screen.view(dashboard))
}

/// Free-trial bookings from the document store. A blank query is ignored.
#[openapi(tag = "Bookings")]
#[get("/bookings/free-trials?<filter>&<query>")]
pub async fn search_free_trials(
    db: &State<DbConn>,
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    filter: FreeTrialFilter,
    query: Option<String>,
) -> ApiResult<BookingsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.bookings.lock().await;
    screen
        .search_free_trials(db.inner().as_ref(), filter, query.as_deref().unwrap_or_default())
        .await?;
    ok(screen.view(dashboard))
}

#[openapi(tag = "Bookings")]
#[get("/bookings/workshop?<lookup>&<query>&<environment>")]
pub async fn search_workshop_bookings(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    lookup: Option<BookingLookup>,
    query: Option<String>,
    environment: Option<Environment>,
) -> ApiResult<BookingsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.bookings.lock().await;

    if let Some(lookup) = lookup {
        screen.select_lookup(lookup);
    }
    if let Some(environment) = environment {
        screen.set_environment(environment);
    }
    screen
        .search_workshop_bookings(dashboard, query.as_deref().unwrap_or_default())
        .await?;
    ok(screen.view(dashboard))
}

/// Which web app the ticket links open.
#[openapi(tag = "Bookings")]
#[post("/bookings/webapp?<environment>")]
pub async fn set_bookings_webapp(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    environment: Environment,
) -> ApiResult<BookingsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.bookings.lock().await;
    screen.set_webapp_environment(environment);
    ok(screen.view(dashboard))
}
