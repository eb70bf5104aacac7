use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::guards::AdminGuard;
use crate::models::BookingLookup;
use crate::routes::{ok, ApiResult};
use crate::services::tickets::{send_from_screen, SendTicketDto, TicketsView};
use crate::services::{Dashboard, Desks};
use crate::utils::ApiResponse;

#[openapi(tag = "Tickets")]
#[get("/tickets")]
pub async fn get_tickets(desks: &State<Desks>, admin: AdminGuard) -> ApiResult<TicketsView> {
    let desk = desks.open(&admin.admin_id);
    let screen = desk.tickets.lock().await;
    ok(screen.view(&desk.ticket_send))
}

#[openapi(tag = "Tickets")]
#[get("/tickets/search?<lookup>&<query>")]
pub async fn search_tickets(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    lookup: Option<BookingLookup>,
    query: Option<String>,
) -> ApiResult<TicketsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.tickets.lock().await;
    if let Some(lookup) = lookup {
        screen.select_lookup(lookup)?;
    }
    screen
        .search(dashboard, query.as_deref().unwrap_or_default())
        .await?;
    ok(screen.view(&desk.ticket_send))
}

/// Emails the ticket PDF for a booking from the last search.
/// A second send while one is running gets 409.
#[openapi(tag = "Tickets")]
#[post("/tickets/send", data = "<dto>")]
pub async fn send_ticket(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    dto: Json<SendTicketDto>,
) -> ApiResult<()> {
    let desk = desks.open(&admin.admin_id);
    let booking = desk.tickets.lock().await.booking(&dto.booking_id)?;

    let message = send_from_screen(dashboard, &desk.ticket_send, booking, &dto).await?;
    Ok(Json(ApiResponse::success_with_message(message.to_string(), ())))
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::routes::harness::{admin, launch};

    #[tokio::test]
    async fn search_then_send() {
        let h = launch().await;
        h.api
            .respond(json!({ "success": true, "booking": { "booking_id": "B1", "workshop_id": "W1", "buyer_name": "Ravi" } }))
            .respond(json!({ "name": "Kathak Basics", "geolocation": "18.5,73.8" }))
            .respond(json!({ "success": true }));

        let response = h
            .client
            .get("/api/v1/tickets/search?lookup=booking_id&query=B1")
            .header(admin())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = h
            .client
            .post("/api/v1/tickets/send")
            .header(admin())
            .header(ContentType::JSON)
            .body(r#"{"booking_id":"B1","email":"ravi@example.com"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["message"], "Ticket email sent successfully");

        let calls = h.api.calls();
        assert_eq!(calls.len(), 3);
        let sent = calls[2].body.clone().expect("body");
        assert_eq!(sent["workshop_name"], "Kathak Basics");
        assert_eq!(sent["geolocation"], "18.5,73.8");
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let h = launch().await;
        let response = h
            .client
            .post("/api/v1/tickets/send")
            .header(admin())
            .header(ContentType::JSON)
            .body(r#"{"booking_id":"nope","email":"a@b.co"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
