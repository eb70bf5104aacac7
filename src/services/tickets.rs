use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::config::Environment;
use crate::models::{BookingLookup, WorkshopBooking, WorkshopMeta};
use crate::services::backend::ensure_success;
use crate::services::bookings::lookup_workshop_bookings;
use crate::services::dashboard::Dashboard;
use crate::services::query::QueryParams;
use crate::services::ticket_pdf;
use crate::utils::DashboardError;

pub const SENT_MESSAGE: &str = "Ticket email sent successfully";

#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct SendTicketDto {
    pub booking_id: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

/// At most one ticket email in flight per desk.
#[derive(Debug, Default)]
pub struct SendSlot {
    busy: AtomicBool,
}

pub struct SendPermit<'a> {
    slot: &'a SendSlot,
}

impl SendSlot {
    pub fn acquire(&self) -> Result<SendPermit<'_>, DashboardError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SendPermit { slot: self })
            .map_err(|_| DashboardError::Conflict("A ticket email is already being sent".to_string()))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SendPermit<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}

pub async fn workshop_meta(
    dashboard: &Dashboard,
    environment: Environment,
    workshop_id: &str,
) -> Result<WorkshopMeta, DashboardError> {
    let meta = dashboard
        .get(
            environment,
            &["djCrud", "get_workshop_by_id", workshop_id],
            &QueryParams::new(),
        )
        .await?;
    Ok(WorkshopMeta::from_value(&meta))
}

/// Renders the booking's ticket and asks the backend to email it.
pub async fn send_ticket(
    dashboard: &Dashboard,
    environment: Environment,
    booking: &WorkshopBooking,
    email: &str,
) -> Result<(), DashboardError> {
    let meta = workshop_meta(dashboard, environment, &booking.workshop_id).await?;
    let pdf_data = ticket_pdf::render_base64(booking)?;

    let body = json!({
        "email": email,
        "workshop_name": meta.workshop_name,
        "workshop_id": booking.workshop_id,
        "geolocation": meta.geolocation,
        "pdf_data": pdf_data,
    });

    let response = dashboard
        .post(environment, &["emailer", "send_ticket_email", ""], body)
        .await?;
    ensure_success(response, "Failed to send email")?;

    info!("Ticket for booking {} emailed to {}", booking.booking_id, email);
    Ok(())
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TicketsView {
    pub lookup: BookingLookup,
    pub query: String,
    pub bookings: Vec<WorkshopBooking>,
    pub sending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Booking lookup for re-sending tickets. Always talks to staging.
#[derive(Debug)]
pub struct TicketsScreen {
    lookup: BookingLookup,
    query: String,
    bookings: Vec<WorkshopBooking>,
    error: Option<String>,
}

impl Default for TicketsScreen {
    fn default() -> Self {
        TicketsScreen {
            lookup: BookingLookup::BookingId,
            query: String::new(),
            bookings: Vec::new(),
            error: None,
        }
    }
}

impl TicketsScreen {
    pub const ENVIRONMENT: Environment = Environment::Staging;

    pub fn select_lookup(&mut self, lookup: BookingLookup) -> Result<(), DashboardError> {
        if lookup == BookingLookup::WorkshopId {
            return Err(DashboardError::validation(
                "Tickets can be searched by booking id or user id",
            ));
        }
        self.lookup = lookup;
        self.query.clear();
        self.bookings.clear();
        self.error = None;
        Ok(())
    }

    pub async fn search(&mut self, dashboard: &Dashboard, query: &str) -> Result<(), DashboardError> {
        self.query = query.to_string();
        self.bookings.clear();
        self.error = None;

        match lookup_workshop_bookings(dashboard, Self::ENVIRONMENT, self.lookup, query).await {
            Ok(bookings) => {
                self.bookings = bookings;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn booking(&self, booking_id: &str) -> Result<WorkshopBooking, DashboardError> {
        self.bookings
            .iter()
            .find(|b| b.booking_id == booking_id)
            .cloned()
            .ok_or_else(|| DashboardError::not_found("Booking not found"))
    }

    pub fn view(&self, slot: &SendSlot) -> TicketsView {
        TicketsView {
            lookup: self.lookup,
            query: self.query.clone(),
            bookings: self.bookings.clone(),
            sending: slot.is_busy(),
            error: self.error.clone(),
        }
    }
}

/// Validates the request, takes the desk's send slot and sends.
pub async fn send_from_screen(
    dashboard: &Dashboard,
    slot: &SendSlot,
    booking: WorkshopBooking,
    dto: &SendTicketDto,
) -> Result<&'static str, DashboardError> {
    dto.validate()?;
    let _permit = slot.acquire()?;

    match send_ticket(dashboard, TicketsScreen::ENVIRONMENT, &booking, dto.email.trim()).await {
        Ok(()) => Ok(SENT_MESSAGE),
        Err(e) => {
            error!("Failed to send ticket for {}: {}", booking.booking_id, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::fixtures::dashboard;
    use serde_json::Value;

    fn booking() -> WorkshopBooking {
        WorkshopBooking {
            booking_id: "B1".into(),
            workshop_id: "W1".into(),
            ..Default::default()
        }
    }

    fn dto(email: &str) -> SendTicketDto {
        SendTicketDto {
            booking_id: "B1".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn send_fetches_meta_then_posts_pdf() {
        let (dashboard, api) = dashboard();
        api.respond(serde_json::json!({ "workshopName": "Salsa Night", "geolocation": { "latitude": 18.5, "longitude": 73.8 } }))
            .respond(serde_json::json!({ "success": true }));
        let slot = SendSlot::default();

        let message = send_from_screen(&dashboard, &slot, booking(), &dto("a@b.co"))
            .await
            .expect("send");
        assert_eq!(message, SENT_MESSAGE);
        assert!(!slot.is_busy());

        let calls = api.calls();
        assert_eq!(calls[0].url.as_str(), "https://staging.example.com/djCrud/get_workshop_by_id/W1");
        assert_eq!(calls[1].url.as_str(), "https://staging.example.com/emailer/send_ticket_email/");

        let body = calls[1].body.clone().expect("body");
        assert_eq!(body["workshop_name"], "Salsa Night");
        assert_eq!(body["geolocation"], "18.5,73.8");
        assert_eq!(body["email"], "a@b.co");
        assert!(body["pdf_data"].as_str().is_some_and(|d| d.starts_with("JVBERi")));
    }

    #[tokio::test]
    async fn backend_refusal_is_reported() {
        let (dashboard, api) = dashboard();
        api.respond(Value::Null).respond(serde_json::json!({ "success": false }));

        let err = send_from_screen(&dashboard, &SendSlot::default(), booking(), &dto("a@b.co"))
            .await
            .unwrap_err();
        assert_eq!(err, DashboardError::application("Failed to send email"));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_before_any_request() {
        let (dashboard, api) = dashboard();

        let err = send_from_screen(&dashboard, &SendSlot::default(), booking(), &dto("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn second_send_is_rejected_while_first_is_in_flight() {
        let (dashboard, api) = dashboard();
        let slot = SendSlot::default();
        let _held = slot.acquire().expect("first");

        let err = send_from_screen(&dashboard, &slot, booking(), &dto("a@b.co"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Conflict(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn workshop_lookup_is_not_offered() {
        let mut screen = TicketsScreen::default();
        assert!(screen.select_lookup(BookingLookup::WorkshopId).is_err());
        assert!(screen.select_lookup(BookingLookup::UserId).is_ok());
        assert!(matches!(screen.booking("B1"), Err(DashboardError::NotFound(_))));
    }
}
