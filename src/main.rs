#[macro_use]
extern crate rocket;

mod config;
mod db;
mod guards;
mod models;
mod routes;
mod services;
mod utils;

use std::sync::Arc;

use dotenvy::dotenv;
use log::{error, info};
use rocket::fairing::{AdHoc, Fairing, Info, Kind};
use rocket::http::Header;
use rocket::serde::json::{json, Value};
use rocket::{Build, Request, Response, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

use crate::config::{Config, Endpoints};
use crate::guards::JwtSecret;
use crate::services::{Dashboard, Desks, HttpApi, LoadingIndicator, RemoteApi};

/* ----------------------------- CORS ----------------------------- */

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));

        response.set_header(Header::new("Access-Control-Expose-Headers", "Content-Disposition"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ERRORS ----------------------------- */

fn failure(message: &str) -> Value {
    json!({
        "success": false,
        "message": message
    })
}

#[catch(400)]
fn bad_request() -> Value {
    failure("Bad request")
}

#[catch(401)]
fn unauthorized() -> Value {
    failure("Missing or invalid bearer token")
}

#[catch(403)]
fn forbidden() -> Value {
    failure("Super admin access required")
}

#[catch(404)]
fn not_found() -> Value {
    failure("Resource not found (check /api/v1 prefix)")
}

#[catch(422)]
fn unprocessable() -> Value {
    failure("Malformed request body")
}

#[catch(500)]
fn internal_error() -> Value {
    failure("Internal server error")
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/api/v1/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- MOUNT ----------------------------- */

/// Routes, catchers and CORS. State is managed by the launch fairings.
pub fn mount(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(CORS)
        .mount("/", routes![options_handler])
        .mount(
            "/api/v1",
            openapi_get_routes![
                // Transactions
                routes::transactions::get_transactions,
                routes::transactions::search_transactions,
                routes::transactions::refresh_transactions,
                routes::transactions::change_transactions_page,
                routes::transactions::clear_transaction_filters,
                routes::transactions::switch_transactions_environment,
                routes::transactions::export_transactions,
                // Bookings
                routes::bookings::get_bookings,
                routes::bookings::search_free_trials,
                routes::bookings::search_workshop_bookings,
                routes::bookings::set_bookings_webapp,
                // Tickets
                routes::tickets::get_tickets,
                routes::tickets::search_tickets,
                routes::tickets::send_ticket,
                // Page tracking
                routes::tracking::get_tracking,
                routes::tracking::set_tracking_date,
                routes::tracking::switch_tracking_environment,
                routes::tracking::refresh_tracking,
                routes::tracking::export_tracking,
                // Booking monitor
                routes::monitor::get_monitor,
                routes::monitor::apply_monitor_filters,
                routes::monitor::switch_monitor_environment,
                routes::monitor::export_monitor,
                // Revenue
                routes::revenue::get_workshop_revenue,
                // Discounts
                routes::discounts::post_discount,
                // KYC review
                routes::kyc::get_kyc_cards,
                routes::kyc::search_kyc,
                routes::kyc::edit_kyc,
                routes::kyc::submit_kyc,
                // Loading indicator
                routes::loading::get_loading,
            ],
        )
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                internal_error
            ],
        )
}

fn dashboard_state() -> AdHoc {
    AdHoc::try_on_ignite("Dashboard", |rocket| async {
        let endpoints = match Endpoints::load() {
            Ok(endpoints) => endpoints,
            Err(e) => {
                error!("✗ Invalid backend URL: {}", e);
                return Err(rocket);
            }
        };
        let api: Arc<dyn RemoteApi> = match HttpApi::new(Config::http_timeout()) {
            Ok(api) => Arc::new(api),
            Err(e) => {
                error!("✗ Failed to build HTTP client: {}", e);
                return Err(rocket);
            }
        };

        info!("✓ Backend endpoints loaded");
        Ok(rocket
            .manage(Dashboard::new(endpoints, api, LoadingIndicator::new()))
            .manage(Desks::new(Config::kyc_submit_timeout()))
            .manage(JwtSecret(Config::jwt_secret())))
    })
}

/* ----------------------------- LAUNCH ----------------------------- */

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    info!("Studio admin API starting");
    info!("Swagger UI at /api/docs");

    mount(rocket::build())
        .attach(db::init())
        .attach(dashboard_state())
}
