pub mod backend;
pub mod bookings;
pub mod dashboard;
pub mod desk;
pub mod discounts;
pub mod document_store;
pub mod jwt;
pub mod kyc_review;
pub mod loading;
pub mod monitor;
pub mod query;
pub mod revenue;
pub mod ticket_pdf;
pub mod tickets;
pub mod tracking;
pub mod transactions;

#[cfg(test)]
pub mod testing;

pub use backend::{HttpApi, RemoteApi};
pub use dashboard::Dashboard;
pub use desk::Desks;
pub use document_store::{DocumentStore, MongoStore};
pub use jwt::JwtService;
pub use loading::LoadingIndicator;
