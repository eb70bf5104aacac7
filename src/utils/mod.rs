pub mod csv_export;
pub mod error;
pub mod response;
pub mod validation;

pub use csv_export::{CsvFile, CsvRecord};
pub use error::DashboardError;
pub use response::{ApiError, ApiResponse};
