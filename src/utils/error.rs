use thiserror::Error;

/// Failures a screen can surface to the operator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    /// The request never produced a 2xx response.
    #[error("{0}")]
    Network(String),
    /// 2xx response whose body reported `success: false` or an `error` field.
    #[error("{0}")]
    Application(String),
    #[error("{0}")]
    Timeout(String),
    /// Rejected before any remote call was issued.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Another operation on the same entity is still in flight.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Store(String),
    #[error("{0}")]
    Render(String),
}

impl DashboardError {
    pub fn network(message: impl Into<String>) -> Self {
        DashboardError::Network(message.into())
    }

    pub fn application(message: impl Into<String>) -> Self {
        DashboardError::Application(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DashboardError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DashboardError::NotFound(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        DashboardError::Store(message.into())
    }
}

impl From<mongodb::error::Error> for DashboardError {
    fn from(e: mongodb::error::Error) -> Self {
        DashboardError::Store(format!("Database error: {}", e))
    }
}

impl From<validator::ValidationErrors> for DashboardError {
    fn from(e: validator::ValidationErrors) -> Self {
        DashboardError::Validation(e.to_string())
    }
}
