use chrono::NaiveDate;

use super::error::DashboardError;

/// Trimmed query, or a validation error when nothing is left.
pub fn required_query(query: &str) -> Result<&str, DashboardError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::validation("Please enter a search query"));
    }
    Ok(trimmed)
}

/// Trimmed value when it carries anything.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_date(value: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::validation("Invalid date format. Use YYYY-MM-DD"))
}
