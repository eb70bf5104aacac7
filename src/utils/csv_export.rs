use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use rocket::http::{ContentType, Header, Status};
use rocket::response::{self, Responder, Response};
use rocket::Request;
use rocket_okapi::okapi::openapi3::{MediaType, Response as OpenApiResponse, Responses};
use rocket_okapi::okapi::Map;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;

use crate::config::Environment;

use super::error::DashboardError;

/// A row type that can be written into a dashboard CSV export.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub filename: String,
    pub content: String,
}

/// `<dataset>_<environment>_<YYYY-MM-DD>.csv`
pub fn export_filename(dataset: &str, environment: Environment, date: NaiveDate) -> String {
    format!("{}_{}_{}.csv", dataset, environment, date.format("%Y-%m-%d"))
}

/// Serializes the held rows, header first, every field double-quoted.
/// An empty slice produces no file.
pub fn export<T: CsvRecord>(
    dataset: &str,
    environment: Environment,
    records: &[T],
    date: NaiveDate,
) -> Result<CsvFile, DashboardError> {
    if records.is_empty() {
        return Err(DashboardError::validation("No data to export"));
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(T::HEADERS)
        .map_err(|e| DashboardError::Render(format!("CSV error: {}", e)))?;
    for record in records {
        writer
            .write_record(record.fields())
            .map_err(|e| DashboardError::Render(format!("CSV error: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Render(format!("CSV error: {}", e)))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| DashboardError::Render(format!("CSV encoding error: {}", e)))?;

    Ok(CsvFile {
        filename: export_filename(dataset, environment, date),
        content,
    })
}

impl<'r> Responder<'r, 'static> for CsvFile {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);

        Response::build()
            .status(Status::Ok)
            .header(ContentType::CSV)
            .header(Header::new("Content-Disposition", disposition))
            .sized_body(self.content.len(), Cursor::new(self.content))
            .ok()
    }
}

impl OpenApiResponderInner for CsvFile {
    fn responses(generator: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut content = Map::new();
        content.insert(
            "text/csv".to_owned(),
            MediaType {
                schema: Some(generator.json_schema::<String>()),
                ..Default::default()
            },
        );

        let mut responses = Responses::default();
        responses.responses.insert(
            "200".to_string(),
            rocket_okapi::okapi::openapi3::RefOr::Object(OpenApiResponse {
                description: "CSV attachment".to_string(),
                content,
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
