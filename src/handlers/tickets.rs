use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{format_clock, SlotError, Ticket, TicketStatus};
use crate::services::intake::{self, TicketForm, UploadedFile};
use crate::state::AppState;

/// Wire shape of a ticket.
///
/// `startTime`/`endTime` are display labels. An interval ending at midnight
/// has `endMinute` 1440 and `endTime` "12:00 AM", the same label as a start of
/// 0, so clients reading the end back must use `endMinute` or parse `endTime`
/// as an end time (`parse_end_clock`).
#[derive(Serialize)]
pub struct TicketResponse {
    id: String,
    name: String,
    email: String,
    mobileno: String,
    eventdescription: String,
    date: String,
    #[serde(rename = "requestType")]
    request_type: String,
    clubname: Option<String>,
    #[serde(rename = "startTime")]
    start_time: String,
    #[serde(rename = "endTime")]
    end_time: String,
    #[serde(rename = "startMinute")]
    start_minute: u32,
    #[serde(rename = "endMinute")]
    end_minute: u32,
    status: String,
    #[serde(rename = "approvedBy")]
    approved_by: Option<String>,
    file: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            date: t.date.format("%Y-%m-%d").to_string(),
            request_type: t.request_type.as_str().to_string(),
            start_time: format_clock(t.start_minute),
            end_time: format_clock(t.end_minute),
            status: t.status.as_str().to_string(),
            approved_by: t.approved_by.map(|r| r.as_str().to_string()),
            created_at: t.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: t.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            id: t.id,
            name: t.name,
            email: t.email,
            mobileno: t.mobile_no,
            eventdescription: t.event_description,
            clubname: t.club_name,
            start_minute: t.start_minute,
            end_minute: t.end_minute,
            file: t.file_url,
        }
    }
}

// POST /createticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<TicketResponse>), AppError> {
    let mut form = TicketForm::default();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or("document.pdf").to_string();
            let content_type = field.content_type().map(|c| c.to_string());
            let bytes = field.bytes().await.map_err(invalid_body)?;
            file = Some(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(invalid_body)?;
        match name.as_str() {
            "name" => form.name = value,
            "email" => form.email = value,
            "mobileno" => form.mobile_no = value,
            "eventdescription" => form.event_description = value,
            "date" => form.date = value,
            "requestType" => form.request_type = value,
            "clubname" => form.club_name = Some(value),
            "startTime" => form.start_time = value,
            "endTime" => form.end_time = value,
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let ticket = intake::submit_ticket(&state, form, file).await?;
    Ok((StatusCode::CREATED, Json(ticket.into())))
}

fn invalid_body(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!("upload exceeds the size limit: {e}"));
    }
    AppError::Validation(format!("invalid multipart body: {e}"))
}

// GET /ticket
#[derive(Deserialize)]
pub struct TicketsQuery {
    pub status: Option<String>,
    pub date: Option<String>,
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TicketsQuery>,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            TicketStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("invalid status: {s}")))?,
        ),
        None => None,
    };
    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(d) => Some(
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| SlotError::InvalidDate(d.to_string()))?,
        ),
        None => None,
    };

    let tickets = {
        let db = state.db.lock().unwrap();
        queries::list_tickets(&db, status, date)?
    };

    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}
