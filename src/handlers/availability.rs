use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{format_clock, parse_clock, SlotError};
use crate::services::scheduling::SlotGrid;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
    pub start: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SlotChoice {
    minutes: u32,
    label: String,
}

impl SlotChoice {
    fn new(minutes: u32) -> Self {
        Self {
            minutes,
            label: format_clock(minutes),
        }
    }
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    date: String,
    starts: Vec<SlotChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ends: Option<Vec<SlotChoice>>,
}

// GET /availability?date=YYYY-MM-DD[&start=h:mm AM]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let raw_date = query.date.unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
        .map_err(|_| SlotError::InvalidDate(raw_date.clone()))?;
    let start = match query.start.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(s) => Some(parse_clock(s)?),
        None => None,
    };

    // Recomputed per request, never cached.
    let booked = {
        let db = state.db.lock().unwrap();
        queries::booked_slots_for_date(&db, date, None)?
    };

    let grid = SlotGrid::default();
    let starts = grid
        .available_starts(&booked)
        .into_iter()
        .map(SlotChoice::new)
        .collect();
    let ends = match start {
        Some(start) => Some(
            grid.available_ends(start, &booked)?
                .into_iter()
                .map(SlotChoice::new)
                .collect(),
        ),
        None => None,
    };

    Ok(Json(AvailabilityResponse {
        date: date.format("%Y-%m-%d").to_string(),
        starts,
        ends,
    }))
}
