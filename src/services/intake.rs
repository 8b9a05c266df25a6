use chrono::{NaiveDate, Utc};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{parse_clock, parse_end_clock, RequestType, SlotError, Ticket, TicketStatus, TimeSlot};
use crate::services::scheduling::{self, SlotGrid};
use crate::state::AppState;

/// Raw booking form fields, as submitted.
#[derive(Debug, Clone, Default)]
pub struct TicketForm {
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub event_description: String,
    pub date: String,
    pub request_type: String,
    pub club_name: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub event_description: String,
    pub date: NaiveDate,
    pub request_type: RequestType,
    pub club_name: Option<String>,
    pub slot: TimeSlot,
}

impl TicketForm {
    pub fn validate(&self, grid: &SlotGrid) -> Result<ValidatedForm, AppError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("mobileno", &self.mobile_no),
            ("eventdescription", &self.event_description),
            ("date", &self.date),
            ("requestType", &self.request_type),
            ("startTime", &self.start_time),
            ("endTime", &self.end_time),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "please fill up all fields, missing: {}",
                missing.join(", ")
            )));
        }

        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Validation("invalid email format".to_string()));
        }

        let mobile_no = self.mobile_no.trim().to_string();
        if mobile_no.len() != 10 || !mobile_no.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation("mobile number must be 10 digits".to_string()));
        }

        let request_type = RequestType::parse(self.request_type.trim()).ok_or_else(|| {
            AppError::Validation(format!("invalid request type: {}", self.request_type))
        })?;
        let club_name = match request_type {
            RequestType::Club => {
                let club = self.club_name.as_deref().map(str::trim).unwrap_or("");
                if club.is_empty() {
                    return Err(AppError::Validation(
                        "club name is required for club booking".to_string(),
                    ));
                }
                Some(club.to_string())
            }
            RequestType::Teacher => None,
        };

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| SlotError::InvalidDate(self.date.clone()))?;
        let start = parse_clock(&self.start_time)?;
        let end = parse_end_clock(&self.end_time)?;
        let slot = grid.validate(start, end)?;

        Ok(ValidatedForm {
            name: self.name.trim().to_string(),
            email,
            mobile_no,
            event_description: self.event_description.trim().to_string(),
            date,
            request_type,
            club_name,
            slot,
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Accepts only non-empty PDF documents.
pub fn validate_pdf(file: Option<UploadedFile>) -> Result<UploadedFile, AppError> {
    let file = file.ok_or_else(|| AppError::Validation("PDF file is required".to_string()))?;

    let declared_pdf = file.content_type.as_deref() == Some("application/pdf")
        || file.file_name.to_lowercase().ends_with(".pdf");
    if !declared_pdf || !file.bytes.starts_with(b"%PDF-") {
        return Err(AppError::Validation("only PDF files are accepted".to_string()));
    }
    Ok(file)
}

/// Validates a booking request, stores its document and records it as pending.
pub async fn submit_ticket(
    state: &AppState,
    form: TicketForm,
    file: Option<UploadedFile>,
) -> Result<Ticket, AppError> {
    let grid = SlotGrid::default();
    let form = form.validate(&grid)?;
    let file = validate_pdf(file)?;

    {
        let db = state.db.lock().unwrap();
        scheduling::ensure_slot_free(&db, form.date, &form.slot, None)?;
    }

    let file_url = state
        .storage
        .upload_pdf(&file.file_name, file.bytes)
        .await
        .map_err(|e| AppError::Upstream(format!("{e:#}")))?;

    let now = Utc::now().naive_utc();
    let ticket = Ticket {
        id: uuid::Uuid::new_v4().to_string(),
        name: form.name,
        email: form.email,
        mobile_no: form.mobile_no,
        event_description: form.event_description,
        date: form.date,
        request_type: form.request_type,
        club_name: form.club_name,
        start_minute: form.slot.start,
        end_minute: form.slot.end,
        status: TicketStatus::Pending,
        approved_by: None,
        file_url,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_ticket(&db, &ticket)?;
    }

    tracing::info!(
        ticket_id = %ticket.id,
        date = %ticket.date,
        start = ticket.start_minute,
        end = ticket.end_minute,
        "created booking request"
    );
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TicketForm {
        TicketForm {
            name: "Asha".to_string(),
            email: "Asha@Example.com".to_string(),
            mobile_no: "9876543210".to_string(),
            event_description: "Robotics showcase".to_string(),
            date: "2025-03-10".to_string(),
            request_type: "club".to_string(),
            club_name: Some("Robotics".to_string()),
            start_time: "9:00 AM".to_string(),
            end_time: "10:00 AM".to_string(),
        }
    }

    fn pdf() -> UploadedFile {
        UploadedFile {
            file_name: "letter.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.7 body".to_vec(),
        }
    }

    fn validation_message(result: Result<ValidatedForm, AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_form() {
        let v = form().validate(&SlotGrid::default()).unwrap();
        assert_eq!(v.email, "asha@example.com");
        assert_eq!(v.slot, TimeSlot::new(540, 600));
        assert_eq!(v.request_type, RequestType::Club);
        assert_eq!(v.club_name.as_deref(), Some("Robotics"));
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let mut f = form();
        f.name = "  ".to_string();
        f.date = String::new();
        let msg = validation_message(f.validate(&SlotGrid::default()));
        assert!(msg.contains("name"));
        assert!(msg.contains("date"));
    }

    #[test]
    fn test_teacher_request_drops_club_name() {
        let mut f = form();
        f.request_type = "teacher".to_string();
        let v = f.validate(&SlotGrid::default()).unwrap();
        assert!(v.club_name.is_none());
    }

    #[test]
    fn test_club_request_needs_club_name() {
        let mut f = form();
        f.club_name = None;
        let msg = validation_message(f.validate(&SlotGrid::default()));
        assert!(msg.contains("club name"));
    }

    #[test]
    fn test_rejects_bad_contact_details() {
        let mut f = form();
        f.email = "not-an-email".to_string();
        assert!(validation_message(f.validate(&SlotGrid::default())).contains("email"));

        let mut f = form();
        f.mobile_no = "12345".to_string();
        assert!(validation_message(f.validate(&SlotGrid::default())).contains("10 digits"));
    }

    #[test]
    fn test_rejects_bad_times() {
        let mut f = form();
        f.end_time = "9:00 AM".to_string();
        validation_message(f.validate(&SlotGrid::default()));

        let mut f = form();
        f.start_time = "9:10 AM".to_string();
        validation_message(f.validate(&SlotGrid::default()));

        let mut f = form();
        f.date = "10/03/2025".to_string();
        validation_message(f.validate(&SlotGrid::default()));

        let mut f = form();
        f.request_type = "staff".to_string();
        validation_message(f.validate(&SlotGrid::default()));
    }

    #[test]
    fn test_end_at_midnight() {
        let mut f = form();
        f.start_time = "11:00 PM".to_string();
        f.end_time = "12:00 AM".to_string();
        let v = f.validate(&SlotGrid::default()).unwrap();
        assert_eq!(v.slot, TimeSlot::new(1380, 1440));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a@.co"));
    }

    #[test]
    fn test_validate_pdf() {
        let accepted = validate_pdf(Some(pdf())).unwrap();
        assert_eq!(accepted.bytes, b"%PDF-1.7 body");
        assert!(validate_pdf(None).is_err());

        let mut png = pdf();
        png.file_name = "photo.png".to_string();
        png.content_type = Some("image/png".to_string());
        assert!(validate_pdf(Some(png)).is_err());

        let mut fake = pdf();
        fake.bytes = b"hello".to_vec();
        assert!(validate_pdf(Some(fake)).is_err());

        let mut untyped = pdf();
        untyped.content_type = None;
        assert!(validate_pdf(Some(untyped)).is_ok());
    }
}
