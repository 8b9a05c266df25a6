use chrono::{NaiveDate, NaiveDateTime};

use super::account::Role;
use super::time_slot::TimeSlot;

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub event_description: String,
    pub date: NaiveDate,
    pub request_type: RequestType,
    pub club_name: Option<String>,
    pub start_minute: u32,
    pub end_minute: u32,
    pub status: TicketStatus,
    pub approved_by: Option<Role>,
    pub file_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Ticket {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_minute, self.end_minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    Booked,
    Declined,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Booked => "booked",
            TicketStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TicketStatus::Pending),
            "booked" => Some(TicketStatus::Booked),
            "declined" => Some(TicketStatus::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Club,
    Teacher,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Club => "club",
            RequestType::Teacher => "teacher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "club" => Some(RequestType::Club),
            "teacher" => Some(RequestType::Teacher),
            _ => None,
        }
    }
}
