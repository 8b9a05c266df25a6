/// Minutes in a calendar day.
pub const DAY_LENGTH: u32 = 1440;

/// Step every selectable time is quantized to.
pub const GRANULARITY: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid time format: {0}")]
    InvalidClock(String),

    #[error("start time must be before end time")]
    StartNotBeforeEnd,

    #[error("time out of range: {0}")]
    OutOfRange(u32),

    #[error("time {0} is not a multiple of {1} minutes")]
    Misaligned(u32, u32),

    #[error("invalid slot grid: granularity {granularity}, day length {day_length}")]
    InvalidGrid { granularity: u32, day_length: u32 },
}

/// Half-open interval `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: u32,
    pub end: u32,
}

impl TimeSlot {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Renders a minute offset as `h:mm AM|PM`. 1440 wraps to `12:00 AM`.
pub fn format_clock(minutes: u32) -> String {
    let minutes = minutes % DAY_LENGTH;
    let hours = minutes / 60;
    let rest = minutes % 60;
    let period = if hours < 12 { "AM" } else { "PM" };
    let display_hours = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{display_hours}:{rest:02} {period}")
}

/// Parses `h:mm AM|PM` into a minute offset in `[0, 1440)`.
pub fn parse_clock(s: &str) -> Result<u32, SlotError> {
    let invalid = || SlotError::InvalidClock(s.to_string());

    let trimmed = s.trim();
    let (time, period) = trimmed.split_once(' ').ok_or_else(invalid)?;
    let (hours, minutes) = time.split_once(':').ok_or_else(invalid)?;

    if minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hours) || minutes > 59 {
        return Err(invalid());
    }

    let hours = match period.trim().to_ascii_uppercase().as_str() {
        "AM" if hours == 12 => 0,
        "AM" => hours,
        "PM" if hours == 12 => 12,
        "PM" => hours + 12,
        _ => return Err(invalid()),
    };

    Ok(hours * 60 + minutes)
}

/// Like [`parse_clock`], but midnight closes the day (1440) instead of opening it.
pub fn parse_end_clock(s: &str) -> Result<u32, SlotError> {
    match parse_clock(s)? {
        0 => Ok(DAY_LENGTH),
        m => Ok(m),
    }
}
