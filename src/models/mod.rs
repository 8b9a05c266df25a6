pub mod account;
pub mod booking;
pub mod time_slot;

pub use account::{Account, Role};
pub use booking::{RequestType, Ticket, TicketStatus};
pub use time_slot::{format_clock, parse_clock, parse_end_clock, SlotError, TimeSlot};
