pub mod admin;
pub mod availability;
pub mod health;
pub mod tickets;
