pub mod auth;
pub mod intake;
pub mod scheduling;
pub mod storage;
pub mod transitions;
