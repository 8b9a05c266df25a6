use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "sub-admin")]
    SubAdmin,
    #[serde(rename = "super-admin")]
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SubAdmin => "sub-admin",
            Role::SuperAdmin => "super-admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sub-admin" => Some(Role::SubAdmin),
            "super-admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}
