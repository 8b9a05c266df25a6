use std::collections::HashMap;
use std::env;

use anyhow::Context;

use crate::models::Role;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub token_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub max_upload_bytes: usize,
    pub roles: RoleDirectory,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_folder: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let roles = match env::var("ROLE_EMAILS") {
            Ok(raw) => RoleDirectory::parse(&raw).context("invalid ROLE_EMAILS")?,
            Err(_) => RoleDirectory::default(),
        };

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "auditorium.db".to_string()),
            token_secret: env::var("TOKEN_SECRET").unwrap_or_else(|_| "changeme".to_string()),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            roles,
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
            cloudinary_folder: env::var("CLOUDINARY_FOLDER")
                .unwrap_or_else(|_| "auditorium-pdfs".to_string()),
        })
    }
}

/// Which emails may register, and with which role.
#[derive(Clone, Debug, Default)]
pub struct RoleDirectory {
    by_email: HashMap<String, Role>,
}

impl RoleDirectory {
    /// Parses `sub-admin:a@x.com,b@x.com;super-admin:c@x.com`.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let mut by_email = HashMap::new();

        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (role, emails) = entry
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("missing ':' in role entry: {entry}"))?;
            let role = Role::parse(role.trim())
                .ok_or_else(|| anyhow::anyhow!("unknown role: {}", role.trim()))?;

            for email in emails.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                by_email.insert(email.to_lowercase(), role);
            }
        }

        Ok(Self { by_email })
    }

    pub fn role_for(&self, email: &str) -> Option<Role> {
        self.by_email.get(&email.trim().to_lowercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}
