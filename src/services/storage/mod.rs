pub mod cloudinary;

use async_trait::async_trait;

/// Durable home for uploaded supporting documents.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stores a PDF and returns the URL it can be fetched from.
    async fn upload_pdf(&self, file_name: &str, bytes: Vec<u8>) -> anyhow::Result<String>;
}
