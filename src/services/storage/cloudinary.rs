use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use sha1::{Digest, Sha1};

use super::StorageProvider;

pub struct CloudinaryStorage {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
    client: reqwest::Client,
}

impl CloudinaryStorage {
    pub fn new(cloud_name: String, api_key: String, api_secret: String, folder: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            folder,
            client: reqwest::Client::new(),
        }
    }
}

/// Hex SHA-1 over the alphabetically sorted `key=value` pairs followed by the secret.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl StorageProvider for CloudinaryStorage {
    async fn upload_pdf(&self, file_name: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
        anyhow::ensure!(
            !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty(),
            "cloudinary credentials are not configured"
        );

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        );
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let public_id = format!("pdf-{}", chrono::Utc::now().timestamp_millis());

        let signed = [
            ("folder", self.folder.as_str()),
            ("format", "pdf"),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign_params(&signed, &self.api_secret);

        let file = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .context("invalid mime type")?;
        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in signed {
            form = form.text(key.to_string(), value.to_string());
        }

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("failed to reach Cloudinary")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Cloudinary response")?;

        if !status.is_success() {
            anyhow::bail!("Cloudinary upload failed ({}): {}", status, data["error"]["message"]);
        }

        let secure_url = data["secure_url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing secure_url in Cloudinary response"))?;

        tracing::info!(public_id = %public_id, "uploaded document to Cloudinary");
        Ok(secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_sorts_and_appends_secret() {
        let unsorted = sign_params(&[("b", "2"), ("a", "1")], "secret");
        let sorted = sign_params(&[("a", "1"), ("b", "2")], "secret");
        assert_eq!(unsorted, sorted);
        assert_eq!(unsorted.len(), 40);
        assert!(unsorted.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_params_known_vector() {
        // Cloudinary's documented example.
        let signature = sign_params(
            &[("timestamp", "1315060510"), ("public_id", "sample_image"), ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop")],
            "abcd",
        );
        assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[tokio::test]
    async fn test_upload_without_credentials_fails() {
        let storage = CloudinaryStorage::new(String::new(), String::new(), String::new(), "f".to_string());
        assert!(storage.upload_pdf("a.pdf", b"%PDF-1.4".to_vec()).await.is_err());
    }
}
