use anyhow::{Context, Result};

use crate::cv::DEFAULT_INSTITUTION;

const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Base URL that uploaded photo keys are appended to when serialized as `foto`.
    pub photo_public_base_url: String,
    /// Institution line printed under the name in the CV header.
    pub cv_institution: String,
    pub max_photo_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_bucket = require_env("S3_BUCKET")?;
        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let photo_public_base_url = std::env::var("PHOTO_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| default_photo_base_url(&s3_endpoint, &s3_bucket));

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            photo_public_base_url,
            s3_bucket,
            s3_endpoint,
            cv_institution: std::env::var("CV_INSTITUTION")
                .unwrap_or_else(|_| DEFAULT_INSTITUTION.to_string()),
            max_photo_bytes: match std::env::var("MAX_PHOTO_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_PHOTO_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_PHOTO_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    /// Fixed settings for tests; nothing is read from the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: String::new(),
            s3_bucket: "talents".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            photo_public_base_url: "https://cdn.example".to_string(),
            cv_institution: DEFAULT_INSTITUTION.to_string(),
            max_photo_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Path-style bucket URL, which works for both MinIO and S3.
fn default_photo_base_url(endpoint: &str, bucket: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), bucket)
}
