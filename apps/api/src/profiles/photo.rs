//! Profile photo storage.
//!
//! The database keeps only the blob key. Bytes live in an S3-compatible bucket
//! behind the [`PhotoStore`] trait, carried in `AppState` as `Arc<dyn PhotoStore>`.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use image::ImageFormat;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::profiles::validation::{FieldError, FieldErrors};

#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// URL clients use to fetch the photo directly.
    fn public_url(&self, key: &str) -> String;
}

/// Deletes a blob, logging instead of failing. Used once the database no
/// longer references the key.
pub async fn delete_quietly(store: &dyn PhotoStore, key: &str) {
    if let Err(e) = store.delete(key).await {
        warn!("Failed to delete photo blob {key}: {e}");
    }
}

pub struct S3PhotoStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3PhotoStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded photo to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// A validated photo upload ready to be stored.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Bytes,
    pub extension: &'static str,
    pub content_type: &'static str,
}

impl PhotoUpload {
    pub fn blob_key(&self, profile_id: Uuid) -> String {
        format!("photos/{profile_id}/{}.{}", Uuid::new_v4(), self.extension)
    }
}

/// Accepts only payloads that decode as a supported image.
pub fn inspect_upload(bytes: Bytes, max_bytes: usize) -> Result<PhotoUpload, FieldErrors> {
    let reject = |msg: String| FieldErrors::single("foto", FieldError::Other(msg));

    if bytes.is_empty() {
        return Err(reject("The submitted file is empty.".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(reject(format!(
            "The photo must not exceed {max_bytes} bytes."
        )));
    }

    let format = image::guess_format(&bytes).map_err(|_| {
        reject("Upload a valid image. The file is not an image or is corrupted.".to_string())
    })?;
    let (extension, content_type) = match format {
        ImageFormat::Png => ("png", "image/png"),
        ImageFormat::Jpeg => ("jpg", "image/jpeg"),
        ImageFormat::Gif => ("gif", "image/gif"),
        ImageFormat::WebP => ("webp", "image/webp"),
        ImageFormat::Bmp => ("bmp", "image/bmp"),
        other => return Err(reject(format!("Unsupported image format: {other:?}."))),
    };

    image::load_from_memory_with_format(&bytes, format).map_err(|_| {
        reject("Upload a valid image. The file is not an image or is corrupted.".to_string())
    })?;

    Ok(PhotoUpload {
        bytes,
        extension,
        content_type,
    })
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        4,
        4,
        image::Rgb([59, 130, 246]),
    ));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageOutputFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_accepted() {
        let upload = inspect_upload(Bytes::from(tiny_png()), 1024 * 1024).unwrap();
        assert_eq!(upload.extension, "png");
        assert_eq!(upload.content_type, "image/png");
    }

    #[test]
    fn test_blob_key_scoped_to_profile() {
        let upload = inspect_upload(Bytes::from(tiny_png()), 1024 * 1024).unwrap();
        let profile_id = Uuid::new_v4();
        let key = upload.blob_key(profile_id);
        assert!(key.starts_with(&format!("photos/{profile_id}/")));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_non_image_rejected() {
        let err = inspect_upload(Bytes::from_static(b"definitely not an image"), 1024).unwrap_err();
        assert!(err.contains("foto"));
    }

    #[test]
    fn test_truncated_image_rejected() {
        let mut png = tiny_png();
        png.truncate(20);
        assert!(inspect_upload(Bytes::from(png), 1024 * 1024).is_err());
    }

    #[test]
    fn test_oversized_and_empty_rejected() {
        assert!(inspect_upload(Bytes::from(tiny_png()), 10).is_err());
        assert!(inspect_upload(Bytes::new(), 1024).is_err());
    }
}
