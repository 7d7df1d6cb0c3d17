/// Image upload for new posts
///
/// Clients send the image inline as a `data:<mime>;base64,<payload>` URI.
/// The bytes are stored under a content-addressed key, so uploading the same
/// image twice yields the same reference.
use crate::domain::ImageRef;
use crate::error::{AppError, Result};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use base64::Engine;
use sha2::{Digest, Sha256};

#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync {
    /// Store the image and return a reference to it.
    /// Any storage failure is an `UpstreamFailure`.
    async fn upload(&self, data_uri: &str) -> Result<ImageRef>;
}

/// Decoded inline image
#[derive(Debug)]
pub struct InlineImage {
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// Parse a base64 `data:` URI carrying an image
    pub fn from_data_uri(input: &str) -> Result<Self> {
        let invalid = |reason: &str| AppError::ValidationFailed(format!("image {reason}"));

        let rest = input
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("must be a base64 data URI"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("must be a base64 data URI"))?;
        let essence = meta
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("must be base64 encoded"))?;

        let content_type: mime::Mime = essence
            .parse()
            .map_err(|_| invalid("has an unreadable content type"))?;
        if content_type.type_() != mime::IMAGE {
            return Err(invalid("must have an image/* content type"));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|_| invalid("payload is not valid base64"))?;
        if bytes.is_empty() {
            return Err(invalid("payload is empty"));
        }

        Ok(Self {
            content_type,
            bytes,
        })
    }

    fn extension(&self) -> &str {
        match self.content_type.subtype().as_str() {
            "jpeg" => "jpg",
            other => other,
        }
    }

    /// `<prefix>/<sha256>.<ext>`
    pub fn content_key(&self, prefix: &str) -> String {
        let digest = hex::encode(Sha256::digest(&self.bytes));
        format!(
            "{}/{}.{}",
            prefix.trim_end_matches('/'),
            digest,
            self.extension()
        )
    }
}

/// Uploads to an S3 bucket served from `public_base_url`
#[derive(Clone)]
pub struct S3ImageUploader {
    client: Client,
    bucket: String,
    public_base_url: String,
    key_prefix: String,
}

impl S3ImageUploader {
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
            key_prefix: key_prefix.into(),
        }
    }
}

#[async_trait::async_trait]
impl ImageUploader for S3ImageUploader {
    async fn upload(&self, data_uri: &str) -> Result<ImageRef> {
        let image = InlineImage::from_data_uri(data_uri)?;
        let key = image.content_key(&self.key_prefix);
        let content_type = image.content_type.essence_str().to_string();
        let size = image.bytes.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&content_type)
            .body(ByteStream::from(image.bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(bucket = %self.bucket, %key, "image upload failed: {}", DisplayErrorContext(&e));
                AppError::UpstreamFailure("image upload failed".to_string())
            })?;

        Ok(ImageRef {
            url: format!("{}/{}", self.public_base_url.trim_end_matches('/'), key),
            key,
            content_type,
            bytes: size,
        })
    }
}

/// Used when no bucket is configured: every upload fails
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledImageUploader;

#[async_trait::async_trait]
impl ImageUploader for DisabledImageUploader {
    async fn upload(&self, _data_uri: &str) -> Result<ImageRef> {
        Err(AppError::UpstreamFailure(
            "image uploads are not configured".to_string(),
        ))
    }
}
