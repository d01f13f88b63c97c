use super::BlobStore;
use crate::error::WorkshopError;
use crate::types::{FileContents, StoredFile, UploadedFile};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

/// Blobs in a single S3 bucket. The object key is the file id.
pub struct S3Blobs {
    client: S3Client,
    bucket: String,
}

impl S3Blobs {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

/// Object key for a new upload: `{uuid}.{ext}`, extension taken from the file name.
pub fn object_key(file_name: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("{}.{}", id, ext.to_ascii_lowercase())
        }
        _ => id,
    }
}

#[async_trait]
impl BlobStore for S3Blobs {
    async fn put(&self, file: &UploadedFile) -> Result<StoredFile, WorkshopError> {
        let key = object_key(&file.name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.clone()))
            .content_type(&file.content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload to S3: {:?}", e);
                WorkshopError::backend("Failed to upload file", e)
            })?;

        tracing::info!("Stored {} ({} bytes) as {}", file.name, file.bytes.len(), key);

        Ok(StoredFile {
            id: key,
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.bytes.len(),
        })
    }

    async fn get(&self, file_id: &str) -> Result<FileContents, WorkshopError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(file_id)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    WorkshopError::NotFound(format!("File {} not found", file_id))
                } else {
                    tracing::error!("Failed to get object from S3: {:?}", e);
                    WorkshopError::backend("Failed to get file", e)
                }
            })?;

        let content_type = result
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = result
            .body
            .collect()
            .await
            .map_err(|e| WorkshopError::backend("Failed to read S3 body", e))?
            .into_bytes();

        Ok(FileContents {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn delete(&self, file_id: &str) -> Result<(), WorkshopError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(file_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {} from S3: {:?}", file_id, e);
                WorkshopError::backend("Failed to delete file", e)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        assert!(object_key("receipt.PNG").ends_with(".png"));
        assert!(!object_key("receipt").contains('.'));
        assert!(!object_key("weird.name.with space").contains(' '));
    }
}
