//! Block-list object storage

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;

use crate::error::StoreError;

/// Content type the firewall expects for the feed
pub const CONTENT_TYPE: &str = "text/plain";

#[async_trait]
pub trait BlockListStore: Send + Sync {
    /// Make sure the backing container is reachable before reading from it.
    async fn check_bucket(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Current block-list text; an absent object reads as an empty list.
    async fn fetch(&self) -> Result<String, StoreError>;

    /// Overwrite the block list with `text`, publicly readable.
    async fn save(&self, text: &str) -> Result<(), StoreError>;
}

/// Build an S3 client for `region`, falling back to the default provider chain.
pub async fn s3_client(region: Option<String>) -> Client {
    let region_provider = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else("us-east-1");

    let config = aws_config::from_env().region(region_provider).load().await;
    Client::new(&config)
}

/// Block list stored as a single S3 object
#[derive(Clone)]
pub struct S3BlockListStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3BlockListStore {
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl BlockListStore for S3BlockListStore {
    async fn check_bucket(&self) -> Result<(), StoreError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StoreError::Bucket(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("Bucket {} is reachable", self.bucket);
        Ok(())
    }

    async fn fetch(&self) -> Result<String, StoreError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StoreError::Read(e.to_string()))?
                    .into_bytes();
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Err(err) if is_not_found(&err) => {
                tracing::info!("Block list s3://{}/{} not found, starting empty", self.bucket, self.key);
                Ok(String::new())
            }
            Err(err) => Err(StoreError::Read(DisplayErrorContext(&err).to_string())),
        }
    }

    async fn save(&self, text: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(text.as_bytes().to_vec()))
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| StoreError::Write(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("Block list saved to s3://{}/{}", self.bucket, self.key);
        Ok(())
    }
}

fn is_not_found(err: &SdkError<GetObjectError>) -> bool {
    match err {
        SdkError::ServiceError(ctx) => {
            ctx.err().is_no_such_key() || ctx.raw().status().as_u16() == 404
        }
        _ => false,
    }
}
