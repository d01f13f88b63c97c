pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod instructors;
pub mod registrations;
pub mod reports;
pub mod session;
pub mod storage;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;
pub mod validation;
pub mod workshop;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use backend::{
    AccountService, BlobStore, CognitoAccounts, DocumentStore, DynamoDocuments, InMemoryAccounts,
    InMemoryBlobs, InMemoryDocuments, S3Blobs,
};
use config::Config;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub accounts: Arc<dyn AccountService>,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        accounts: Arc<dyn AccountService>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            accounts,
            documents,
            blobs,
        })
    }

    /// Cognito, DynamoDB and S3 clients built from one SDK config.
    pub fn from_aws(sdk_config: &aws_config::SdkConfig, config: Config) -> Arc<Self> {
        let accounts = CognitoAccounts::new(
            CognitoClient::new(sdk_config),
            config.cognito_client_id.clone(),
            config.cognito_client_secret.clone(),
            config.cognito_user_pool_id.clone(),
        );
        let documents = DynamoDocuments::new(DynamoClient::new(sdk_config));
        let blobs = S3Blobs::new(S3Client::new(sdk_config), config.storage_bucket.clone());

        Self::new(config, Arc::new(accounts), Arc::new(documents), Arc::new(blobs))
    }

    pub fn in_memory(config: Config) -> Arc<Self> {
        Self::new(
            config,
            Arc::new(InMemoryAccounts::new()),
            Arc::new(InMemoryDocuments::new()),
            Arc::new(InMemoryBlobs::new()),
        )
    }
}
