pub mod cognito;
pub mod dynamo;
pub mod memory;
pub mod s3;

use crate::error::WorkshopError;
use crate::types::{AccountInfo, AuthTokens, FileContents, StoredFile, UploadedFile};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub use cognito::CognitoAccounts;
pub use dynamo::DynamoDocuments;
pub use memory::{InMemoryAccounts, InMemoryBlobs, InMemoryDocuments};
pub use s3::S3Blobs;

/// Accounts and sessions. Production uses Cognito; the in-memory version backs
/// local development and tests.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and return its id. Does not start a session.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<String, WorkshopError>;

    /// Check credentials and start a session.
    async fn create_session(&self, email: &str, password: &str)
        -> Result<AuthTokens, WorkshopError>;

    /// The account behind an access token; `None` when the token is unknown or expired.
    async fn current_account(&self, access_token: &str)
        -> Result<Option<AccountInfo>, WorkshopError>;

    async fn delete_session(&self, access_token: &str) -> Result<(), WorkshopError>;

    async fn request_email_verification(&self, access_token: &str) -> Result<(), WorkshopError>;

    async fn confirm_email_verification(
        &self,
        access_token: &str,
        code: &str,
    ) -> Result<(), WorkshopError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), WorkshopError>;

    async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), WorkshopError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, WorkshopError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Document, WorkshopError>;

    /// Merge `patch` into the document. A `null` value removes the field.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document, WorkshopError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), WorkshopError>;

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, WorkshopError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, file: &UploadedFile) -> Result<StoredFile, WorkshopError>;

    async fn get(&self, file_id: &str) -> Result<FileContents, WorkshopError>;

    async fn delete(&self, file_id: &str) -> Result<(), WorkshopError>;
}

/// A stored document: system fields plus the collection-specific data.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub data: Map<String, Value>,
}

pub(crate) const SYSTEM_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

impl Document {
    /// Decode into a typed record. System fields are visible to the record as
    /// `id`, `created_at` and `updated_at`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, WorkshopError> {
        let mut fields = self.data;
        fields.insert("id".to_string(), Value::String(self.id));
        fields.insert("created_at".to_string(), Value::String(self.created_at));
        fields.insert("updated_at".to_string(), Value::String(self.updated_at));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Value used for filtering and ordering, including system fields.
    pub(crate) fn sort_key(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "created_at" => Some(Value::String(self.created_at.clone())),
            "updated_at" => Some(Value::String(self.updated_at.clone())),
            _ => self.data.get(name).cloned(),
        }
    }
}

/// Serialize a record into document fields, dropping system fields.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, WorkshopError> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            for system in SYSTEM_FIELDS {
                fields.remove(system);
            }
            Ok(fields)
        }
        other => Err(WorkshopError::Validation(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Equality on a field that a secondary index is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexKey {
    pub index: String,
    pub field: String,
    pub value: Value,
}

/// Equality filters and an optional ordering. With an index key the store
/// reads only the matching partition instead of the whole collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub index: Option<IndexKey>,
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, Order)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indexed(mut self, index: &str, field: &str, value: impl Into<Value>) -> Self {
        self.index = Some(IndexKey {
            index: index.to_string(),
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order = Some((field.to_string(), Order::Asc));
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order = Some((field.to_string(), Order::Desc));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let key_matches = self
            .index
            .as_ref()
            .map_or(true, |key| doc.sort_key(&key.field).as_ref() == Some(&key.value));
        key_matches
            && self
                .filters
                .iter()
                .all(|(field, expected)| doc.sort_key(field).as_ref() == Some(expected))
    }

    /// Stable sort, so documents with equal keys keep their incoming order.
    pub fn sort(&self, docs: &mut [Document]) {
        if let Some((field, order)) = &self.order {
            docs.sort_by(|a, b| {
                let ordering = compare_values(a.sort_key(field).as_ref(), b.sort_key(field).as_ref());
                match order {
                    Order::Asc => ordering,
                    Order::Desc => ordering.reverse(),
                }
            });
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
