use super::{AccountService, BlobStore, Document, DocumentStore, Query};
use crate::error::WorkshopError;
use crate::types::{AccountInfo, AuthTokens, FileContents, StoredFile, UploadedFile};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

// ========== ACCOUNTS ==========
#[derive(Debug, Clone)]
struct Account {
    id: String,
    email: String,
    password: String,
    email_verified: bool,
    verification_code: Option<String>,
    reset_code: Option<String>,
}

/// Accounts and sessions held in memory.
#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<String, Account>>, // keyed by email
    sessions: RwLock<HashMap<String, String>>,  // access token -> email
    fail_verification: AtomicBool,
    fail_logout: AtomicBool,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make verification-email requests fail, as a flaky mail provider would.
    pub fn fail_verification_requests(&self, fail: bool) {
        self.fail_verification.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logouts(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// The code a verification email would have carried.
    pub async fn verification_code(&self, email: &str) -> Option<String> {
        self.accounts.read().await.get(email).and_then(|a| a.verification_code.clone())
    }

    pub async fn reset_code(&self, email: &str) -> Option<String> {
        self.accounts.read().await.get(email).and_then(|a| a.reset_code.clone())
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn email_for_token(&self, access_token: &str) -> Result<String, WorkshopError> {
        self.sessions
            .read()
            .await
            .get(access_token)
            .cloned()
            .ok_or(WorkshopError::NotAuthenticated)
    }
}

fn short_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase()
}

#[async_trait]
impl AccountService for InMemoryAccounts {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        _name: &str,
    ) -> Result<String, WorkshopError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(WorkshopError::Auth(
                "An account with this email already exists".to_string(),
            ));
        }
        let id = uuid::Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            Account {
                id: id.clone(),
                email: email.to_string(),
                password: password.to_string(),
                email_verified: false,
                verification_code: None,
                reset_code: None,
            },
        );
        Ok(id)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<AuthTokens, WorkshopError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email)
            .ok_or_else(|| WorkshopError::Auth("No account found with this email".to_string()))?;
        if account.password != password {
            return Err(WorkshopError::Auth("Incorrect email or password".to_string()));
        }

        let access_token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(access_token.clone(), email.to_string());

        Ok(AuthTokens {
            id_token: uuid::Uuid::new_v4().to_string(),
            access_token,
            refresh_token: uuid::Uuid::new_v4().to_string(),
            expires_in: 3600,
        })
    }

    async fn current_account(&self, access_token: &str) -> Result<Option<AccountInfo>, WorkshopError> {
        let Some(email) = self.sessions.read().await.get(access_token).cloned() else {
            return Ok(None);
        };
        Ok(self.accounts.read().await.get(&email).map(|a| AccountInfo {
            id: a.id.clone(),
            email: a.email.clone(),
            email_verified: a.email_verified,
        }))
    }

    async fn delete_session(&self, access_token: &str) -> Result<(), WorkshopError> {
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(WorkshopError::Backend("session service unavailable".to_string()));
        }
        self.sessions.write().await.remove(access_token);
        Ok(())
    }

    async fn request_email_verification(&self, access_token: &str) -> Result<(), WorkshopError> {
        if self.fail_verification.load(Ordering::SeqCst) {
            return Err(WorkshopError::Backend("mail provider unavailable".to_string()));
        }
        let email = self.email_for_token(access_token).await?;
        if let Some(account) = self.accounts.write().await.get_mut(&email) {
            account.verification_code = Some(short_code());
        }
        Ok(())
    }

    async fn confirm_email_verification(
        &self,
        access_token: &str,
        code: &str,
    ) -> Result<(), WorkshopError> {
        let email = self.email_for_token(access_token).await?;
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&email).ok_or(WorkshopError::NotAuthenticated)?;
        if account.verification_code.as_deref() != Some(code) {
            return Err(WorkshopError::Validation("Invalid verification code".to_string()));
        }
        account.email_verified = true;
        account.verification_code = None;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), WorkshopError> {
        // Unknown emails succeed silently so callers cannot probe for accounts.
        if let Some(account) = self.accounts.write().await.get_mut(email) {
            account.reset_code = Some(short_code());
        }
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), WorkshopError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(email)
            .filter(|a| a.reset_code.as_deref() == Some(code))
            .ok_or_else(|| WorkshopError::Validation("Invalid or expired reset code".to_string()))?;
        account.password = new_password.to_string();
        account.reset_code = None;
        Ok(())
    }
}

// ========== DOCUMENTS ==========
/// Collections held in memory, each in insertion order.
#[derive(Default)]
pub struct InMemoryDocuments {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    fail_updates: AtomicBool,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every update fail, to exercise partial-failure paths.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Store a document with its system fields exactly as given.
    pub async fn seed(&self, collection: &str, doc: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }
}

fn not_found(collection: &str, id: &str) -> WorkshopError {
    WorkshopError::NotFound(format!("Document {} not found in {}", id, collection))
}

#[async_trait]
impl DocumentStore for InMemoryDocuments {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, WorkshopError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Err(WorkshopError::Conflict(format!(
                "Document {} already exists in {}",
                id, collection
            )));
        }
        let now = chrono::Utc::now().to_rfc3339();
        let doc = Document {
            id: id.to_string(),
            created_at: now.clone(),
            updated_at: now,
            data: data.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Document, WorkshopError> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document, WorkshopError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(WorkshopError::Backend("document store unavailable".to_string()));
        }
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| not_found(collection, id))?;
        for (key, value) in patch {
            if value.is_null() {
                doc.data.remove(&key);
            } else {
                doc.data.insert(key, value);
            }
        }
        doc.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), WorkshopError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, WorkshopError> {
        let mut docs: Vec<Document> = self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.iter().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default();
        query.sort(&mut docs);
        Ok(docs)
    }
}

// ========== BLOBS ==========
#[derive(Default)]
pub struct InMemoryBlobs {
    files: RwLock<HashMap<String, FileContents>>,
}

impl InMemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, file_id: &str) -> bool {
        self.files.read().await.contains_key(file_id)
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobs {
    async fn put(&self, file: &UploadedFile) -> Result<StoredFile, WorkshopError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.files.write().await.insert(
            id.clone(),
            FileContents {
                content_type: file.content_type.clone(),
                bytes: file.bytes.clone(),
            },
        );
        Ok(StoredFile {
            id,
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.bytes.len(),
        })
    }

    async fn get(&self, file_id: &str) -> Result<FileContents, WorkshopError> {
        self.files
            .read()
            .await
            .get(file_id)
            .cloned()
            .ok_or_else(|| WorkshopError::NotFound(format!("File {} not found", file_id)))
    }

    async fn delete(&self, file_id: &str) -> Result<(), WorkshopError> {
        self.files
            .write()
            .await
            .remove(file_id)
            .map(|_| ())
            .ok_or_else(|| WorkshopError::NotFound(format!("File {} not found", file_id)))
    }
}
