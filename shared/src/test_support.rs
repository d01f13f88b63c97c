use crate::backend::{Document, InMemoryAccounts, InMemoryBlobs, InMemoryDocuments};
use crate::config::Config;
use crate::session::Session;
use crate::types::{RegisterRequest, UploadedFile};
use crate::AppState;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::{json, Map};
use std::io::Cursor;
use std::sync::Arc;

/// In-memory state with handles on the concrete backends.
pub struct Fixture {
    pub state: Arc<AppState>,
    pub accounts: Arc<InMemoryAccounts>,
    pub documents: Arc<InMemoryDocuments>,
    pub blobs: Arc<InMemoryBlobs>,
}

impl Fixture {
    pub fn new() -> Self {
        let accounts = Arc::new(InMemoryAccounts::new());
        let documents = Arc::new(InMemoryDocuments::new());
        let blobs = Arc::new(InMemoryBlobs::new());
        let state = AppState::new(
            Config::local(),
            accounts.clone(),
            documents.clone(),
            blobs.clone(),
        );
        Self {
            state,
            accounts,
            documents,
            blobs,
        }
    }

    pub async fn user_session(&self, name: &str, student_id: &str) -> Session {
        let mut session = Session::anonymous(self.state.clone());
        session
            .register(&register_form(name, student_id))
            .await
            .unwrap();
        session
    }

    pub async fn admin_session(&self) -> Session {
        let mut session = Session::anonymous(self.state.clone());
        let tokens = session
            .register(&register_form("Admin", "AD-0001"))
            .await
            .unwrap();
        let user_id = session.user().unwrap().id.clone();

        let mut patch = Map::new();
        patch.insert("role".to_string(), json!("admin"));
        self.state
            .documents
            .update(&self.state.config.collections.users, &user_id, patch)
            .await
            .unwrap();

        Session::restore(self.state.clone(), Some(&tokens.access_token))
            .await
            .unwrap()
    }

    /// A profile document with a fixed creation time and no account behind it.
    pub async fn seed_user(&self, id: &str, name: &str, institution: &str, created_at: &str) {
        let mut data = Map::new();
        data.insert("name".to_string(), json!(name));
        data.insert("email".to_string(), json!(format!("{}@example.com", id)));
        data.insert("student_id".to_string(), json!(format!("ST-{}", id)));
        data.insert("phone".to_string(), json!("01712345678"));
        data.insert("institution".to_string(), json!(institution));
        data.insert("role".to_string(), json!("user"));
        data.insert("registration_status".to_string(), json!("pending"));
        self.documents
            .seed(&self.state.config.collections.users, seeded(id, created_at, data))
            .await;
    }

    pub async fn seed_registration(
        &self,
        id: &str,
        user_id: &str,
        registration_date: &str,
        created_at: &str,
        payment_status: &str,
    ) {
        let mut data = Map::new();
        data.insert("user_id".to_string(), json!(user_id));
        data.insert("workshop_type".to_string(), json!("complete"));
        data.insert("registration_date".to_string(), json!(registration_date));
        data.insert("payment_status".to_string(), json!(payment_status));
        self.documents
            .seed(
                &self.state.config.collections.workshop_registrations,
                seeded(id, created_at, data),
            )
            .await;
    }
}

fn seeded(id: &str, created_at: &str, data: Map<String, serde_json::Value>) -> Document {
    Document {
        id: id.to_string(),
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
        data,
    }
}

pub fn register_form(name: &str, student_id: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        student_id: student_id.to_string(),
        phone: "01712345678".to_string(),
        institution: "NCC".to_string(),
        password: "hunter2hunter2".to_string(),
        confirm_password: "hunter2hunter2".to_string(),
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([20, 120, 220])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn png_upload() -> UploadedFile {
    UploadedFile {
        name: "screenshot.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: png_bytes(),
    }
}
