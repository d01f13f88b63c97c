use serde::{Deserialize, Serialize};

// ========== STATUS ==========
/// Three-valued review state shared by `registration_status` and `payment_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Verified => "verified",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

/// Admin verdict on a payment or an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Verified,
    Rejected,
}

impl From<Decision> for ReviewStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Verified => ReviewStatus::Verified,
            Decision::Rejected => ReviewStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

// ========== USER ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    pub institution: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub registration_status: ReviewStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields written when the profile document is first created.
#[derive(Debug, Serialize)]
pub struct NewUserProfile {
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    pub institution: String,
    pub role: Role,
    pub registration_status: ReviewStatus,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    pub institution: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user-editable subset of the profile. Role and review status cannot be set here.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.institution.is_none()
            && self.student_id.is_none()
    }
}

// ========== AUTH ==========
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i32,
}

/// Account as the account service sees it, before the profile document is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountInfo {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub password: String,
    pub confirm_password: String,
}

// ========== REGISTRATION ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkshopRegistration {
    pub id: String,
    pub user_id: String,
    pub workshop_type: String,
    pub registration_date: String,
    pub payment_status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_transaction_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_transaction_id: Option<String>,
    /// Blob id of the uploaded screenshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_screenshot_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_submitted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkshopRegistration {
    pub fn has_payment_evidence(&self) -> bool {
        self.payment_transaction_number.is_some()
            && self.payment_transaction_id.is_some()
            && self.payment_screenshot_url.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct NewRegistration {
    pub user_id: String,
    pub workshop_type: String,
    pub registration_date: String,
    pub payment_status: ReviewStatus,
}

/// Evidence fields written together by a payment submission.
#[derive(Debug, Serialize)]
pub struct PaymentEvidence {
    pub payment_transaction_number: String,
    pub payment_transaction_id: String,
    pub payment_screenshot_url: String,
    pub payment_submitted_at: String,
    pub payment_status: ReviewStatus,
}

#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    #[serde(default)]
    pub transaction_number: String,
    #[serde(default)]
    pub transaction_id: String,
    pub screenshot: Option<FileUpload>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub status: Decision,
}

// ========== FILES ==========
/// Upload payload as it arrives over HTTP.
#[derive(Debug, Deserialize, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub file_data: String, // base64 encoded
}

/// Decoded upload, ready for validation and storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct FileContents {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// ========== IMAGE REFERENCE ==========
/// An image is either hosted elsewhere or stored in our blob store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    External { url: String },
    Stored { file_id: String },
}

impl ImageRef {
    /// Documents keep the image as one string; anything starting with `http` is a URL.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.starts_with("http") {
            Some(ImageRef::External { url: raw.to_string() })
        } else {
            Some(ImageRef::Stored { file_id: raw.to_string() })
        }
    }

    pub fn as_stored_string(&self) -> &str {
        match self {
            ImageRef::External { url } => url,
            ImageRef::Stored { file_id } => file_id,
        }
    }
}

// ========== INSTRUCTOR ==========
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub expertise: Vec<String>,
    pub profile_image: Option<ImageRef>,
    pub social_linkedin: Option<String>,
    pub social_twitter: Option<String>,
    pub social_github: Option<String>,
    pub social_website: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InstructorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub profile_image: Option<String>,
    pub social_linkedin: Option<String>,
    pub social_twitter: Option<String>,
    pub social_github: Option<String>,
    pub social_website: Option<String>,
}

// ========== SUPPORT STAFF ==========
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SupportStaff {
    pub id: String,
    pub name: String,
    pub role: String,
    pub contact: String,
    pub profile_image: Option<ImageRef>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SupportStaffRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub contact: String,
    pub profile_image: Option<String>,
}
