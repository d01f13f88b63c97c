use crate::backend::to_fields;
use crate::db;
use crate::error::WorkshopError;
use crate::storage::{self, UploadKind};
use crate::types::{
    AuthTokens, LoginRequest, NewUserProfile, RegisterRequest, ResetPasswordRequest, ReviewStatus,
    Role, UpdateProfileRequest, UploadedFile, UserProfile,
};
use crate::validation::{validate_email, validate_password, validate_profile_update, validate_registration};
use crate::AppState;
use std::sync::Arc;

/// The caller for the lifetime of one request, built by [`Session::restore`].
/// Privileged operations ask it for [`Session::require_user`] or
/// [`Session::require_admin`] before touching data.
pub struct Session {
    state: Arc<AppState>,
    access_token: Option<String>,
    user: Option<UserProfile>,
    email_verified: bool,
}

impl Session {
    pub fn anonymous(state: Arc<AppState>) -> Self {
        Self {
            state,
            access_token: None,
            user: None,
            email_verified: false,
        }
    }

    /// Resolve the bearer token into a session. Unknown or expired tokens and
    /// accounts without a profile document give an anonymous session.
    pub async fn restore(
        state: Arc<AppState>,
        access_token: Option<&str>,
    ) -> Result<Self, WorkshopError> {
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return Ok(Self::anonymous(state));
        };

        let Some(account) = state.accounts.current_account(token).await? else {
            return Ok(Self::anonymous(state));
        };

        let user = match db::get_user(&state, &account.id).await {
            Ok(user) => user,
            Err(WorkshopError::NotFound(_)) => {
                tracing::warn!("Account {} has no profile document", account.id);
                return Ok(Self::anonymous(state));
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            state,
            access_token: Some(token.to_string()),
            user: Some(user),
            email_verified: account.email_verified,
        })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Whether the account service has confirmed the caller's email address.
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn require_user(&self) -> Result<&UserProfile, WorkshopError> {
        self.user.as_ref().ok_or(WorkshopError::NotAuthenticated)
    }

    pub fn require_admin(&self) -> Result<&UserProfile, WorkshopError> {
        match &self.user {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(WorkshopError::AccessDenied),
        }
    }

    fn require_token(&self) -> Result<&str, WorkshopError> {
        self.access_token
            .as_deref()
            .ok_or(WorkshopError::NotAuthenticated)
    }

    pub async fn login(&mut self, req: &LoginRequest) -> Result<AuthTokens, WorkshopError> {
        let email = req.email.trim();
        if email.is_empty() || req.password.is_empty() {
            return Err(WorkshopError::Validation(
                "Please enter your email and password".to_string(),
            ));
        }

        let tokens = self.state.accounts.create_session(email, &req.password).await?;
        self.load_user(&tokens).await?;
        tracing::info!("Authentication successful for user: {}", email);
        Ok(tokens)
    }

    /// Create the account, log in and write the profile document. No workshop
    /// registration is created here.
    pub async fn register(&mut self, req: &RegisterRequest) -> Result<AuthTokens, WorkshopError> {
        validate_registration(req)?;
        let email = req.email.trim();

        let account_id = self
            .state
            .accounts
            .create_account(email, &req.password, req.name.trim())
            .await?;

        // Account creation does not authenticate
        let tokens = self.state.accounts.create_session(email, &req.password).await?;

        let profile = NewUserProfile {
            name: req.name.trim().to_string(),
            email: email.to_string(),
            student_id: req.student_id.trim().to_string(),
            phone: req.phone.trim().to_string(),
            institution: req.institution.trim().to_string(),
            role: Role::User,
            registration_status: ReviewStatus::Pending,
        };
        let user = db::create_user(&self.state, &account_id, &profile).await?;
        tracing::info!("Signup successful for user: {}", email);

        if let Err(e) = self
            .state
            .accounts
            .request_email_verification(&tokens.access_token)
            .await
        {
            tracing::warn!("Failed to send verification email to {}: {:?}", email, e);
        }

        self.access_token = Some(tokens.access_token.clone());
        self.user = Some(user);
        self.email_verified = false;
        Ok(tokens)
    }

    /// End the session. Local state is cleared even when the remote call fails.
    pub async fn logout(&mut self) -> Result<(), WorkshopError> {
        self.user = None;
        self.email_verified = false;
        let Some(token) = self.access_token.take() else {
            return Ok(());
        };
        self.state.accounts.delete_session(&token).await.map_err(|e| {
            tracing::error!("Failed to delete session: {:?}", e);
            e
        })
    }

    /// Write the editable profile fields and refresh the in-session profile.
    pub async fn update_user(
        &mut self,
        req: &UpdateProfileRequest,
    ) -> Result<UserProfile, WorkshopError> {
        let user_id = self.require_user()?.id.clone();
        validate_profile_update(req)?;

        let updated = db::update_user(&self.state, &user_id, to_fields(req)?).await?;
        self.user = Some(updated.clone());
        Ok(updated)
    }

    /// Upload a new picture, point the profile at it, then drop the old blob.
    pub async fn update_profile_picture(
        &mut self,
        file: &UploadedFile,
    ) -> Result<UserProfile, WorkshopError> {
        let user = self.require_user()?;
        let user_id = user.id.clone();
        let previous = user.profile_picture.clone();

        let stored = storage::upload_file(&self.state, file, UploadKind::ProfilePicture).await?;
        let updated = match db::set_profile_picture(&self.state, &user_id, &stored.id).await {
            Ok(updated) => updated,
            Err(e) => {
                storage::delete_file_best_effort(&self.state, &stored.id).await;
                return Err(e);
            }
        };

        if let Some(old) = previous.filter(|old| *old != stored.id) {
            storage::delete_file_best_effort(&self.state, &old).await;
        }

        self.user = Some(updated.clone());
        Ok(updated)
    }

    pub async fn confirm_email_verification(&mut self, code: &str) -> Result<(), WorkshopError> {
        self.require_user()?;
        let token = self.require_token()?;
        if code.trim().is_empty() {
            return Err(WorkshopError::Validation("Verification code is required".to_string()));
        }
        self.state
            .accounts
            .confirm_email_verification(token, code.trim())
            .await?;
        self.email_verified = true;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), WorkshopError> {
        let email = email.trim();
        if !validate_email(email) {
            return Err(WorkshopError::Validation("Please enter a valid email address".to_string()));
        }
        self.state.accounts.request_password_reset(email).await
    }

    pub async fn confirm_password_reset(
        &self,
        req: &ResetPasswordRequest,
    ) -> Result<(), WorkshopError> {
        if req.code.trim().is_empty() {
            return Err(WorkshopError::Validation("Reset code is required".to_string()));
        }
        validate_password(&req.password, &req.confirm_password)?;
        self.state
            .accounts
            .confirm_password_reset(req.email.trim(), req.code.trim(), &req.password)
            .await
    }

    async fn load_user(&mut self, tokens: &AuthTokens) -> Result<(), WorkshopError> {
        let account = self
            .state
            .accounts
            .current_account(&tokens.access_token)
            .await?
            .ok_or_else(|| WorkshopError::Auth("Login failed. Please check your credentials".to_string()))?;

        let user = db::get_user(&self.state, &account.id).await?;
        self.access_token = Some(tokens.access_token.clone());
        self.user = Some(user);
        self.email_verified = account.email_verified;
        Ok(())
    }
}
