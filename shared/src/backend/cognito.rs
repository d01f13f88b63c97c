use super::AccountService;
use crate::error::WorkshopError;
use crate::types::{AccountInfo, AuthTokens};
use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Accounts and sessions in a Cognito user pool. The email is the username.
pub struct CognitoAccounts {
    client: CognitoClient,
    client_id: String,
    client_secret: String,
    user_pool_id: Option<String>,
}

impl CognitoAccounts {
    pub fn new(
        client: CognitoClient,
        client_id: String,
        client_secret: String,
        user_pool_id: Option<String>,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            user_pool_id,
        }
    }

    fn secret_hash(&self, username: &str) -> Result<String, WorkshopError> {
        compute_secret_hash(username, &self.client_id, &self.client_secret)
    }
}

/// Compute the SECRET_HASH Cognito expects from app clients with a secret.
pub fn compute_secret_hash(
    username: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, WorkshopError> {
    let message = format!("{}{}", username, client_id);
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|e| WorkshopError::backend("Invalid client secret", e))?;
    mac.update(message.as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Turn a Cognito login failure into a message the user can act on.
pub fn login_error_message(error_message: &str) -> &'static str {
    if error_message.contains("NotAuthorizedException") {
        "Incorrect email or password"
    } else if error_message.contains("UserNotConfirmedException") {
        "Please verify your email before logging in"
    } else if error_message.contains("UserNotFoundException") {
        "No account found with this email"
    } else if error_message.contains("PasswordResetRequiredException") {
        "Password reset required"
    } else if error_message.contains("TooManyRequestsException") {
        "Too many login attempts. Please try again later"
    } else {
        "Login failed. Please check your credentials"
    }
}

pub fn signup_error_message(error_message: &str) -> &'static str {
    if error_message.contains("InvalidPasswordException") {
        "Password must contain at least 8 characters with uppercase, lowercase, number, and special character"
    } else if error_message.contains("UsernameExistsException") {
        "An account with this email already exists"
    } else if error_message.contains("InvalidParameterException") {
        "Invalid email or password format"
    } else {
        "Signup failed. Please check your credentials and try again."
    }
}

#[async_trait]
impl AccountService for CognitoAccounts {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<String, WorkshopError> {
        tracing::info!("Signing up user: {}", email);

        let email_attr = AttributeType::builder()
            .name("email")
            .value(email)
            .build()
            .map_err(|e| WorkshopError::backend("Failed to build email attribute", e))?;
        let name_attr = AttributeType::builder()
            .name("name")
            .value(name)
            .build()
            .map_err(|e| WorkshopError::backend("Failed to build name attribute", e))?;

        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .secret_hash(self.secret_hash(email)?)
            .user_attributes(email_attr)
            .user_attributes(name_attr)
            .send()
            .await
            .map_err(|e| {
                let error_message = format!("{:?}", e);
                tracing::error!("Cognito signup error: {}", error_message);
                WorkshopError::Auth(signup_error_message(&error_message).to_string())
            })?;

        // Sign-up does not authenticate, and an unconfirmed user cannot log in.
        // Email ownership is checked separately through the verification flow.
        if let Some(user_pool_id) = &self.user_pool_id {
            if let Err(e) = self
                .client
                .admin_confirm_sign_up()
                .user_pool_id(user_pool_id)
                .username(email)
                .send()
                .await
            {
                tracing::error!("Failed to auto-confirm user: {:?}", e);
            } else {
                tracing::info!("User auto-confirmed: {}", email);
            }
        } else {
            tracing::warn!("COGNITO_USER_POOL_ID not set; skipping auto-confirm");
        }

        Ok(output.user_sub().to_string())
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<AuthTokens, WorkshopError> {
        tracing::info!("Authenticating user: {}", email);

        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .auth_parameters("SECRET_HASH", self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| {
                let error_message = format!("{:?}", e);
                tracing::error!("Cognito authentication error: {}", error_message);
                WorkshopError::Auth(login_error_message(&error_message).to_string())
            })?;

        let auth_result = response.authentication_result().ok_or_else(|| {
            tracing::error!("No authentication result returned");
            WorkshopError::Auth("Login failed. Please check your credentials".to_string())
        })?;

        Ok(AuthTokens {
            id_token: auth_result.id_token().unwrap_or_default().to_string(),
            access_token: auth_result.access_token().unwrap_or_default().to_string(),
            refresh_token: auth_result.refresh_token().unwrap_or_default().to_string(),
            expires_in: auth_result.expires_in(),
        })
    }

    async fn current_account(&self, access_token: &str) -> Result<Option<AccountInfo>, WorkshopError> {
        let result = self.client.get_user().access_token(access_token).send().await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let error_message = format!("{:?}", e);
                if error_message.contains("NotAuthorizedException")
                    || error_message.contains("UserNotFoundException")
                {
                    tracing::debug!("Access token rejected; treating caller as logged out");
                    return Ok(None);
                }
                return Err(WorkshopError::Backend(error_message));
            }
        };

        let attribute = |name: &str| {
            output
                .user_attributes()
                .iter()
                .find(|attr| attr.name() == name)
                .and_then(|attr| attr.value())
                .map(|v| v.to_string())
        };

        let Some(id) = attribute("sub") else {
            tracing::warn!("Cognito user {} has no sub attribute", output.username());
            return Ok(None);
        };

        Ok(Some(AccountInfo {
            id,
            email: attribute("email").unwrap_or_default(),
            email_verified: attribute("email_verified").as_deref() == Some("true"),
        }))
    }

    async fn delete_session(&self, access_token: &str) -> Result<(), WorkshopError> {
        self.client
            .global_sign_out()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| WorkshopError::backend("Failed to sign out", e))?;
        Ok(())
    }

    async fn request_email_verification(&self, access_token: &str) -> Result<(), WorkshopError> {
        self.client
            .get_user_attribute_verification_code()
            .access_token(access_token)
            .attribute_name("email")
            .send()
            .await
            .map_err(|e| WorkshopError::backend("Failed to send verification code", e))?;
        Ok(())
    }

    async fn confirm_email_verification(
        &self,
        access_token: &str,
        code: &str,
    ) -> Result<(), WorkshopError> {
        self.client
            .verify_user_attribute()
            .access_token(access_token)
            .attribute_name("email")
            .code(code)
            .send()
            .await
            .map_err(|e| {
                let error_message = format!("{:?}", e);
                if error_message.contains("CodeMismatchException")
                    || error_message.contains("ExpiredCodeException")
                {
                    WorkshopError::Validation("Invalid verification code".to_string())
                } else {
                    WorkshopError::Backend(error_message)
                }
            })?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), WorkshopError> {
        let result = self
            .client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .secret_hash(self.secret_hash(email)?)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_message = format!("{:?}", e);
                // Don't reveal whether the account exists
                if error_message.contains("UserNotFoundException") {
                    tracing::info!("Password reset requested for unknown email");
                    Ok(())
                } else {
                    Err(WorkshopError::Backend(error_message))
                }
            }
        }
    }

    async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), WorkshopError> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(new_password)
            .secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| {
                let error_message = format!("{:?}", e);
                tracing::error!("Cognito password reset error: {}", error_message);
                if error_message.contains("CodeMismatchException")
                    || error_message.contains("ExpiredCodeException")
                {
                    WorkshopError::Validation("Invalid or expired reset code".to_string())
                } else if error_message.contains("InvalidPasswordException") {
                    WorkshopError::Validation(signup_error_message(&error_message).to_string())
                } else {
                    WorkshopError::Backend(error_message)
                }
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_hash_is_hmac_sha256() {
        let hash = compute_secret_hash("user@example.com", "client", "secret").unwrap();
        let raw = general_purpose::STANDARD.decode(&hash).unwrap();

        assert_eq!(raw.len(), 32);
        assert_eq!(hash, compute_secret_hash("user@example.com", "client", "secret").unwrap());
        assert_ne!(hash, compute_secret_hash("other@example.com", "client", "secret").unwrap());
    }

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            login_error_message("ServiceError { source: NotAuthorizedException(..) }"),
            "Incorrect email or password"
        );
        assert_eq!(
            login_error_message("UserNotConfirmedException"),
            "Please verify your email before logging in"
        );
        assert_eq!(
            login_error_message("DispatchFailure"),
            "Login failed. Please check your credentials"
        );
    }
}
