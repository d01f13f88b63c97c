use crate::backend::to_fields;
use crate::db;
use crate::error::{DownloadRefusal, WorkshopError};
use crate::session::Session;
use crate::storage::{self, UploadKind};
use crate::types::{
    Decision, NewRegistration, PaymentEvidence, ReviewStatus, UploadedFile, UserProfile,
    WorkshopRegistration,
};
use crate::workshop::{reference_code, PaymentInstructions, WORKSHOP_TYPE};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct MyRegistration {
    pub registration: Option<WorkshopRegistration>,
    pub reference_code: String,
    pub payment_instructions: PaymentInstructions,
}

/// Payment evidence as submitted, before validation.
#[derive(Debug)]
pub struct PaymentSubmission {
    pub transaction_number: String,
    pub transaction_id: String,
    pub screenshot: Option<UploadedFile>,
}

/// The caller's registration. Legacy duplicates resolve to the earliest.
async fn current_registration(
    session: &Session,
    user: &UserProfile,
) -> Result<Option<WorkshopRegistration>, WorkshopError> {
    Ok(db::list_user_registrations(session.state(), &user.id)
        .await?
        .into_iter()
        .next())
}

/// Payment review moves through these states:
///
/// ```text
/// (none) --register--> pending
/// pending | rejected --submit_payment--> pending, evidence attached
/// pending, evidence attached --decide_payment--> verified | rejected
/// ```
pub async fn register(session: &Session) -> Result<WorkshopRegistration, WorkshopError> {
    let user = session.require_user()?;

    if current_registration(session, user).await?.is_some() {
        return Err(WorkshopError::Conflict(
            "You are already registered for the workshop".to_string(),
        ));
    }

    let registration = db::create_registration(
        session.state(),
        &NewRegistration {
            user_id: user.id.clone(),
            workshop_type: WORKSHOP_TYPE.to_string(),
            registration_date: chrono::Utc::now().to_rfc3339(),
            payment_status: ReviewStatus::Pending,
        },
    )
    .await?;

    tracing::info!("User {} registered for the workshop as {}", user.id, registration.id);
    Ok(registration)
}

pub async fn my_registration(session: &Session) -> Result<MyRegistration, WorkshopError> {
    let user = session.require_user()?;
    let registration = current_registration(session, user).await?;

    Ok(MyRegistration {
        registration,
        reference_code: reference_code(&user.student_id),
        payment_instructions: PaymentInstructions::new(&session.state().config, &user.student_id),
    })
}

/// Attach payment evidence and put the registration back to pending.
///
/// The screenshot is uploaded first; if the document write then fails the
/// upload is removed again.
pub async fn submit_payment(
    session: &Session,
    registration_id: &str,
    submission: PaymentSubmission,
) -> Result<WorkshopRegistration, WorkshopError> {
    let user = session.require_user()?;
    let state = session.state();

    let transaction_number = submission.transaction_number.trim();
    let transaction_id = submission.transaction_id.trim();
    if transaction_number.is_empty() || transaction_id.is_empty() {
        return Err(WorkshopError::Validation(
            "Please fill in all payment details".to_string(),
        ));
    }
    let screenshot = submission.screenshot.ok_or_else(|| {
        WorkshopError::Validation("Please upload payment screenshot".to_string())
    })?;
    storage::validate_upload(&screenshot, UploadKind::PaymentScreenshot)?;

    let registration = db::get_registration(state, registration_id).await?;
    if registration.user_id != user.id {
        return Err(WorkshopError::NotFound("Registration not found".to_string()));
    }
    if registration.payment_status == ReviewStatus::Verified {
        return Err(WorkshopError::Conflict(
            "Payment has already been verified".to_string(),
        ));
    }

    let stored = storage::upload_file(state, &screenshot, UploadKind::PaymentScreenshot).await?;

    let evidence = PaymentEvidence {
        payment_transaction_number: transaction_number.to_string(),
        payment_transaction_id: transaction_id.to_string(),
        payment_screenshot_url: stored.id.clone(),
        payment_submitted_at: chrono::Utc::now().to_rfc3339(),
        payment_status: ReviewStatus::Pending,
    };

    let updated = match db::update_registration(state, registration_id, to_fields(&evidence)?).await
    {
        Ok(updated) => updated,
        Err(e) => {
            tracing::error!(
                "Failed to record payment for {}; removing uploaded screenshot {}",
                registration_id,
                stored.id
            );
            storage::delete_file_best_effort(state, &stored.id).await;
            return Err(e);
        }
    };

    if let Some(old) = registration
        .payment_screenshot_url
        .filter(|old| *old != stored.id)
    {
        storage::delete_file_best_effort(state, &old).await;
    }

    tracing::info!("Payment submitted for registration {}", registration_id);
    Ok(updated)
}

/// Admin verdict on submitted payment evidence.
pub async fn decide_payment(
    session: &Session,
    registration_id: &str,
    decision: Decision,
) -> Result<WorkshopRegistration, WorkshopError> {
    let admin = session.require_admin()?;
    let state = session.state();

    let registration = db::get_registration(state, registration_id).await?;
    if registration.payment_status != ReviewStatus::Pending || !registration.has_payment_evidence() {
        return Err(WorkshopError::Conflict(
            "Only pending payments with submitted evidence can be reviewed".to_string(),
        ));
    }

    let status = ReviewStatus::from(decision);
    let mut patch = Map::new();
    patch.insert("payment_status".to_string(), Value::String(status.as_str().to_string()));
    let updated = db::update_registration(state, registration_id, patch).await?;

    tracing::info!(
        "Admin {} marked payment for {} as {}",
        admin.id,
        registration_id,
        status.as_str()
    );
    Ok(updated)
}

/// Account-level approval, independent of payment review. Only pending
/// accounts can be decided.
pub async fn update_registration_status(
    session: &Session,
    user_id: &str,
    decision: Decision,
) -> Result<UserProfile, WorkshopError> {
    let admin = session.require_admin()?;
    let state = session.state();

    let user = db::get_user(state, user_id).await?;
    if user.registration_status != ReviewStatus::Pending {
        return Err(WorkshopError::Conflict(format!(
            "Account is already {}",
            user.registration_status.as_str()
        )));
    }
    let status = ReviewStatus::from(decision);
    let updated = db::set_registration_status(state, user_id, status).await?;

    tracing::info!("Admin {} marked user {} as {}", admin.id, user_id, status.as_str());
    Ok(updated)
}

/// The caller's registration, if it entitles them to the event details.
pub async fn event_details_access(
    session: &Session,
) -> Result<WorkshopRegistration, WorkshopError> {
    let user = session.require_user()?;
    match current_registration(session, user).await? {
        None => Err(WorkshopError::EventDetailsUnavailable(
            DownloadRefusal::NotRegistered,
        )),
        Some(registration) if registration.payment_status != ReviewStatus::Verified => Err(
            WorkshopError::EventDetailsUnavailable(DownloadRefusal::PaymentNotVerified),
        ),
        Some(registration) => Ok(registration),
    }
}

// ========== ADMIN LISTINGS ==========
pub async fn list_registrations(
    session: &Session,
) -> Result<Vec<WorkshopRegistration>, WorkshopError> {
    session.require_admin()?;
    db::list_registrations(session.state()).await
}

pub async fn list_users(session: &Session) -> Result<Vec<UserProfile>, WorkshopError> {
    session.require_admin()?;
    db::list_users(session.state()).await
}
