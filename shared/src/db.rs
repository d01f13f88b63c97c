use crate::backend::{to_fields, Query};
use crate::error::WorkshopError;
use crate::types::{
    ImageRef, Instructor, NewRegistration, NewUserProfile, ReviewStatus, SupportStaff,
    UserProfile, WorkshopRegistration,
};
use crate::AppState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ========== USERS ==========
/// Create the profile document. Its id is the account id.
pub async fn create_user(
    state: &AppState,
    user_id: &str,
    profile: &NewUserProfile,
) -> Result<UserProfile, WorkshopError> {
    let doc = state
        .documents
        .create(&state.config.collections.users, user_id, to_fields(profile)?)
        .await?;
    doc.decode()
}

pub async fn get_user(state: &AppState, user_id: &str) -> Result<UserProfile, WorkshopError> {
    state
        .documents
        .get(&state.config.collections.users, user_id)
        .await
        .map_err(|e| match e {
            WorkshopError::NotFound(_) => WorkshopError::NotFound("User not found".to_string()),
            other => other,
        })?
        .decode()
}

pub async fn update_user(
    state: &AppState,
    user_id: &str,
    patch: Map<String, Value>,
) -> Result<UserProfile, WorkshopError> {
    state
        .documents
        .update(&state.config.collections.users, user_id, patch)
        .await?
        .decode()
}

pub async fn set_registration_status(
    state: &AppState,
    user_id: &str,
    status: ReviewStatus,
) -> Result<UserProfile, WorkshopError> {
    let mut patch = Map::new();
    patch.insert("registration_status".to_string(), Value::String(status.as_str().to_string()));
    update_user(state, user_id, patch).await
}

pub async fn set_profile_picture(
    state: &AppState,
    user_id: &str,
    file_id: &str,
) -> Result<UserProfile, WorkshopError> {
    let mut patch = Map::new();
    patch.insert("profile_picture".to_string(), Value::String(file_id.to_string()));
    update_user(state, user_id, patch).await
}

/// All users, newest first.
pub async fn list_users(state: &AppState) -> Result<Vec<UserProfile>, WorkshopError> {
    state
        .documents
        .list(&state.config.collections.users, &Query::new().order_desc("created_at"))
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect()
}

// ========== WORKSHOP REGISTRATIONS ==========
pub async fn create_registration(
    state: &AppState,
    registration: &NewRegistration,
) -> Result<WorkshopRegistration, WorkshopError> {
    state
        .documents
        .create(
            &state.config.collections.workshop_registrations,
            &new_id(),
            to_fields(registration)?,
        )
        .await?
        .decode()
}

pub async fn get_registration(
    state: &AppState,
    registration_id: &str,
) -> Result<WorkshopRegistration, WorkshopError> {
    state
        .documents
        .get(&state.config.collections.workshop_registrations, registration_id)
        .await
        .map_err(|e| match e {
            WorkshopError::NotFound(_) => {
                WorkshopError::NotFound("Registration not found".to_string())
            }
            other => other,
        })?
        .decode()
}

/// A user's registrations, oldest first.
pub async fn list_user_registrations(
    state: &AppState,
    user_id: &str,
) -> Result<Vec<WorkshopRegistration>, WorkshopError> {
    let query = Query::new()
        .indexed(&state.config.collections.registrations_by_user, "user_id", user_id)
        .order_asc("registration_date");
    state
        .documents
        .list(&state.config.collections.workshop_registrations, &query)
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect()
}

/// All registrations, newest first.
pub async fn list_registrations(
    state: &AppState,
) -> Result<Vec<WorkshopRegistration>, WorkshopError> {
    state
        .documents
        .list(
            &state.config.collections.workshop_registrations,
            &Query::new().order_desc("created_at"),
        )
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect()
}

pub async fn update_registration(
    state: &AppState,
    registration_id: &str,
    patch: Map<String, Value>,
) -> Result<WorkshopRegistration, WorkshopError> {
    tracing::info!("Updating registration {}", registration_id);
    state
        .documents
        .update(&state.config.collections.workshop_registrations, registration_id, patch)
        .await?
        .decode()
}

// ========== INSTRUCTORS ==========
/// Instructor as stored: the image is a plain string, resolved into an
/// [`ImageRef`] on the way out.
#[derive(Debug, Serialize, Deserialize)]
struct InstructorRecord {
    #[serde(default, skip_serializing)]
    id: String,
    name: String,
    bio: String,
    #[serde(default)]
    expertise: Vec<String>,
    #[serde(default)]
    profile_image: Option<String>,
    #[serde(default)]
    social_linkedin: Option<String>,
    #[serde(default)]
    social_twitter: Option<String>,
    #[serde(default)]
    social_github: Option<String>,
    #[serde(default)]
    social_website: Option<String>,
    #[serde(default)]
    created_by: String,
    #[serde(default, skip_serializing)]
    created_at: String,
    #[serde(default, skip_serializing)]
    updated_at: String,
}

impl From<InstructorRecord> for Instructor {
    fn from(record: InstructorRecord) -> Self {
        Instructor {
            id: record.id,
            name: record.name,
            bio: record.bio,
            expertise: record.expertise,
            profile_image: record.profile_image.as_deref().and_then(ImageRef::parse),
            social_linkedin: record.social_linkedin,
            social_twitter: record.social_twitter,
            social_github: record.social_github,
            social_website: record.social_website,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

fn instructor_record(instructor: &Instructor) -> InstructorRecord {
    InstructorRecord {
        id: String::new(),
        name: instructor.name.clone(),
        bio: instructor.bio.clone(),
        expertise: instructor.expertise.clone(),
        profile_image: instructor
            .profile_image
            .as_ref()
            .map(|image| image.as_stored_string().to_string()),
        social_linkedin: instructor.social_linkedin.clone(),
        social_twitter: instructor.social_twitter.clone(),
        social_github: instructor.social_github.clone(),
        social_website: instructor.social_website.clone(),
        created_by: instructor.created_by.clone(),
        created_at: String::new(),
        updated_at: String::new(),
    }
}

/// Store a new instructor. Only the content fields of `instructor` are used.
pub async fn create_instructor(
    state: &AppState,
    instructor: &Instructor,
) -> Result<Instructor, WorkshopError> {
    let record: InstructorRecord = state
        .documents
        .create(
            &state.config.collections.instructors,
            &new_id(),
            to_fields(&instructor_record(instructor))?,
        )
        .await?
        .decode()?;
    Ok(record.into())
}

pub async fn list_instructors(state: &AppState) -> Result<Vec<Instructor>, WorkshopError> {
    state
        .documents
        .list(&state.config.collections.instructors, &Query::new().order_asc("created_at"))
        .await?
        .into_iter()
        .map(|doc| doc.decode::<InstructorRecord>().map(Instructor::from))
        .collect()
}

/// Replace an instructor's content fields; absent optionals are removed and
/// `created_by` is left untouched.
pub async fn update_instructor(
    state: &AppState,
    instructor_id: &str,
    instructor: &Instructor,
) -> Result<Instructor, WorkshopError> {
    let mut patch = to_fields(&instructor_record(instructor))?;
    patch.remove("created_by");
    let record: InstructorRecord = state
        .documents
        .update(&state.config.collections.instructors, instructor_id, patch)
        .await?
        .decode()?;
    Ok(record.into())
}

pub async fn delete_instructor(state: &AppState, instructor_id: &str) -> Result<(), WorkshopError> {
    state
        .documents
        .delete(&state.config.collections.instructors, instructor_id)
        .await
}

// ========== SUPPORT STAFF ==========
#[derive(Debug, Serialize, Deserialize)]
struct SupportStaffRecord {
    #[serde(default, skip_serializing)]
    id: String,
    name: String,
    role: String,
    #[serde(default)]
    contact: String,
    #[serde(default)]
    profile_image: Option<String>,
    #[serde(default)]
    created_by: String,
    #[serde(default, skip_serializing)]
    created_at: String,
    #[serde(default, skip_serializing)]
    updated_at: String,
}

impl From<SupportStaffRecord> for SupportStaff {
    fn from(record: SupportStaffRecord) -> Self {
        SupportStaff {
            id: record.id,
            name: record.name,
            role: record.role,
            contact: record.contact,
            profile_image: record.profile_image.as_deref().and_then(ImageRef::parse),
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

fn support_staff_record(staff: &SupportStaff) -> SupportStaffRecord {
    SupportStaffRecord {
        id: String::new(),
        name: staff.name.clone(),
        role: staff.role.clone(),
        contact: staff.contact.clone(),
        profile_image: staff
            .profile_image
            .as_ref()
            .map(|image| image.as_stored_string().to_string()),
        created_by: staff.created_by.clone(),
        created_at: String::new(),
        updated_at: String::new(),
    }
}

pub async fn create_support_staff(
    state: &AppState,
    staff: &SupportStaff,
) -> Result<SupportStaff, WorkshopError> {
    let record: SupportStaffRecord = state
        .documents
        .create(
            &state.config.collections.support_staff,
            &new_id(),
            to_fields(&support_staff_record(staff))?,
        )
        .await?
        .decode()?;
    Ok(record.into())
}

pub async fn list_support_staff(state: &AppState) -> Result<Vec<SupportStaff>, WorkshopError> {
    state
        .documents
        .list(&state.config.collections.support_staff, &Query::new().order_asc("created_at"))
        .await?
        .into_iter()
        .map(|doc| doc.decode::<SupportStaffRecord>().map(SupportStaff::from))
        .collect()
}

pub async fn update_support_staff(
    state: &AppState,
    staff_id: &str,
    staff: &SupportStaff,
) -> Result<SupportStaff, WorkshopError> {
    let mut patch = to_fields(&support_staff_record(staff))?;
    patch.remove("created_by");
    let record: SupportStaffRecord = state
        .documents
        .update(&state.config.collections.support_staff, staff_id, patch)
        .await?
        .decode()?;
    Ok(record.into())
}

pub async fn delete_support_staff(state: &AppState, staff_id: &str) -> Result<(), WorkshopError> {
    state
        .documents
        .delete(&state.config.collections.support_staff, staff_id)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::Role;
    use serde_json::json;

    fn profile(name: &str) -> NewUserProfile {
        NewUserProfile {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            student_id: "CS-2405".to_string(),
            phone: "01712345678".to_string(),
            institution: "NCC".to_string(),
            role: Role::User,
            registration_status: ReviewStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_user_round_trip_through_documents() {
        let state = AppState::in_memory(Config::local());

        let created = create_user(&state, "acct-1", &profile("Rafi")).await.unwrap();
        assert_eq!(created.id, "acct-1");
        assert_eq!(created.registration_status, ReviewStatus::Pending);
        assert_eq!(created.profile_picture, None);

        let updated = set_registration_status(&state, "acct-1", ReviewStatus::Verified)
            .await
            .unwrap();
        assert_eq!(updated.registration_status, ReviewStatus::Verified);
        assert_eq!(get_user(&state, "acct-1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let state = AppState::in_memory(Config::local());
        let err = get_user(&state, "nobody").await.unwrap_err();
        assert!(matches!(err, WorkshopError::NotFound(m) if m == "User not found"));
    }

    #[tokio::test]
    async fn test_stored_image_string_is_resolved_once() {
        let state = AppState::in_memory(Config::local());
        let mut data = Map::new();
        data.insert("name".to_string(), json!("Tanvir"));
        data.insert("bio".to_string(), json!("Red teamer"));
        data.insert("expertise".to_string(), json!(["OSINT"]));
        data.insert("profile_image".to_string(), json!("https://img.example.com/t.png"));
        data.insert("created_by".to_string(), json!("admin-1"));
        state
            .documents
            .create(&state.config.collections.instructors, "ins-1", data)
            .await
            .unwrap();

        let instructors = list_instructors(&state).await.unwrap();
        assert_eq!(
            instructors[0].profile_image,
            Some(ImageRef::External { url: "https://img.example.com/t.png".to_string() })
        );
    }

    #[tokio::test]
    async fn test_update_instructor_keeps_creator_and_clears_image() {
        let state = AppState::in_memory(Config::local());
        let mut instructor = Instructor {
            id: String::new(),
            name: "Tanvir".to_string(),
            bio: "Red teamer".to_string(),
            expertise: vec!["OSINT".to_string()],
            profile_image: Some(ImageRef::Stored { file_id: "abc".to_string() }),
            social_linkedin: None,
            social_twitter: None,
            social_github: Some("https://github.com/tanvir".to_string()),
            social_website: None,
            created_by: "admin-1".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let created = create_instructor(&state, &instructor).await.unwrap();

        instructor.profile_image = None;
        instructor.created_by = "admin-2".to_string();
        let updated = update_instructor(&state, &created.id, &instructor).await.unwrap();

        assert_eq!(updated.profile_image, None);
        assert_eq!(updated.created_by, "admin-1");
        assert_eq!(updated.social_github.as_deref(), Some("https://github.com/tanvir"));
    }
}
