use crate::db;
use crate::error::WorkshopError;
use crate::session::Session;
use crate::types::{
    ImageRef, Instructor, InstructorRequest, SupportStaff, SupportStaffRequest,
};
use crate::validation::{clean_expertise, non_blank};
use crate::AppState;

fn required(value: &str, message: &str) -> Result<String, WorkshopError> {
    if value.trim().is_empty() {
        return Err(WorkshopError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

fn instructor_from_request(
    req: &InstructorRequest,
    created_by: &str,
) -> Result<Instructor, WorkshopError> {
    let name = required(&req.name, "Instructor name is required")?;
    let bio = required(&req.bio, "Instructor bio is required")?;
    let expertise = clean_expertise(&req.expertise);
    if expertise.is_empty() {
        return Err(WorkshopError::Validation(
            "At least one area of expertise is required".to_string(),
        ));
    }

    Ok(Instructor {
        id: String::new(),
        name,
        bio,
        expertise,
        profile_image: req.profile_image.as_deref().and_then(ImageRef::parse),
        social_linkedin: non_blank(req.social_linkedin.as_ref()),
        social_twitter: non_blank(req.social_twitter.as_ref()),
        social_github: non_blank(req.social_github.as_ref()),
        social_website: non_blank(req.social_website.as_ref()),
        created_by: created_by.to_string(),
        created_at: String::new(),
        updated_at: String::new(),
    })
}

fn support_staff_from_request(
    req: &SupportStaffRequest,
    created_by: &str,
) -> Result<SupportStaff, WorkshopError> {
    Ok(SupportStaff {
        id: String::new(),
        name: required(&req.name, "Name is required")?,
        role: required(&req.role, "Role is required")?,
        contact: req.contact.trim().to_string(),
        profile_image: req.profile_image.as_deref().and_then(ImageRef::parse),
        created_by: created_by.to_string(),
        created_at: String::new(),
        updated_at: String::new(),
    })
}

// ========== INSTRUCTORS ==========
/// Public listing; every change below is admin only.
pub async fn list_instructors(state: &AppState) -> Result<Vec<Instructor>, WorkshopError> {
    db::list_instructors(state).await
}

pub async fn create_instructor(
    session: &Session,
    req: &InstructorRequest,
) -> Result<Instructor, WorkshopError> {
    let admin = session.require_admin()?;
    let instructor = instructor_from_request(req, &admin.id)?;
    let created = db::create_instructor(session.state(), &instructor).await?;
    tracing::info!("Admin {} added instructor {}", admin.id, created.id);
    Ok(created)
}

pub async fn update_instructor(
    session: &Session,
    instructor_id: &str,
    req: &InstructorRequest,
) -> Result<Instructor, WorkshopError> {
    let admin = session.require_admin()?;
    let instructor = instructor_from_request(req, &admin.id)?;
    db::update_instructor(session.state(), instructor_id, &instructor).await
}

pub async fn delete_instructor(session: &Session, instructor_id: &str) -> Result<(), WorkshopError> {
    let admin = session.require_admin()?;
    db::delete_instructor(session.state(), instructor_id).await?;
    tracing::info!("Admin {} deleted instructor {}", admin.id, instructor_id);
    Ok(())
}

// ========== SUPPORT STAFF ==========
pub async fn list_support_staff(state: &AppState) -> Result<Vec<SupportStaff>, WorkshopError> {
    db::list_support_staff(state).await
}

pub async fn create_support_staff(
    session: &Session,
    req: &SupportStaffRequest,
) -> Result<SupportStaff, WorkshopError> {
    let admin = session.require_admin()?;
    let staff = support_staff_from_request(req, &admin.id)?;
    let created = db::create_support_staff(session.state(), &staff).await?;
    tracing::info!("Admin {} added support staff {}", admin.id, created.id);
    Ok(created)
}

pub async fn update_support_staff(
    session: &Session,
    staff_id: &str,
    req: &SupportStaffRequest,
) -> Result<SupportStaff, WorkshopError> {
    let admin = session.require_admin()?;
    let staff = support_staff_from_request(req, &admin.id)?;
    db::update_support_staff(session.state(), staff_id, &staff).await
}

pub async fn delete_support_staff(session: &Session, staff_id: &str) -> Result<(), WorkshopError> {
    let admin = session.require_admin()?;
    db::delete_support_staff(session.state(), staff_id).await?;
    tracing::info!("Admin {} deleted support staff {}", admin.id, staff_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    fn request() -> InstructorRequest {
        InstructorRequest {
            name: "Tanvir Hasan".to_string(),
            bio: "Penetration tester".to_string(),
            expertise: vec!["".to_string(), "a".to_string(), "".to_string()],
            profile_image: Some("https://img.example.com/tanvir.png".to_string()),
            social_linkedin: Some("   ".to_string()),
            social_github: Some("https://github.com/tanvir".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_instructor_cleans_input() {
        let fx = Fixture::new();
        let admin = fx.admin_session().await;

        let created = create_instructor(&admin, &request()).await.unwrap();

        assert_eq!(created.expertise, vec!["a".to_string()]);
        assert_eq!(created.social_linkedin, None);
        assert_eq!(created.created_by, admin.user().unwrap().id);
        assert_eq!(
            created.profile_image,
            Some(ImageRef::External {
                url: "https://img.example.com/tanvir.png".to_string()
            })
        );
        assert_eq!(list_instructors(&fx.state).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_instructor_validation() {
        let fx = Fixture::new();
        let admin = fx.admin_session().await;

        let mut req = request();
        req.expertise = vec!["  ".to_string()];
        assert!(matches!(
            create_instructor(&admin, &req).await,
            Err(WorkshopError::Validation(_))
        ));

        let mut req = request();
        req.bio = " ".to_string();
        assert!(create_instructor(&admin, &req).await.is_err());
    }

    #[tokio::test]
    async fn test_directory_changes_need_admin() {
        let fx = Fixture::new();
        let user = fx.user_session("Nusrat", "CS-2405").await;
        let anonymous = Session::anonymous(fx.state.clone());

        assert!(matches!(
            create_instructor(&user, &request()).await,
            Err(WorkshopError::AccessDenied)
        ));
        assert!(matches!(
            delete_instructor(&anonymous, "ins-1").await,
            Err(WorkshopError::AccessDenied)
        ));
        assert!(matches!(
            create_support_staff(&user, &SupportStaffRequest::default()).await,
            Err(WorkshopError::AccessDenied)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_instructor() {
        let fx = Fixture::new();
        let admin = fx.admin_session().await;
        let created = create_instructor(&admin, &request()).await.unwrap();

        let mut req = request();
        req.profile_image = Some("f1c2".to_string());
        req.expertise = vec!["Forensics".to_string(), "OSINT".to_string()];
        let updated = update_instructor(&admin, &created.id, &req).await.unwrap();
        assert_eq!(updated.expertise, vec!["Forensics", "OSINT"]);
        assert_eq!(
            updated.profile_image,
            Some(ImageRef::Stored {
                file_id: "f1c2".to_string()
            })
        );

        delete_instructor(&admin, &created.id).await.unwrap();
        assert!(list_instructors(&fx.state).await.unwrap().is_empty());
        assert!(matches!(
            delete_instructor(&admin, &created.id).await,
            Err(WorkshopError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_support_staff_crud() {
        let fx = Fixture::new();
        let admin = fx.admin_session().await;

        let err = create_support_staff(
            &admin,
            &SupportStaffRequest {
                name: "Mitu".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Role is required");

        let created = create_support_staff(
            &admin,
            &SupportStaffRequest {
                name: "Mitu".to_string(),
                role: "Volunteer coordinator".to_string(),
                contact: "01812345678".to_string(),
                profile_image: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(list_support_staff(&fx.state).await.unwrap().len(), 1);

        let updated = update_support_staff(
            &admin,
            &created.id,
            &SupportStaffRequest {
                name: "Mitu Akter".to_string(),
                role: "Volunteer coordinator".to_string(),
                contact: String::new(),
                profile_image: Some("https://img.example.com/mitu.jpg".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Mitu Akter");
        assert!(updated.profile_image.is_some());

        delete_support_staff(&admin, &created.id).await.unwrap();
        assert!(list_support_staff(&fx.state).await.unwrap().is_empty());
    }
}
