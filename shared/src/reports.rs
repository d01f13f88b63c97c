use crate::db;
use crate::error::WorkshopError;
use crate::registrations::event_details_access;
use crate::session::Session;
use crate::types::{ReviewStatus, UserProfile, WorkshopRegistration};
use crate::workshop::{reference_code, WORKSHOP_NAME, WORKSHOP_TIME};
use serde::Serialize;
use std::collections::HashMap;

const TOP_INSTITUTIONS: usize = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn tally(registrations: &[WorkshopRegistration]) -> Self {
        let mut counts = Self::default();
        for registration in registrations {
            match registration.payment_status {
                ReviewStatus::Pending => counts.pending += 1,
                ReviewStatus::Verified => counts.verified += 1,
                ReviewStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AdminStats {
    pub total_users: usize,
    pub total_registrations: usize,
    pub pending_payments: usize,
    pub verified_payments: usize,
    pub rejected_payments: usize,
}

#[derive(Debug, Serialize)]
pub struct PaymentReportRow {
    pub registration_id: String,
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub phone: String,
    pub institution: String,
    pub registration_date: String,
    pub payment_status: ReviewStatus,
    pub transaction_number: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentReport {
    pub generated_at: String,
    pub total_registrations: usize,
    pub counts: StatusCounts,
    pub rows: Vec<PaymentReportRow>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusShare {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct InstitutionCount {
    pub institution: String,
    pub registrations: usize,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: String,
    pub total_registrations: usize,
    pub verified: StatusShare,
    pub pending: StatusShare,
    pub rejected: StatusShare,
    pub top_institutions: Vec<InstitutionCount>,
}

/// What a verified participant downloads as their event pass.
#[derive(Debug, Serialize)]
pub struct EventDetails {
    pub event_name: &'static str,
    pub event_time: &'static str,
    pub participant_name: String,
    pub email: String,
    pub student_id: String,
    pub institution: String,
    pub reference_code: String,
    pub registration_id: String,
    pub transaction_id: Option<String>,
}

/// Share of `total` as a percentage with one decimal; 0.0 when `total` is zero.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn users_by_id(users: Vec<UserProfile>) -> HashMap<String, UserProfile> {
    users.into_iter().map(|u| (u.id.clone(), u)).collect()
}

pub async fn admin_stats(session: &Session) -> Result<AdminStats, WorkshopError> {
    session.require_admin()?;
    let state = session.state();

    let users = db::list_users(state).await?;
    let registrations = db::list_registrations(state).await?;
    let counts = StatusCounts::tally(&registrations);

    Ok(AdminStats {
        total_users: users.len(),
        total_registrations: registrations.len(),
        pending_payments: counts.pending,
        verified_payments: counts.verified,
        rejected_payments: counts.rejected,
    })
}

pub async fn payment_report(session: &Session) -> Result<PaymentReport, WorkshopError> {
    session.require_admin()?;
    let state = session.state();

    let users = users_by_id(db::list_users(state).await?);
    let registrations = db::list_registrations(state).await?;
    let counts = StatusCounts::tally(&registrations);

    let not_available = || "N/A".to_string();
    let rows = registrations
        .iter()
        .map(|registration| {
            let user = users.get(&registration.user_id);
            PaymentReportRow {
                registration_id: registration.id.clone(),
                name: user
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown User".to_string()),
                student_id: user.map(|u| u.student_id.clone()).unwrap_or_else(not_available),
                email: user.map(|u| u.email.clone()).unwrap_or_else(not_available),
                phone: user.map(|u| u.phone.clone()).unwrap_or_else(not_available),
                institution: user.map(|u| u.institution.clone()).unwrap_or_else(not_available),
                registration_date: registration.registration_date.clone(),
                payment_status: registration.payment_status,
                transaction_number: registration
                    .payment_transaction_number
                    .clone()
                    .unwrap_or_else(not_available),
            }
        })
        .collect();

    Ok(PaymentReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_registrations: registrations.len(),
        counts,
        rows,
    })
}

pub async fn summary_report(session: &Session) -> Result<SummaryReport, WorkshopError> {
    session.require_admin()?;
    let state = session.state();

    let users = users_by_id(db::list_users(state).await?);
    let registrations = db::list_registrations(state).await?;
    let total = registrations.len();
    let counts = StatusCounts::tally(&registrations);

    let mut institutions: HashMap<String, usize> = HashMap::new();
    for registration in &registrations {
        let institution = users
            .get(&registration.user_id)
            .map(|u| u.institution.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        *institutions.entry(institution).or_default() += 1;
    }

    let mut top: Vec<(String, usize)> = institutions.into_iter().collect();
    top.sort_by(|(a_name, a_count), (b_name, b_count)| {
        b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
    });
    top.truncate(TOP_INSTITUTIONS);

    let share = |count| StatusShare {
        count,
        percentage: percentage(count, total),
    };

    Ok(SummaryReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_registrations: total,
        verified: share(counts.verified),
        pending: share(counts.pending),
        rejected: share(counts.rejected),
        top_institutions: top
            .into_iter()
            .map(|(institution, registrations)| InstitutionCount {
                institution,
                registrations,
                percentage: percentage(registrations, total),
            })
            .collect(),
    })
}

/// Event details for the caller; refused until their payment is verified.
pub async fn event_details(session: &Session) -> Result<EventDetails, WorkshopError> {
    let registration = event_details_access(session).await?;
    let user = session.require_user()?;

    Ok(EventDetails {
        event_name: WORKSHOP_NAME,
        event_time: WORKSHOP_TIME,
        participant_name: user.name.clone(),
        email: user.email.clone(),
        student_id: user.student_id.clone(),
        institution: user.institution.clone(),
        reference_code: reference_code(&user.student_id),
        registration_id: registration.id,
        transaction_id: registration.payment_transaction_id,
    })
}
