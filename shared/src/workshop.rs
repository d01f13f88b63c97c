use crate::config::Config;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

pub const WORKSHOP_TYPE: &str = "complete";
pub const WORKSHOP_NAME: &str = "Cybersecurity Workshop";
pub const WORKSHOP_TIME: &str = "9:00 AM - 4:00 PM";
pub const REGISTRATION_FEE: &str = "100 TK";
pub const PAYMENT_CHANNELS: [&str; 2] = ["bKash", "Nagad"];

/// Reference the user puts on their mobile payment.
pub fn reference_code(student_id: &str) -> String {
    format!("NCC-{}", student_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

/// Advisory registration window. Nothing refuses a registration outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationWindow {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl RegistrationWindow {
    /// Opens at the start of `opens`, closes at the last millisecond of `closes`.
    pub fn new(opens: NaiveDate, closes: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            opens_at: opens.and_time(NaiveTime::MIN).and_utc(),
            closes_at: closes.and_time(end_of_day).and_utc(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registration_opens, config.registration_closes)
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.opens_at && now <= self.closes_at
    }

    /// Time left until the window closes; `None` once it has closed.
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        let remaining = self.closes_at - now;
        if remaining <= Duration::zero() {
            return None;
        }
        Some(Countdown {
            days: remaining.num_days(),
            hours: remaining.num_hours() % 24,
            minutes: remaining.num_minutes() % 60,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentInstructions {
    pub fee: String,
    pub channels: Vec<String>,
    pub payment_number: String,
    pub reference_code: String,
}

impl PaymentInstructions {
    pub fn new(config: &Config, student_id: &str) -> Self {
        Self {
            fee: REGISTRATION_FEE.to_string(),
            channels: PAYMENT_CHANNELS.iter().map(|c| c.to_string()).collect(),
            payment_number: config.payment_number.clone(),
            reference_code: reference_code(student_id),
        }
    }
}

/// Public workshop summary served to anonymous visitors.
#[derive(Debug, Serialize)]
pub struct WorkshopInfo {
    pub name: &'static str,
    pub time: &'static str,
    pub fee: &'static str,
    pub payment_channels: [&'static str; 2],
    pub payment_number: String,
    pub registration_opens_at: DateTime<Utc>,
    pub registration_closes_at: DateTime<Utc>,
    pub registration_open: bool,
    pub countdown: Option<Countdown>,
}

pub fn workshop_info(config: &Config, now: DateTime<Utc>) -> WorkshopInfo {
    let window = RegistrationWindow::from_config(config);
    WorkshopInfo {
        name: WORKSHOP_NAME,
        time: WORKSHOP_TIME,
        fee: REGISTRATION_FEE,
        payment_channels: PAYMENT_CHANNELS,
        payment_number: config.payment_number.clone(),
        registration_opens_at: window.opens_at,
        registration_closes_at: window.closes_at,
        registration_open: window.is_open(now),
        countdown: window.countdown(now),
    }
}
