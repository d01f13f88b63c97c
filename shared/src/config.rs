use chrono::NaiveDate;
use std::env;

/// Collection (table) names, one per entity type.
#[derive(Debug, Clone)]
pub struct Collections {
    pub users: String,
    pub workshop_registrations: String,
    /// Secondary index on `workshop_registrations` keyed by `user_id`.
    pub registrations_by_user: String,
    pub instructors: String,
    pub support_staff: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Overrides the AWS endpoint, e.g. a local emulator.
    pub endpoint_url: Option<String>,
    pub cognito_client_id: String,
    pub cognito_client_secret: String,
    /// When set, new accounts are confirmed right after sign-up.
    pub cognito_user_pool_id: Option<String>,
    pub storage_bucket: String,
    pub collections: Collections,
    /// Public base URL of this API, used to build file view/preview links.
    pub api_base_url: String,
    pub payment_number: String,
    pub registration_opens: NaiveDate,
    pub registration_closes: NaiveDate,
}

const DEFAULT_REGISTRATION_OPENS: &str = "2025-09-06";
const DEFAULT_REGISTRATION_CLOSES: &str = "2025-09-12";
const DEFAULT_REGISTRATIONS_USER_INDEX: &str = "user_id-index";

impl Config {
    /// Read configuration from the environment, falling back to local-development defaults.
    pub fn from_env() -> Self {
        let cognito_client_id = env::var("COGNITO_CLIENT_ID").unwrap_or_default();
        let cognito_client_secret = env::var("COGNITO_CLIENT_SECRET").unwrap_or_default();
        if cognito_client_id.is_empty() || cognito_client_secret.is_empty() {
            tracing::warn!("COGNITO_CLIENT_ID / COGNITO_CLIENT_SECRET not set; logins will fail");
        }

        Self {
            endpoint_url: env::var("BACKEND_ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            cognito_client_id,
            cognito_client_secret,
            cognito_user_pool_id: env::var("COGNITO_USER_POOL_ID").ok().filter(|s| !s.is_empty()),
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "workshop-storage".to_string()),
            collections: Collections {
                users: env::var("USERS_TABLE").unwrap_or_else(|_| "users".to_string()),
                workshop_registrations: env::var("WORKSHOP_REGISTRATIONS_TABLE")
                    .unwrap_or_else(|_| "workshop_registrations".to_string()),
                registrations_by_user: env::var("REGISTRATIONS_USER_INDEX")
                    .unwrap_or_else(|_| DEFAULT_REGISTRATIONS_USER_INDEX.to_string()),
                instructors: env::var("INSTRUCTORS_TABLE")
                    .unwrap_or_else(|_| "instructors".to_string()),
                support_staff: env::var("SUPPORT_STAFF_TABLE")
                    .unwrap_or_else(|_| "support_staff".to_string()),
            },
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string())
                .trim_end_matches('/')
                .to_string(),
            payment_number: env::var("PAYMENT_NUMBER")
                .unwrap_or_else(|_| "01784275877".to_string()),
            registration_opens: date_var("REGISTRATION_OPENS", DEFAULT_REGISTRATION_OPENS),
            registration_closes: date_var("REGISTRATION_CLOSES", DEFAULT_REGISTRATION_CLOSES),
        }
    }

    /// Defaults only, no environment lookups.
    pub fn local() -> Self {
        Self {
            endpoint_url: None,
            cognito_client_id: String::new(),
            cognito_client_secret: String::new(),
            cognito_user_pool_id: None,
            storage_bucket: "workshop-storage".to_string(),
            collections: Collections {
                users: "users".to_string(),
                workshop_registrations: "workshop_registrations".to_string(),
                registrations_by_user: DEFAULT_REGISTRATIONS_USER_INDEX.to_string(),
                instructors: "instructors".to_string(),
                support_staff: "support_staff".to_string(),
            },
            api_base_url: "http://localhost:9000".to_string(),
            payment_number: "01784275877".to_string(),
            registration_opens: parse_date(DEFAULT_REGISTRATION_OPENS),
            registration_closes: parse_date(DEFAULT_REGISTRATION_CLOSES),
        }
    }
}

fn date_var(name: &str, default: &str) -> NaiveDate {
    match env::var(name) {
        Ok(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}={:?}: {}", name, raw, e);
            parse_date(default)
        }),
        Err(_) => parse_date(default),
    }
}

fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_defaults() {
        let config = Config::local();
        assert_eq!(config.collections.workshop_registrations, "workshop_registrations");
        assert_eq!(config.collections.registrations_by_user, "user_id-index");
        assert_eq!(config.registration_opens, NaiveDate::from_ymd_opt(2025, 9, 6).unwrap());
        assert_eq!(config.registration_closes, NaiveDate::from_ymd_opt(2025, 9, 12).unwrap());
    }
}
