use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::ExpenseError;

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GMAIL_LABEL: &str = "Label_2311038950946628504";
const DEFAULT_MAX_RESULTS: u32 = 10;
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gmail_label_id: String,
    pub gmail_max_results: u32,
    pub credentials_file: PathBuf,
    pub ledger_file: PathBuf,
    pub event_topic_url: Option<String>,
    pub call_timeout: Duration
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ExpenseError> {
        Ok(Self {
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gmail_label_id: env::var("GMAIL_LABEL_ID").unwrap_or_else(|_| DEFAULT_GMAIL_LABEL.to_string()),
            gmail_max_results: parse_var("GMAIL_MAX_RESULTS", DEFAULT_MAX_RESULTS)?,
            credentials_file: env::var("GOOGLE_CREDENTIALS_FILE")
                .unwrap_or_else(|_| "credentials.json".to_string())
                .into(),
            ledger_file: env::var("LEDGER_FILE")
                .unwrap_or_else(|_| "ledger.json".to_string())
                .into(),
            event_topic_url: env::var("EVENT_TOPIC_URL").ok(),
            call_timeout: Duration::from_secs(parse_var("SYNC_CALL_TIMEOUT_SECS", DEFAULT_CALL_TIMEOUT_SECS)?)
        })
    }
}

fn require(key: &str) -> Result<String, ExpenseError> {
    env::var(key).map_err(|_| ExpenseError::validation(format!("missing required environment variable {key}")))
}

fn parse_var<T>(key: &str, default: T) -> Result<T, ExpenseError>
where
    T: FromStr,
    T::Err: Display
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|error| ExpenseError::validation(format!("invalid value for {key}: {error}"))),
        Err(_) => Ok(default)
    }
}
