use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::ExpenseError;

/// OAuth credential material for the mail provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCredentials {
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>
}

impl GoogleCredentials {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.map(|expiry| now >= expiry).unwrap_or(false)
    }

    /// Refreshes the access token when expired and returns the refreshed
    /// credentials for the caller to persist.
    ///
    /// A missing refresh token or a rejected refresh maps to
    /// `Unauthorized`: the account must be re-linked, not retried.
    pub async fn ensure_fresh(mut self, http: &Client, now: DateTime<Utc>) -> Result<Self, ExpenseError> {
        if !self.is_expired(now) {
            return Ok(self);
        }

        let Some(refresh_token) = self.refresh_token.clone() else {
            return Err(ExpenseError::unauthorized(
                "credentials expired and no refresh token is available"
            ));
        };

        let response = http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str())
            ])
            .send()
            .await
            .map_err(|error| ExpenseError::unauthorized(format!("token refresh failed: {error}")))?;

        if !response.status().is_success() {
            return Err(ExpenseError::unauthorized(format!(
                "token refresh rejected with status {}; the account must be re-linked",
                response.status()
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|error| ExpenseError::unauthorized(format!("token refresh returned a malformed body: {error}")))?;

        self.token = refreshed.access_token;
        self.expiry = refreshed.expires_in.map(|seconds| now + Duration::seconds(seconds));

        Ok(self)
    }
}
