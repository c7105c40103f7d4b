//! Native form submission over HTTP.
//!
//! The form is posted as `application/x-www-form-urlencoded` without
//! following redirects, so the server's answer can be read from the status
//! and `Location` header the way a browser would land on it.

use std::time::Duration;

use portal_core::Submission;
use reqwest::header::LOCATION;
use reqwest::{redirect, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors building the client.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

/// How the server answered a login post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Login accepted.
    Accepted,
    /// Login rejected, with the server's message if it sent one.
    Rejected(Option<String>),
    /// The request never got an answer.
    Unreachable,
}

/// Maps a status and `Location` header to an outcome.
///
/// A redirect carrying an `error` query parameter is a rejection. Any other
/// redirect or a success status is an acceptance. Remaining statuses are
/// rejections without a message.
pub fn classify_response(
    endpoint: &Url,
    status: StatusCode,
    location: Option<&str>,
) -> LoginOutcome {
    if status.is_redirection() {
        let error = location
            .and_then(|loc| endpoint.join(loc).ok())
            .and_then(|target| {
                target
                    .query_pairs()
                    .find(|(key, _)| key == "error")
                    .map(|(_, value)| value.into_owned())
            });

        return match error {
            Some(message) => rejection(message),
            None => LoginOutcome::Accepted,
        };
    }

    if status.is_success() {
        return LoginOutcome::Accepted;
    }

    LoginOutcome::Rejected(None)
}

fn rejection(message: String) -> LoginOutcome {
    if message.trim().is_empty() {
        LoginOutcome::Rejected(None)
    } else {
        LoginOutcome::Rejected(Some(message))
    }
}

/// Posts submissions to the login endpoint.
#[derive(Debug, Clone)]
pub struct LoginClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl LoginClient {
    /// Creates a client for `endpoint`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SubmitError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SubmitError::Endpoint(format!("{}: {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(format!("Portal/{}", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts one submission and classifies the answer.
    pub async fn post(&self, submission: &Submission) -> LoginOutcome {
        debug!(endpoint = %self.endpoint, "Posting login form");

        let response = match self
            .client
            .post(self.endpoint.clone())
            .form(&submission.form_fields())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Login request failed: {}", e);
                return LoginOutcome::Unreachable;
            }
        };

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok());

        let outcome = classify_response(&self.endpoint, status, location);
        debug!(%status, ?outcome, "Login response");
        outcome
    }
}
