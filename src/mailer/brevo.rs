// src/mailer/brevo.rs

use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::{Config, MailConfig};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MailerError {
    #[error("Mail configuration invalid: {0}")]
    Config(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("API error: {0}")]
    Api(String),
}

const DEFAULT_API_BASE: &str = "https://api.brevo.com/v3";

/// Transactional email over Brevo's HTTP API.
pub struct BrevoMailer {
    config: MailConfig,
    api_base: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoContact<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoContact<'a>,
    to: Vec<BrevoContact<'a>>,
    subject: &'a str,
    html_content: &'a str,
    text_content: &'a str,
}

impl BrevoMailer {
    pub fn new(config: MailConfig, timeout: Duration) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailerError::Connection(e.to_string()))?;

        Ok(Self {
            config,
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        })
    }

    /// Mail settings and the global request timeout from the app config.
    pub fn from_config(config: &Config) -> Result<Self, MailerError> {
        Self::new(config.mail.clone(), config.request_timeout)
    }

    /// Points the client at another API root.
    #[cfg(test)]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    fn ensure_config(&self) -> Result<(), MailerError> {
        if self.config.is_valid() {
            Ok(())
        } else {
            Err(MailerError::Config(
                "BREVO_API_KEY, EMAIL_SENDER and EMAIL_RECIPIENT must be set".into(),
            ))
        }
    }

    /// Verifies reachability and the API key without sending anything.
    pub fn check_account(&self) -> Result<(), MailerError> {
        self.ensure_config()?;

        let resp = self
            .client
            .get(format!("{}/account", self.api_base))
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| MailerError::Connection(e.to_string()))?;

        classify_status(resp)
    }

    /// Sends one message to the configured recipient.
    pub fn send(&self, subject: &str, html: &str, text: &str) -> Result<(), MailerError> {
        self.ensure_config()?;

        let payload = BrevoPayload {
            sender: BrevoContact {
                name: Some(&self.config.sender_name),
                email: &self.config.sender_email,
            },
            to: vec![BrevoContact {
                name: None,
                email: &self.config.recipient,
            }],
            subject,
            html_content: html,
            text_content: text,
        };

        let resp = self
            .client
            .post(format!("{}/smtp/email", self.api_base))
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::Connection(e.to_string()))?;

        classify_status(resp)
    }
}

fn classify_status(resp: reqwest::blocking::Response) -> Result<(), MailerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }

    let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
    match status.as_u16() {
        401 | 403 => Err(MailerError::Auth(format!("{status}: {body}"))),
        _ => Err(MailerError::Api(format!("{status}: {body}"))),
    }
}
