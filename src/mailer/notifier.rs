// src/mailer/notifier.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::mailer::templates;
use crate::mailer::{BrevoMailer, MailerError};

/// The fields a drop email shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DropAlert<'a> {
    pub product_name: &'a str,
    pub url: &'a str,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub threshold_price: Decimal,
}

/// Diagnostic breakdown for the email self-test. The cycle never looks at
/// this; it only sees the boolean from `send_drop_alert`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmailSelfTest {
    pub config_valid: bool,
    pub connection_ok: bool,
    pub auth_ok: bool,
    pub test_sent: bool,
    pub error: Option<String>,
}

pub trait DropNotifier: Send + Sync {
    /// `true` when the transport accepted the message.
    fn send_drop_alert(&self, alert: &DropAlert<'_>) -> bool;

    /// One message covering several drops.
    fn send_summary(&self, alerts: &[DropAlert<'_>]) -> bool;

    fn self_test(&self) -> EmailSelfTest;
}

pub struct EmailNotifier {
    mailer: BrevoMailer,
    currency: String,
}

impl EmailNotifier {
    pub fn new(mailer: BrevoMailer, currency: impl Into<String>) -> Self {
        Self {
            mailer,
            currency: currency.into(),
        }
    }

    fn deliver(&self, content: templates::EmailContent) -> Result<(), MailerError> {
        self.mailer
            .send(&content.subject, &content.html, &content.text)
    }
}

impl DropNotifier for EmailNotifier {
    fn send_drop_alert(&self, alert: &DropAlert<'_>) -> bool {
        match self.deliver(templates::drop_alert(alert, &self.currency, Utc::now())) {
            Ok(()) => {
                tracing::info!(product = alert.product_name, "drop alert sent");
                true
            }
            Err(e) => {
                tracing::error!(product = alert.product_name, error = %e, "drop alert failed");
                false
            }
        }
    }

    fn send_summary(&self, alerts: &[DropAlert<'_>]) -> bool {
        if alerts.is_empty() {
            return true;
        }
        match self.deliver(templates::summary(alerts, &self.currency, Utc::now())) {
            Ok(()) => {
                tracing::info!(count = alerts.len(), "summary email sent");
                true
            }
            Err(e) => {
                tracing::error!(count = alerts.len(), error = %e, "summary email failed");
                false
            }
        }
    }

    fn self_test(&self) -> EmailSelfTest {
        let mut result = EmailSelfTest::default();

        if !self.mailer.config().is_valid() {
            result.error = Some("Invalid email configuration".into());
            return result;
        }
        result.config_valid = true;

        match self.mailer.check_account() {
            Ok(()) => {
                result.connection_ok = true;
                result.auth_ok = true;
            }
            Err(MailerError::Auth(msg)) => {
                result.connection_ok = true;
                result.error = Some(format!("Authentication failed: {msg}"));
                return result;
            }
            Err(e) => {
                result.error = Some(e.to_string());
                return result;
            }
        }

        match self.deliver(templates::self_test(Utc::now())) {
            Ok(()) => result.test_sent = true,
            Err(e) => result.error = Some(e.to_string()),
        }

        tracing::info!(?result, "email self-test finished");
        result
    }
}
