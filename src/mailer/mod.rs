mod brevo;
mod notifier;
pub mod templates;

pub use brevo::{BrevoMailer, MailerError};
pub use notifier::{DropAlert, DropNotifier, EmailNotifier, EmailSelfTest};
