// src/tests/config_tests.rs

use std::time::Duration;

use crate::config::{parse_percent, Config, MailConfig};
use crate::tests::utils::dec;

fn mail(api_key: &str, sender: &str, recipient: &str) -> MailConfig {
    MailConfig {
        api_key: api_key.to_string(),
        sender_email: sender.to_string(),
        sender_name: "Price Tracker".to_string(),
        recipient: recipient.to_string(),
    }
}

#[test]
fn mail_config_needs_key_and_both_addresses() {
    assert!(mail("xkeysib-1", "alerts@example.com", "me@example.com").is_valid());

    assert!(!mail("", "alerts@example.com", "me@example.com").is_valid());
    assert!(!mail("xkeysib-1", "", "me@example.com").is_valid());
    assert!(!mail("xkeysib-1", "alerts@example.com", "not-an-address").is_valid());
    assert!(!mail("xkeysib-1", "@example.com", "me@example.com").is_valid());
}

#[test]
fn defaults_leave_email_unconfigured_and_gate_unset() {
    let c = Config::default();
    assert!(!c.mail.is_valid());
    assert_eq!(c.price_drop_threshold_percent, None);
    assert_eq!(c.cycle_interval, Duration::from_secs(3600));
    assert_eq!(c.default_check_interval_secs, 3600);
    assert_eq!(c.listen_addr.port(), 5000);
}

#[test]
fn invalid_drop_percent_falls_back_to_no_gate() {
    assert_eq!(parse_percent("10"), Some(dec("10")));
    assert_eq!(parse_percent(" 2.5 "), Some(dec("2.5")));
    assert_eq!(parse_percent("0"), Some(dec("0")));

    assert_eq!(parse_percent("ten"), None);
    assert_eq!(parse_percent("-5"), None);
}
