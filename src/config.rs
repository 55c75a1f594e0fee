//! Runtime configuration read from the environment (and an optional `.env`).

use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub listen_addr: SocketAddr,

    /// Budget for one product's scrape, shared by every strategy.
    pub request_timeout: Duration,
    pub user_agent: String,

    /// Stored per product; informational only, the scheduler cadence wins.
    pub default_check_interval_secs: i64,
    pub cycle_interval: Duration,
    pub product_delay: Duration,

    /// Optional global gate on top of the per-product threshold.
    pub price_drop_threshold_percent: Option<Decimal>,

    pub currency_symbol: String,
    pub log_level: String,

    pub mail: MailConfig,
    pub render_api_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
    pub recipient: String,
}

impl MailConfig {
    /// All fields present and both addresses look like addresses.
    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
            && looks_like_email(&self.sender_email)
            && looks_like_email(&self.recipient)
    }
}

fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.contains('@') && !s.starts_with('@') && !s.ends_with('@')
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "price_tracker.db".to_string(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_check_interval_secs: 3600,
            cycle_interval: Duration::from_secs(3600),
            product_delay: Duration::from_millis(2000),
            price_drop_threshold_percent: None,
            currency_symbol: "₹".to_string(),
            log_level: "info".to_string(),
            mail: MailConfig {
                sender_name: "Price Tracker".to_string(),
                ..MailConfig::default()
            },
            render_api_key: None,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads each key falling back to the
    /// default when it is missing or does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let host = std::env::var("DASHBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = parse_env("DASHBOARD_PORT", defaults.listen_addr.port());
        let host = if host == "localhost" { "127.0.0.1".to_string() } else { host };
        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid DASHBOARD_HOST/PORT: {e}")))?;

        let price_drop_threshold_percent =
            non_empty_var("PRICE_DROP_THRESHOLD_PERCENT").and_then(|raw| parse_percent(&raw));

        Ok(Self {
            database_path: non_empty_var("DATABASE_PATH").unwrap_or(defaults.database_path),
            listen_addr,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT", 30)),
            user_agent: non_empty_var("USER_AGENT").unwrap_or(defaults.user_agent),
            default_check_interval_secs: parse_env(
                "DEFAULT_CHECK_INTERVAL",
                defaults.default_check_interval_secs,
            ),
            cycle_interval: Duration::from_secs(parse_env("CHECK_CYCLE_INTERVAL", 3600)),
            product_delay: Duration::from_millis(parse_env("PRODUCT_DELAY_MS", 2000)),
            price_drop_threshold_percent,
            currency_symbol: non_empty_var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            log_level: non_empty_var("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
            mail: MailConfig {
                api_key: non_empty_var("BREVO_API_KEY").unwrap_or_default(),
                sender_email: non_empty_var("EMAIL_SENDER").unwrap_or_default(),
                sender_name: non_empty_var("EMAIL_SENDER_NAME")
                    .unwrap_or(defaults.mail.sender_name),
                recipient: non_empty_var("EMAIL_RECIPIENT").unwrap_or_default(),
            },
            render_api_key: non_empty_var("ZENROWS_API_KEY"),
        })
    }
}

/// A non-negative percentage. Anything else disables the gate.
pub(crate) fn parse_percent(raw: &str) -> Option<Decimal> {
    match Decimal::from_str(raw.trim()) {
        Ok(pct) if !pct.is_sign_negative() => Some(pct),
        _ => {
            tracing::warn!(value = raw, "ignoring invalid PRICE_DROP_THRESHOLD_PERCENT");
            None
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
