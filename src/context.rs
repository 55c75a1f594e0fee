//! Process-scoped state shared by the CLI, the dashboard and the scheduler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::db::{init_db, Database};
use crate::domain::DropPolicy;
use crate::errors::AppError;
use crate::mailer::{BrevoMailer, DropNotifier, EmailNotifier};
use crate::scraper::{PriceSource, Scraper};

#[derive(Clone)]
pub struct AppContext {
    pub db: Database,
    pub scraper: Arc<dyn PriceSource>,
    pub notifier: Arc<dyn DropNotifier>,
    pub config: Arc<Config>,
    pub locks: ProductLocks,
}

impl AppContext {
    pub fn new(
        db: Database,
        scraper: Arc<dyn PriceSource>,
        notifier: Arc<dyn DropNotifier>,
        config: Config,
    ) -> Self {
        Self {
            db,
            scraper,
            notifier,
            config: Arc::new(config),
            locks: ProductLocks::default(),
        }
    }

    /// Opens the database, applies the schema and wires the real scraper and
    /// mailer.
    pub fn start(config: Config) -> Result<Self, AppError> {
        let db = Database::new(&config.database_path);
        init_db(&db)?;

        let scraper = Scraper::from_config(&config)
            .map_err(|e| AppError::Config(format!("scraper init failed: {e}")))?;

        let mailer = BrevoMailer::from_config(&config)
            .map_err(|e| AppError::Config(format!("mailer init failed: {e}")))?;
        let notifier = EmailNotifier::new(mailer, config.currency_symbol.clone());

        if !config.mail.is_valid() {
            tracing::warn!("email not configured; drop notifications will be recorded as unsent");
        }

        Ok(Self::new(db, Arc::new(scraper), Arc::new(notifier), config))
    }

    pub fn drop_policy(&self) -> DropPolicy {
        DropPolicy::new(self.config.price_drop_threshold_percent)
    }
}

/// One mutex per product id, so a manual check and a scheduled batch never
/// work on the same product at once. Different products do not contend.
#[derive(Clone, Default)]
pub struct ProductLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl ProductLocks {
    pub fn handle(&self, product_id: i64) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(map.entry(product_id).or_default())
    }
}

/// Blocks until the product's lock is free. A poisoned lock is taken over.
pub fn lock_product(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|p| p.into_inner())
}
