pub mod models;
#[allow(clippy::module_inception)]
mod scraper;
mod scraper_error;
pub mod sites;
pub mod strategies;

pub use models::ScrapeDiagnosis;
pub use self::scraper::{PriceSource, Scraper};
pub use scraper_error::ScraperError;
