pub mod history;
pub mod price;
pub mod product;
pub mod site;

pub use history::{NewNotification, NotificationEvent, PendingNotification, PriceObservation};
pub use price::{drop_percent, parse_price_text, DropPolicy};
pub use product::{NewProduct, Product};
pub use site::SiteKind;
