pub mod check;
pub mod cycle;
pub mod dashboard;
pub mod diagnostics;
pub mod product;

pub use check::check_result_page;
pub use cycle::cycle_result_page;
pub use dashboard::{dashboard_page, DashboardVm};
pub use diagnostics::{diagnostics_page, DiagnosticsVm};
pub use product::{product_page, ProductVm};
