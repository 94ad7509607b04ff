//! Dashboard module
//!
//! Shows one month at a time: fuel and toll spending, average fuel
//! efficiency, budget usage and the memo.

mod aggregation;
mod cards;
mod handlers;

pub use aggregation::{AverageEfficiency, MonthlySummary, aggregate};
pub use handlers::get_dashboard_page;
