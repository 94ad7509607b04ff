//! The monthly budget and the memo, stored as per-user settings.

mod core;
mod handlers;

pub use core::{create_setting_table, get_budget, get_memo, set_budget, set_memo};
pub use handlers::{put_budget_endpoint, put_memo_endpoint};
