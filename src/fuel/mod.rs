//! Fuel purchases: the record store, the linked price/volume/cost fields and
//! the pages and endpoints for entering and editing fill-ups.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod fuel_page;
mod reconcile;
mod reconcile_endpoint;

pub use core::{
    FuelRecord, NewFuelRecord, create_fuel_record, create_fuel_record_table, get_fuel_record,
    get_fuel_records_in_month,
};
pub use create_endpoint::create_fuel_record_endpoint;
pub use delete_endpoint::delete_fuel_record_endpoint;
pub use edit_endpoint::edit_fuel_record_endpoint;
pub use edit_page::get_edit_fuel_page;
pub use fuel_page::get_fuel_page;
pub use reconcile::{
    Edit, LinkedFields, ResolvedAmounts, SubmissionPolicy, reconcile, resolve_submission,
};
pub use reconcile_endpoint::reconcile_fuel_endpoint;

pub(crate) use fuel_page::default_entry_date;

#[cfg(test)]
pub(crate) use core::test_utils::new_fuel_record;
