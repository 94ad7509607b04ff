//! Toll payments: the record store and the pages and endpoints for managing them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod tolls_page;

pub use core::{
    NewTollRecord, TollRecord, create_toll_record, create_toll_record_table,
    get_toll_records_in_month,
};
pub use create_endpoint::create_toll_record_endpoint;
pub use delete_endpoint::delete_toll_record_endpoint;
pub use edit_endpoint::edit_toll_record_endpoint;
pub use edit_page::get_edit_toll_page;
pub use tolls_page::get_tolls_page;
