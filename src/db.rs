//! Creates the application's tables.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    auth::create_user_table, fuel::create_fuel_record_table, settings::create_setting_table,
    toll::create_toll_record_table,
};

/// Create every table the application needs, if it does not exist yet.
///
/// # Errors
/// Returns an error if any of the tables could not be created, in which case none are.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_fuel_record_table(&transaction)?;
    create_toll_record_table(&transaction)?;
    create_setting_table(&transaction)?;

    transaction.commit()
}
