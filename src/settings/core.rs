//! Per-user key/value settings, scoped to a month or shared by every month.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, auth::UserID, period::YearMonth};

/// The scope for settings that apply to every month.
const ALL_MONTHS: &str = "";

/// The names of the stored settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// The monthly budget in won, scoped to one month.
    Budget,
    /// A free-text note shared by every month.
    Memo,
}

impl SettingKey {
    fn as_str(self) -> &'static str {
        match self {
            SettingKey::Budget => "budget",
            SettingKey::Memo => "memo",
        }
    }
}

/// Create the setting table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_setting_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS setting (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            key TEXT NOT NULL,
            period TEXT NOT NULL DEFAULT '',
            value TEXT NOT NULL,
            UNIQUE(user_id, key, period)
        )",
        (),
    )?;

    Ok(())
}

/// Insert the setting, or replace its value if it already exists for this
/// user, key and period.
fn upsert_setting(
    user_id: UserID,
    key: SettingKey,
    period: &str,
    value: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO setting (user_id, key, period, value) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, key, period) DO UPDATE SET value = excluded.value",
        (user_id.as_i64(), key.as_str(), period, value),
    )?;

    Ok(())
}

fn get_setting(
    user_id: UserID,
    key: SettingKey,
    period: &str,
    connection: &Connection,
) -> Result<Option<String>, Error> {
    connection
        .prepare("SELECT value FROM setting WHERE user_id = ?1 AND key = ?2 AND period = ?3")?
        .query_row((user_id.as_i64(), key.as_str(), period), |row| row.get(0))
        .optional()
        .map_err(Error::from)
}

/// Set the budget of `user_id` for `month`.
///
/// # Errors
/// Returns [Error::InvalidBudget] if `budget` is negative.
pub fn set_budget(
    user_id: UserID,
    month: YearMonth,
    budget: i64,
    connection: &Connection,
) -> Result<(), Error> {
    if budget < 0 {
        return Err(Error::InvalidBudget(budget));
    }

    upsert_setting(
        user_id,
        SettingKey::Budget,
        &month.to_string(),
        &budget.to_string(),
        connection,
    )
}

/// Get the budget of `user_id` for `month`, `None` if it was never set.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or the stored value is not a number.
pub fn get_budget(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<Option<i64>, Error> {
    get_setting(user_id, SettingKey::Budget, &month.to_string(), connection)?
        .map(|value| {
            value.parse::<i64>().map_err(|error| {
                Error::SqlError(rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                ))
            })
        })
        .transpose()
}

/// Replace the memo of `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the upsert fails.
pub fn set_memo(user_id: UserID, memo: &str, connection: &Connection) -> Result<(), Error> {
    upsert_setting(user_id, SettingKey::Memo, ALL_MONTHS, memo, connection)
}

/// Get the memo of `user_id`, empty if it was never set.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_memo(user_id: UserID, connection: &Connection) -> Result<String, Error> {
    Ok(get_setting(user_id, SettingKey::Memo, ALL_MONTHS, connection)?.unwrap_or_default())
}
