//! The toll record model and its queries.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{Error, auth::UserID, database_id::TollRecordId, period::YearMonth};

/// A toll paid on a road section.
#[derive(Debug, Clone, PartialEq)]
pub struct TollRecord {
    /// The ID of the record.
    pub id: TollRecordId,
    /// The user that owns the record.
    pub user_id: UserID,
    /// The day the toll was paid.
    pub date: Date,
    /// The road section, e.g. "Seoul → Daejeon".
    pub section: Option<String>,
    /// The amount paid in won.
    pub amount: i64,
}

/// The values of a toll record before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTollRecord {
    pub date: Date,
    pub section: Option<String>,
    pub amount: i64,
}

/// Create the toll record table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_toll_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS toll_record (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            section TEXT,
            amount INTEGER NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_toll_record_user_date ON toll_record(user_id, date)",
        (),
    )?;

    Ok(())
}

pub fn map_toll_record_row(row: &Row) -> Result<TollRecord, rusqlite::Error> {
    Ok(TollRecord {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        date: row.get(2)?,
        section: row.get(3)?,
        amount: row.get(4)?,
    })
}

/// Insert a toll record owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails.
pub fn create_toll_record(
    user_id: UserID,
    record: &NewTollRecord,
    connection: &Connection,
) -> Result<TollRecord, Error> {
    let record = connection
        .prepare(
            "INSERT INTO toll_record (user_id, date, section, amount)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, date, section, amount",
        )?
        .query_row(
            (user_id.as_i64(), record.date, &record.section, record.amount),
            map_toll_record_row,
        )?;

    Ok(record)
}

/// Get the toll record `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such record for this user.
pub fn get_toll_record(
    id: TollRecordId,
    user_id: UserID,
    connection: &Connection,
) -> Result<TollRecord, Error> {
    let record = connection
        .prepare(
            "SELECT id, user_id, date, section, amount FROM toll_record
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_toll_record_row,
        )?;

    Ok(record)
}

/// Get the toll records of `user_id` dated within `month`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_toll_records_in_month(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<TollRecord>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, date, section, amount FROM toll_record
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            (user_id.as_i64(), month.first_day(), month.last_day()),
            map_toll_record_row,
        )?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        period::YearMonth,
        test_utils::{OTHER_USER, TEST_USER, must_create_test_connection},
    };

    use super::{
        NewTollRecord, TollRecord, create_toll_record, get_toll_record, get_toll_records_in_month,
    };

    fn new_toll(date: time::Date, amount: i64) -> NewTollRecord {
        NewTollRecord {
            date,
            section: Some("Seoul → Busan".to_owned()),
            amount,
        }
    }

    #[test]
    fn create_and_get_toll() {
        let connection = must_create_test_connection();

        let record =
            create_toll_record(TEST_USER, &new_toll(date!(2025 - 03 - 02), 23_400), &connection)
                .unwrap();

        assert_eq!(
            record,
            TollRecord {
                id: 1,
                user_id: TEST_USER,
                date: date!(2025 - 03 - 02),
                section: Some("Seoul → Busan".to_owned()),
                amount: 23_400,
            }
        );
        assert_eq!(get_toll_record(record.id, TEST_USER, &connection), Ok(record));
    }

    #[test]
    fn get_hides_other_users_records() {
        let connection = must_create_test_connection();
        let record =
            create_toll_record(TEST_USER, &new_toll(date!(2025 - 03 - 02), 1_000), &connection)
                .unwrap();

        assert_eq!(
            get_toll_record(record.id, OTHER_USER, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn month_query_filters_by_date_and_owner() {
        let connection = must_create_test_connection();
        for (user_id, date) in [
            (TEST_USER, date!(2025 - 02 - 28)),
            (TEST_USER, date!(2025 - 03 - 01)),
            (TEST_USER, date!(2025 - 03 - 31)),
            (TEST_USER, date!(2025 - 04 - 01)),
            (OTHER_USER, date!(2025 - 03 - 15)),
        ] {
            create_toll_record(user_id, &new_toll(date, 1_000), &connection).unwrap();
        }

        let month = "2025-03".parse::<YearMonth>().unwrap();
        let got = get_toll_records_in_month(TEST_USER, month, &connection).unwrap();

        let dates = got.iter().map(|record| record.date).collect::<Vec<_>>();
        assert_eq!(dates, [date!(2025 - 03 - 31), date!(2025 - 03 - 01)]);
    }
}
