//! The fuel record model and the queries shared by the fuel pages and endpoints.

use rusqlite::{Connection, Row};
use time::{Date, Time};

use crate::{
    Error, auth::UserID, database_id::FuelRecordId, fuel::reconcile::ResolvedAmounts,
    period::YearMonth,
};

// ============================================================================
// MODELS
// ============================================================================

/// A fill-up at a fuel station.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelRecord {
    /// The ID of the record.
    pub id: FuelRecordId,
    /// The user that owns the record.
    pub user_id: UserID,
    /// The day of the fill-up.
    pub date: Date,
    /// The time of day of the fill-up, to the minute.
    ///
    /// Used to order several fill-ups on the same day.
    pub time: Option<Time>,
    /// Where the station is, e.g. "Seoul".
    pub region: Option<String>,
    /// The name of the station.
    pub station: Option<String>,
    /// The price per litre in won.
    pub unit_price: i64,
    /// The litres pumped.
    pub volume: f64,
    /// Kilometres driven since the previous fill-up, zero if not tracked.
    pub distance: i64,
    /// The amount paid in won, `round(unit_price * volume)`.
    pub total_cost: i64,
}

impl FuelRecord {
    /// Kilometres per litre for this fill-up alone.
    ///
    /// Returns `None` unless both the distance and the volume are positive.
    pub fn efficiency(&self) -> Option<f64> {
        (self.distance > 0 && self.volume > 0.0).then(|| self.distance as f64 / self.volume)
    }
}

/// The values of a fuel record before it is written, used for both inserts
/// and full-row updates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFuelRecord {
    pub date: Date,
    pub time: Option<Time>,
    pub region: Option<String>,
    pub station: Option<String>,
    pub amounts: ResolvedAmounts,
    pub distance: i64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the fuel record table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_fuel_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS fuel_record (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            time TEXT,
            region TEXT,
            station TEXT,
            unit_price INTEGER NOT NULL,
            volume REAL NOT NULL,
            distance INTEGER NOT NULL DEFAULT 0,
            total_cost INTEGER NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_fuel_record_user_date ON fuel_record(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Map a row selected with [FUEL_RECORD_COLUMNS] to a [FuelRecord].
pub fn map_fuel_record_row(row: &Row) -> Result<FuelRecord, rusqlite::Error> {
    Ok(FuelRecord {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        date: row.get(2)?,
        time: row.get(3)?,
        region: row.get(4)?,
        station: row.get(5)?,
        unit_price: row.get(6)?,
        volume: row.get(7)?,
        distance: row.get(8)?,
        total_cost: row.get(9)?,
    })
}

/// The columns in the order expected by [map_fuel_record_row].
pub const FUEL_RECORD_COLUMNS: &str =
    "id, user_id, date, time, region, station, unit_price, volume, distance, total_cost";

/// Insert a fuel record owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails.
pub fn create_fuel_record(
    user_id: UserID,
    record: &NewFuelRecord,
    connection: &Connection,
) -> Result<FuelRecord, Error> {
    let record = connection
        .prepare(&format!(
            "INSERT INTO fuel_record
                (user_id, date, time, region, station, unit_price, volume, distance, total_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {FUEL_RECORD_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                record.date,
                record.time,
                record.region,
                record.station,
                record.amounts.unit_price,
                record.amounts.volume,
                record.distance,
                record.amounts.total_cost,
            ],
            map_fuel_record_row,
        )?;

    Ok(record)
}

/// Get the fuel record `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such record for this user, or
/// [Error::SqlError] if some other SQL error occurs.
pub fn get_fuel_record(
    id: FuelRecordId,
    user_id: UserID,
    connection: &Connection,
) -> Result<FuelRecord, Error> {
    let record = connection
        .prepare(&format!(
            "SELECT {FUEL_RECORD_COLUMNS} FROM fuel_record WHERE id = :id AND user_id = :user_id"
        ))?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_fuel_record_row,
        )?;

    Ok(record)
}

/// Get the fuel records of `user_id` dated within `month`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_fuel_records_in_month(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<FuelRecord>, Error> {
    connection
        .prepare(&format!(
            "SELECT {FUEL_RECORD_COLUMNS} FROM fuel_record
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, time DESC, id DESC"
        ))?
        .query_map(
            rusqlite::params![user_id.as_i64(), month.first_day(), month.last_day()],
            map_fuel_record_row,
        )?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}
