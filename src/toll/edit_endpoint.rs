//! Defines the endpoint for replacing a toll record.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TollRecordId,
    endpoints::{self, with_month},
    period::YearMonth,
    timezone::local_now,
    toll::{core::NewTollRecord, form::TollForm},
};

/// The state needed to edit a toll record.
#[derive(Debug, Clone)]
pub struct EditTollRecordState {
    /// The database connection for managing toll records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTollRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Replaces every field of a toll record.
pub async fn edit_toll_record_endpoint(
    State(state): State<EditTollRecordState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<TollRecordId>,
    Form(form): Form<TollForm>,
) -> Response {
    let Some(now) = local_now(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > now.date() {
        tracing::error!("Tried to move toll record {record_id} to a future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let record = match NewTollRecord::try_from(form) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!("Rejected update to toll record {record_id}: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_toll_record(record_id, user_id, &record, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(with_month(endpoints::TOLLS_VIEW, YearMonth::from_date(record.date))),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingTollRecord.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update toll record {record_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn update_toll_record(
    id: TollRecordId,
    user_id: UserID,
    record: &NewTollRecord,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE toll_record SET date = ?1, section = ?2, amount = ?3 \
            WHERE id = ?4 AND user_id = ?5;",
            params![record.date, record.section, record.amount, id, user_id.as_i64()],
        )
        .map_err(Error::from)
}
