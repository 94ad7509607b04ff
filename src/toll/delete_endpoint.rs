//! Defines the endpoint for deleting a toll record.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, auth::UserID, database_id::TollRecordId};

/// The state needed to delete a toll record.
#[derive(Debug, Clone)]
pub struct DeleteTollRecordState {
    /// The database connection for managing toll records.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTollRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a toll record, responds with an alert.
pub async fn delete_toll_record_endpoint(
    State(state): State<DeleteTollRecordState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<TollRecordId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = connection
        .execute(
            "DELETE FROM toll_record WHERE id = :id AND user_id = :user_id",
            &[(":id", &record_id), (":user_id", &user_id.as_i64())],
        )
        .map_err(Error::from);

    match result {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(rows_affected) if rows_affected != 0 => Alert::SuccessSimple {
            message: "Toll deleted".to_owned(),
        }
        .into_response(),
        Ok(_) => Error::DeleteMissingTollRecord.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete toll record {record_id}: {error}");
            error.into_alert_response()
        }
    }
}
