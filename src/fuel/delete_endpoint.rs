//! Defines the endpoint for deleting a fuel record.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, auth::UserID, database_id::FuelRecordId};

/// The state needed to delete a fuel record.
#[derive(Debug, Clone)]
pub struct DeleteFuelRecordState {
    /// The database connection for managing fuel records.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteFuelRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a fuel record, responds with an alert.
pub async fn delete_fuel_record_endpoint(
    State(state): State<DeleteFuelRecordState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<FuelRecordId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_fuel_record(record_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(rows_affected) if rows_affected != 0 => Alert::SuccessSimple {
            message: "Fill-up deleted".to_owned(),
        }
        .into_response(),
        Ok(_) => Error::DeleteMissingFuelRecord.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete fuel record {record_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn delete_fuel_record(
    id: FuelRecordId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM fuel_record WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        Error,
        fuel::{
            create_fuel_record,
            core::{get_fuel_record, test_utils::new_fuel_record},
        },
        test_utils::{OTHER_USER, TEST_USER, must_create_test_connection},
    };

    use super::{DeleteFuelRecordState, delete_fuel_record, delete_fuel_record_endpoint};

    #[test]
    fn deletes_record() {
        let connection = must_create_test_connection();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 0),
            &connection,
        )
        .unwrap();

        let rows_affected = delete_fuel_record(record.id, TEST_USER, &connection).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_fuel_record(record.id, TEST_USER, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn endpoint_responds_ok_so_row_is_removed() {
        let connection = must_create_test_connection();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 0),
            &connection,
        )
        .unwrap();
        let state = DeleteFuelRecordState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_fuel_record_endpoint(State(state), Extension(TEST_USER), Path(record.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn other_users_record_is_missing() {
        let connection = must_create_test_connection();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 0),
            &connection,
        )
        .unwrap();
        let state = DeleteFuelRecordState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_fuel_record_endpoint(
            State(state.clone()),
            Extension(OTHER_USER),
            Path(record.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_fuel_record(record.id, TEST_USER, &connection).is_ok());
    }
}
