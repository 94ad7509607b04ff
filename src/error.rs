//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The expiry of the auth cookie could not be moved forward.
    #[error("could not extend the auth cookie expiry")]
    CookieExpiryOverflow,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered with the email address.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A date in the future was used for a fuel or toll record.
    ///
    /// Records describe purchases that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A fuel record was submitted without a positive unit price.
    #[error("the unit price is required and must be greater than zero")]
    MissingUnitPrice,

    /// A fuel record was submitted with neither a volume nor a total cost.
    #[error("either the volume or the total cost is required")]
    MissingVolumeOrCost,

    /// A fuel volume or total cost was not a positive, finite amount within
    /// the accepted range.
    #[error("invalid fuel amount: {0}")]
    InvalidFuelAmount(String),

    /// A negative distance was submitted for a fuel record.
    #[error("the distance {0} is negative")]
    InvalidDistance(i64),

    /// A negative toll amount was submitted.
    #[error("the toll amount {0} is negative")]
    InvalidTollAmount(i64),

    /// A negative monthly budget was submitted.
    #[error("the budget {0} is negative")]
    InvalidBudget(i64),

    /// A month string was not in the `YYYY-MM` format.
    #[error("\"{0}\" is not a month in the format YYYY-MM")]
    InvalidYearMonth(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a fuel record that does not exist for the current user
    #[error("tried to update a fuel record that is not in the database")]
    UpdateMissingFuelRecord,

    /// Tried to delete a fuel record that does not exist for the current user
    #[error("tried to delete a fuel record that is not in the database")]
    DeleteMissingFuelRecord,

    /// Tried to update a toll record that does not exist for the current user
    #[error("tried to update a toll record that is not in the database")]
    UpdateMissingTollRecord,

    /// Tried to delete a toll record that does not exist for the current user
    #[error("tried to delete a toll record that is not in the database")]
    DeleteMissingTollRecord,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!(
                        "{date} is a date in the future, which is not allowed. \
                        Change the date to today or earlier."
                    ),
                },
            ),
            Error::MissingUnitPrice => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unit price required".to_owned(),
                    details: "Enter the price per litre before saving the fill-up.".to_owned(),
                },
            ),
            Error::MissingVolumeOrCost => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Volume or total cost required".to_owned(),
                    details: "Enter the litres pumped or the amount paid, \
                    the other value is calculated from the unit price."
                        .to_owned(),
                },
            ),
            Error::InvalidTollAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid toll amount".to_owned(),
                    details: format!("{amount} is negative, enter zero or more."),
                },
            ),
            Error::InvalidFuelAmount(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid fuel amount".to_owned(),
                    details: format!("The {reason}."),
                },
            ),
            Error::InvalidDistance(distance) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid distance".to_owned(),
                    details: format!("{distance} is negative, enter zero or more kilometres."),
                },
            ),
            Error::InvalidBudget(budget) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget".to_owned(),
                    details: format!("{budget} is negative, enter zero or more."),
                },
            ),
            Error::UpdateMissingFuelRecord => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update fuel record".to_owned(),
                    details: "The fuel record could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingFuelRecord => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete fuel record".to_owned(),
                    details: "The fuel record could not be found. \
                    Try refreshing the page to see if the record has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingTollRecord => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update toll record".to_owned(),
                    details: "The toll record could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTollRecord => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete toll record".to_owned(),
                    details: "The toll record could not be found. \
                    Try refreshing the page to see if the record has already been deleted."
                        .to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
