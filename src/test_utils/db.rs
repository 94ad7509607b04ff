use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{auth::UserID, initialize_db};

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize_db(&connection).expect("could not initialize test DB");

    connection
}

/// An initialized in-memory database ready to be put in a handler's state.
#[track_caller]
pub(crate) fn must_create_shared_test_connection() -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(must_create_test_connection()))
}

/// The owner of the test records, the ID does not need to exist in the user table.
pub(crate) const TEST_USER: UserID = UserID::new(1);
/// A second user for checking that records are scoped by owner.
pub(crate) const OTHER_USER: UserID = UserID::new(2);
