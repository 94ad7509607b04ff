//! The fuel page: a form for entering a fill-up and the month's fuel records.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    fuel::{
        FuelRecord,
        core::get_fuel_records_in_month,
        form::{FuelFormDefaults, format_time_input, fuel_form_fields},
        reconcile::LinkedFields,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_distance,
        format_litres, format_won, loading_spinner, month_navigation,
    },
    navigation::NavBar,
    period::{MonthQuery, YearMonth},
    timezone::local_now,
};

/// The state needed for the fuel page.
#[derive(Debug, Clone)]
pub struct FuelPageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// The database connection for reading fuel records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FuelPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the fuel page for the month in the query string, or the current month.
pub async fn get_fuel_page(
    State(state): State<FuelPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let month = query
        .month
        .unwrap_or_else(|| YearMonth::from_date(now.date()));

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = get_fuel_records_in_month(user_id, month, &connection)
        .inspect_err(|error| tracing::error!("could not get fuel records for {month}: {error}"))?;

    Ok(fuel_view(month, now, &records).into_response())
}

/// The date to prefill when entering a record while looking at `month`.
pub(crate) fn default_entry_date(month: YearMonth, today: Date) -> Date {
    if month.last_day() < today {
        month.last_day()
    } else {
        today
    }
}

/// The new-entry form starts at the local time to the minute so same-day
/// fill-ups keep the order they were entered in.
fn fuel_view(month: YearMonth, now: OffsetDateTime, records: &[FuelRecord]) -> Markup {
    let today = now.date();
    let nav_bar = NavBar::new(endpoints::FUEL_VIEW).into_html();
    let fields = fuel_form_fields(&FuelFormDefaults {
        date: default_entry_date(month, today),
        time: now.time().replace_second(0).ok(),
        region: None,
        station: None,
        linked: LinkedFields::default(),
        distance: None,
        max_date: today,
    });

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (month_navigation(endpoints::FUEL_VIEW, month))

            div class=(FORM_CONTAINER_STYLE)
            {
                form
                    hx-post=(endpoints::FUEL_API)
                    hx-target-error="#alert-container"
                    class="w-full space-y-4 md:space-y-6"
                {
                    h2 class="text-xl font-bold" { "New Fill-Up" }

                    (fields)

                    button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                        " Save Fill-Up"
                    }
                }
            }

            section class="w-full overflow-x-auto mt-8 lg:max-w-5xl"
            {
                (fuel_table(records))
            }
        }
    };

    base("Fuel", &content)
}

fn fuel_table(records: &[FuelRecord]) -> Markup {
    let table_row = |record: &FuelRecord| {
        let edit_url = format_endpoint(endpoints::EDIT_FUEL_VIEW, record.id);
        let delete_url = format_endpoint(endpoints::FUEL_RECORD, record.id);
        let place = [record.region.as_deref(), record.station.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");

        html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(record.date) { (record.date) }
                    @if let Some(time) = record.time {
                        " " (format_time_input(time))
                    }
                }
                td class=(TABLE_CELL_STYLE) { (place) }
                td class="px-6 py-4 text-right" { (format_won(record.unit_price)) }
                td class="px-6 py-4 text-right" { (format_litres(record.volume)) }
                td class="px-6 py-4 text-right"
                {
                    @if record.distance > 0 { (format_distance(record.distance)) }
                }
                td class="px-6 py-4 text-right" { (format_won(record.total_cost)) }
                td class="px-6 py-4 text-right"
                {
                    @if let Some(efficiency) = record.efficiency() {
                        (format!("{efficiency:.2} km/L"))
                    }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &format!(
                                "Are you sure you want to delete the fill-up on {}? This cannot be undone.",
                                record.date
                            ),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        }
    };

    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Station" }
                    th scope="col" class="px-6 py-3 text-right" { "Price/L" }
                    th scope="col" class="px-6 py-3 text-right" { "Volume" }
                    th scope="col" class="px-6 py-3 text-right" { "Distance" }
                    th scope="col" class="px-6 py-3 text-right" { "Total" }
                    th scope="col" class="px-6 py-3 text-right" { "Efficiency" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for record in records {
                    (table_row(record))
                }

                @if records.is_empty() {
                    tr
                    {
                        td colspan="8" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                        {
                            "No fill-ups this month."
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{
        Time,
        macros::{date, format_description},
    };

    use crate::{
        auth::UserID,
        fuel::{create_fuel_record, core::test_utils::new_fuel_record},
        initialize_db,
        period::{MonthQuery, YearMonth},
        test_utils::parse_html_document,
    };

    use super::{FuelPageState, default_entry_date, get_fuel_page};

    fn get_test_state() -> FuelPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();

        FuelPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn lists_only_the_users_records_for_the_month() {
        let state = get_test_state();
        let user_id = UserID::new(1);
        {
            let connection = state.db_connection.lock().unwrap();
            create_fuel_record(
                user_id,
                &new_fuel_record(date!(2025 - 02 - 10), 1600, 40.5, 400),
                &connection,
            )
            .unwrap();
            create_fuel_record(
                user_id,
                &new_fuel_record(date!(2025 - 03 - 01), 1600, 10.0, 0),
                &connection,
            )
            .unwrap();
            create_fuel_record(
                UserID::new(2),
                &new_fuel_record(date!(2025 - 02 - 11), 1700, 20.0, 0),
                &connection,
            )
            .unwrap();
        }

        let response = get_fuel_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery {
                month: Some("2025-02".parse::<YearMonth>().unwrap()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| row.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 1, "got rows {rows:?}");
        assert!(rows[0].contains("₩64,800"), "got {}", rows[0]);
        assert!(rows[0].contains("9.88 km/L"), "got {}", rows[0]);
    }

    #[tokio::test]
    async fn new_entry_form_prefills_current_time() {
        let response = get_fuel_page(
            State(get_test_state()),
            Extension(UserID::new(1)),
            Query(MonthQuery { month: None }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let time_input = html
            .select(&Selector::parse("input#time").unwrap())
            .next()
            .expect("could not find time input");
        let value = time_input
            .value()
            .attr("value")
            .expect("time input has no value");
        assert!(
            Time::parse(value, format_description!("[hour]:[minute]")).is_ok(),
            "got {value}"
        );
    }

    #[tokio::test]
    async fn delete_button_targets_row() {
        let state = get_test_state();
        let user_id = UserID::new(1);
        let record = {
            let connection = state.db_connection.lock().unwrap();
            create_fuel_record(
                user_id,
                &new_fuel_record(date!(2025 - 02 - 10), 1600, 40.5, 0),
                &connection,
            )
            .unwrap()
        };

        let response = get_fuel_page(
            State(state),
            Extension(user_id),
            Query(MonthQuery {
                month: Some(YearMonth::from_date(record.date)),
            }),
        )
        .await
        .unwrap();

        let html: Html = parse_html_document(response).await;
        let button = html
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .expect("want a delete button");
        assert_eq!(
            button.value().attr("hx-delete"),
            Some(format!("/api/fuel/{}", record.id).as_str())
        );
        assert_eq!(button.value().attr("hx-target"), Some("closest tr"));
        assert_eq!(button.value().attr("hx-swap"), Some("delete"));
    }

    #[test]
    fn entry_date_defaults_to_last_day_of_past_months() {
        let today = date!(2025 - 03 - 14);

        assert_eq!(
            default_entry_date("2025-02".parse().unwrap(), today),
            date!(2025 - 02 - 28)
        );
        assert_eq!(default_entry_date("2025-03".parse().unwrap(), today), today);
        assert_eq!(default_entry_date("2025-04".parse().unwrap(), today), today);
    }
}
