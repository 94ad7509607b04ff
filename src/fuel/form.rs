//! The fuel record form shared by the fuel page and the edit page.

use maud::{Markup, html};
use serde::{Deserialize, Deserializer};
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error, endpoints,
    fuel::{
        core::NewFuelRecord,
        reconcile::{Edit, LinkedFields, SubmissionPolicy, resolve_submission},
    },
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form data for creating or replacing a fuel record.
#[derive(Debug, Clone, Deserialize)]
pub struct FuelForm {
    pub date: Date,
    #[serde(default, deserialize_with = "deserialize_optional_time")]
    pub time: Option<Time>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<i64>,
    #[serde(default)]
    pub distance: Option<i64>,
}

impl FuelForm {
    /// Resolve the linked amounts and tidy up the optional text fields.
    ///
    /// # Errors
    /// Returns the validation errors of [resolve_submission], or
    /// [Error::InvalidDistance] if the distance is negative.
    pub fn into_new_record(self, policy: SubmissionPolicy) -> Result<NewFuelRecord, Error> {
        let distance = self.distance.unwrap_or(0);
        if distance < 0 {
            return Err(Error::InvalidDistance(distance));
        }

        let amounts = resolve_submission(
            LinkedFields {
                unit_price: self.unit_price,
                volume: self.volume,
                total_cost: self.total_cost,
            },
            policy,
        )?;

        Ok(NewFuelRecord {
            date: self.date,
            time: self.time,
            region: non_blank(self.region),
            station: non_blank(self.station),
            amounts,
            distance,
        })
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

const TIME_INPUT_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]");
const TIME_INPUT_WITH_SECONDS_FORMAT: &[BorrowedFormatItem] =
    format_description!("[hour]:[minute]:[second]");

/// Parse the value of an `<input type="time">`, which is "HH:MM" or
/// "HH:MM:SS", treating an empty value as no time.
fn deserialize_optional_time<'de, D>(deserializer: D) -> Result<Option<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Time::parse(text, TIME_INPUT_FORMAT)
            .or_else(|_| Time::parse(text, TIME_INPUT_WITH_SECONDS_FORMAT))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Format a time for an `<input type="time">`.
pub fn format_time_input(time: Time) -> String {
    time.format(TIME_INPUT_FORMAT)
        .unwrap_or_else(|_| format!("{:02}:{:02}", time.hour(), time.minute()))
}

/// The values to prefill the fuel form with.
pub struct FuelFormDefaults<'a> {
    pub date: Date,
    pub time: Option<Time>,
    pub region: Option<&'a str>,
    pub station: Option<&'a str>,
    pub linked: LinkedFields,
    pub distance: Option<i64>,
    pub max_date: Date,
}

/// The form inputs for a fuel record, without the surrounding form element.
pub fn fuel_form_fields(defaults: &FuelFormDefaults<'_>) -> Markup {
    let time_str = defaults.time.map(format_time_input);

    html! {
        div class="grid grid-cols-2 gap-4"
        {
            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    max=(defaults.max_date)
                    value=(defaults.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="time" class=(FORM_LABEL_STYLE) { "Time" }

                input
                    name="time"
                    id="time"
                    type="time"
                    value=[time_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div class="grid grid-cols-2 gap-4"
        {
            div
            {
                label for="region" class=(FORM_LABEL_STYLE) { "Region" }

                input
                    name="region"
                    id="region"
                    type="text"
                    placeholder="Region"
                    value=[defaults.region]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="station" class=(FORM_LABEL_STYLE) { "Station" }

                input
                    name="station"
                    id="station"
                    type="text"
                    placeholder="Station"
                    value=[defaults.station]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="unit_price" class=(FORM_LABEL_STYLE) { "Price per litre (₩)" }

            (linked_input(Edit::UnitPrice, defaults.linked, false))
        }

        div class="grid grid-cols-2 gap-4"
        {
            div
            {
                label for="volume" class=(FORM_LABEL_STYLE) { "Volume (L)" }

                (linked_input(Edit::Volume, defaults.linked, false))
            }

            div
            {
                label for="total_cost" class=(FORM_LABEL_STYLE) { "Total cost (₩)" }

                (linked_input(Edit::TotalCost, defaults.linked, false))
            }
        }

        div
        {
            label for="distance" class=(FORM_LABEL_STYLE) { "Distance since last fill-up (km)" }

            input
                name="distance"
                id="distance"
                type="number"
                step="1"
                min="0"
                placeholder="0"
                value=[defaults.distance.filter(|distance| *distance > 0)]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// One of the three linked inputs.
///
/// Changing the input posts the form to the reconcile endpoint, which answers
/// with the other two inputs as out-of-band swaps. Set `out_of_band` when
/// rendering those replacements.
pub fn linked_input(field: Edit, values: LinkedFields, out_of_band: bool) -> Markup {
    let (name, step, placeholder, value) = match field {
        Edit::UnitPrice => (
            "unit_price",
            "1",
            "1600",
            values.unit_price.map(|price| price.to_string()),
        ),
        Edit::Volume => (
            "volume",
            "0.01",
            "0.00",
            values.volume.map(|volume| volume.to_string()),
        ),
        Edit::TotalCost => (
            "total_cost",
            "1",
            "0",
            values.total_cost.map(|cost| cost.to_string()),
        ),
    };
    let hx_vals = format!(r#"{{"edited": "{name}"}}"#);

    html! {
        input
            name=(name)
            id=(name)
            type="number"
            step=(step)
            min="0"
            placeholder=(placeholder)
            value=[value]
            required[matches!(field, Edit::UnitPrice)]
            hx-post=(endpoints::RECONCILE_FUEL_API)
            hx-trigger="input changed delay:300ms"
            hx-vals=(hx_vals)
            hx-swap="none"
            hx-swap-oob=[out_of_band.then_some("true")]
            class=(FORM_TEXT_INPUT_STYLE);
    }
}
