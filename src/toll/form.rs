use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    toll::core::NewTollRecord,
};

/// The form data for creating or replacing a toll record.
#[derive(Debug, Clone, Deserialize)]
pub struct TollForm {
    pub date: Date,
    #[serde(default)]
    pub section: Option<String>,
    pub amount: i64,
}

impl TryFrom<TollForm> for NewTollRecord {
    type Error = Error;

    fn try_from(form: TollForm) -> Result<Self, Self::Error> {
        if form.amount < 0 {
            return Err(Error::InvalidTollAmount(form.amount));
        }

        Ok(NewTollRecord {
            date: form.date,
            section: form
                .section
                .map(|section| section.trim().to_owned())
                .filter(|section| !section.is_empty()),
            amount: form.amount,
        })
    }
}

pub struct TollFormDefaults<'a> {
    pub date: Date,
    pub section: Option<&'a str>,
    pub amount: Option<i64>,
    pub max_date: Date,
}

pub fn toll_form_fields(defaults: &TollFormDefaults<'_>) -> Markup {
    html! {
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
            label for="section" class=(FORM_LABEL_STYLE) { "Section" }

            input
                name="section"
                id="section"
                type="text"
                placeholder="e.g. Seoul → Daejeon"
                value=[defaults.section]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount (₩)" }

            input
                name="amount"
                id="amount"
                type="number"
                step="1"
                min="0"
                placeholder="0"
                value=[defaults.amount]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
