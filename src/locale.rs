//! Month names for the dated directory labels
//!
//! Month folders are named `MonthNumber.MonthName`, e.g. `3.Marzo`.
//! The name table is fixed per locale so the same calendar month always
//! maps to the same folder.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Locale used to render month folder names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MonthLocale {
    #[default]
    Italian,
    English,
    French,
    German,
    Spanish,
    /// Detect from the operating system locale, falling back to Italian
    System,
}

const ITALIAN: [&str; 12] = [
    "Gennaio", "Febbraio", "Marzo", "Aprile", "Maggio", "Giugno",
    "Luglio", "Agosto", "Settembre", "Ottobre", "Novembre", "Dicembre",
];

const ENGLISH: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const FRENCH: [&str; 12] = [
    "Janvier", "Février", "Mars", "Avril", "Mai", "Juin",
    "Juillet", "Août", "Septembre", "Octobre", "Novembre", "Décembre",
];

const GERMAN: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni",
    "Juli", "August", "September", "Oktober", "November", "Dezember",
];

const SPANISH: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

impl MonthLocale {
    /// Replace `System` with the concrete locale of the running machine.
    ///
    /// Call once before a run so every file in the batch uses the same table.
    pub fn resolve(self) -> Self {
        match self {
            MonthLocale::System => {
                let detected = sys_locale::get_locale()
                    .map(|tag| Self::from_language_tag(&tag))
                    .unwrap_or(MonthLocale::Italian);
                debug!(?detected, "Resolved system month locale");
                detected
            }
            other => other,
        }
    }

    /// Map a BCP 47 tag such as `de-DE` to a supported locale
    fn from_language_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match language.as_str() {
            "en" => MonthLocale::English,
            "fr" => MonthLocale::French,
            "de" => MonthLocale::German,
            "es" => MonthLocale::Spanish,
            _ => MonthLocale::Italian,
        }
    }

    fn table(self) -> &'static [&'static str; 12] {
        match self {
            MonthLocale::Italian | MonthLocale::System => &ITALIAN,
            MonthLocale::English => &ENGLISH,
            MonthLocale::French => &FRENCH,
            MonthLocale::German => &GERMAN,
            MonthLocale::Spanish => &SPANISH,
        }
    }

    /// Full month name for a 1-based month number
    pub fn month_name(self, month: u32) -> &'static str {
        let index = month.clamp(1, 12) as usize - 1;
        self.table()[index]
    }

    /// Folder label `"<month>.<name>"` for a 1-based month number
    pub fn month_label(self, month: u32) -> String {
        format!("{}.{}", month, self.month_name(month))
    }
}
