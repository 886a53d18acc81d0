//! Store profile rules: setup completeness, categories and opening hours.

use core::fmt;
use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Whether a store's core profile is filled in.
///
/// A store is set up iff description, logo, address and phone are all
/// non-empty.
#[must_use]
pub fn is_setup_complete(
    description: Option<&str>,
    logo_url: Option<&str>,
    address: Option<&str>,
    phone: Option<&str>,
) -> bool {
    [description, logo_url, address, phone]
        .into_iter()
        .all(|field| field.is_some_and(|value| !value.is_empty()))
}

/// Read access to the profile fields that gate the dashboard.
pub trait StoreProfile {
    fn description(&self) -> Option<&str>;
    fn logo_url(&self) -> Option<&str>;
    fn address(&self) -> Option<&str>;
    fn phone(&self) -> Option<&str>;

    /// See [`is_setup_complete`].
    fn is_setup_complete(&self) -> bool {
        is_setup_complete(
            self.description(),
            self.logo_url(),
            self.address(),
            self.phone(),
        )
    }
}

/// Store category offered during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreCategory {
    Restaurant,
    Cafe,
    Bakery,
    Grocery,
    Retail,
    Electronics,
    Fashion,
    Other,
}

impl StoreCategory {
    /// All categories in display order.
    pub const ALL: [Self; 8] = [
        Self::Restaurant,
        Self::Cafe,
        Self::Bakery,
        Self::Grocery,
        Self::Retail,
        Self::Electronics,
        Self::Fashion,
        Self::Other,
    ];

    /// Display / storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Cafe => "Cafe",
            Self::Bakery => "Bakery",
            Self::Grocery => "Grocery",
            Self::Retail => "Retail",
            Self::Electronics => "Electronics",
            Self::Fashion => "Fashion",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown store category: {s}"))
    }
}

/// Day of the week, serialized in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Opening hours for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    /// Opening time, `HH:MM`.
    pub open: String,
    /// Closing time, `HH:MM`.
    pub close: String,
    pub is_closed: bool,
}

impl DayHours {
    fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_owned(),
            close: close.to_owned(),
            is_closed: false,
        }
    }
}

/// Weekly opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningHours(BTreeMap<Weekday, DayHours>);

impl Default for OpeningHours {
    fn default() -> Self {
        let weekday = DayHours::new("09:00", "22:00");
        Self(BTreeMap::from([
            (Weekday::Monday, weekday.clone()),
            (Weekday::Tuesday, weekday.clone()),
            (Weekday::Wednesday, weekday.clone()),
            (Weekday::Thursday, weekday),
            (Weekday::Friday, DayHours::new("09:00", "23:00")),
            (Weekday::Saturday, DayHours::new("10:00", "23:00")),
            (Weekday::Sunday, DayHours::new("10:00", "21:00")),
        ]))
    }
}

impl OpeningHours {
    /// Hours for a single day, if configured.
    #[must_use]
    pub fn day(&self, day: Weekday) -> Option<&DayHours> {
        self.0.get(&day)
    }

    /// Replace the hours for one day.
    pub fn set_day(&mut self, day: Weekday, hours: DayHours) {
        self.0.insert(day, hours);
    }

    /// Check every open day has parseable times with close after open.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending day.
    pub fn validate(&self) -> Result<(), String> {
        for (day, hours) in &self.0 {
            if hours.is_closed {
                continue;
            }
            let open = NaiveTime::parse_from_str(&hours.open, "%H:%M")
                .map_err(|_| format!("{day:?}: invalid opening time {:?}", hours.open))?;
            let close = NaiveTime::parse_from_str(&hours.close, "%H:%M")
                .map_err(|_| format!("{day:?}: invalid closing time {:?}", hours.close))?;
            if close <= open {
                return Err(format!("{day:?}: closing time must be after opening time"));
            }
        }
        Ok(())
    }
}
