use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Self; MONTHS_PER_YEAR] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Zero-based position on the dial, January at 12 o'clock.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MONTHS_PER_YEAR {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Calendar number as it appears in the `month` column (1..=12).
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=12 => Self::from_index(number as usize - 1),
            _ => None,
        }
    }

    /// Single-letter spoke label.
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::January | Self::June | Self::July => "J",
            Self::February => "F",
            Self::March | Self::May => "M",
            Self::April | Self::August => "A",
            Self::September => "S",
            Self::October => "O",
            Self::November => "N",
            Self::December => "D",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::January => "Jan",
            Self::February => "Feb",
            Self::March => "Mar",
            Self::April => "Apr",
            Self::May => "May",
            Self::June => "Jun",
            Self::July => "Jul",
            Self::August => "Aug",
            Self::September => "Sep",
            Self::October => "Oct",
            Self::November => "Nov",
            Self::December => "Dec",
        }
    }
}

/// Precipitation per month for a single year, in source units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearRecord {
    values: BTreeMap<Month, f64>,
}

impl YearRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same month replace earlier ones.
    pub fn insert(&mut self, month: Month, value: f64) {
        self.values.insert(month, value);
    }

    pub fn get(&self, month: Month) -> Option<f64> {
        self.values.get(&month).copied()
    }

    /// Value used for projection: absent months count as zero.
    pub fn value_or_zero(&self, month: Month) -> f64 {
        self.get(month).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        self.values.iter().map(|(month, value)| (*month, *value))
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values.values().copied().reduce(f64::max)
    }

    /// Month with the highest value; ties resolve to the earlier month.
    pub fn wettest(&self) -> Option<(Month, f64)> {
        self.iter().fold(None, |best, (month, value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((month, value)),
        })
    }
}

/// All years parsed from one series source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesDataset {
    years: BTreeMap<i32, YearRecord>,
}

impl SeriesDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, month: Month, value: f64) {
        self.years.entry(year).or_default().insert(month, value);
    }

    pub fn year(&self, year: i32) -> Option<&YearRecord> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = (i32, &YearRecord)> + '_ {
        self.years.iter().map(|(year, record)| (*year, record))
    }

    pub fn max_value(&self) -> Option<f64> {
        self.years
            .values()
            .filter_map(YearRecord::max_value)
            .reduce(f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.years.values().map(YearRecord::len).sum()
    }
}

/// A configured data source of a chart and the classes its shapes carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub csv_file: String,
    #[serde(default = "Series::default_path_class")]
    pub path_class: String,
    #[serde(default = "Series::default_dot_class")]
    pub dot_class: String,
}

impl Series {
    pub const DEFAULT_PATH_CLASS: &'static str = "radial-path";
    pub const DEFAULT_DOT_CLASS: &'static str = "radial-dot";

    pub fn new(csv_file: impl Into<String>) -> Self {
        Self {
            csv_file: csv_file.into(),
            path_class: Self::default_path_class(),
            dot_class: Self::default_dot_class(),
        }
    }

    #[must_use]
    pub fn with_classes(mut self, path_class: impl Into<String>, dot_class: impl Into<String>) -> Self {
        self.path_class = path_class.into();
        self.dot_class = dot_class.into();
        self
    }

    fn default_path_class() -> String {
        Self::DEFAULT_PATH_CLASS.to_string()
    }

    fn default_dot_class() -> String {
        Self::DEFAULT_DOT_CLASS.to_string()
    }
}
